//! URL matching logic.
//!
//! # Responsibilities
//! - Match a run of path segments anywhere in a URL path
//! - Match a run of path segments at the end of a URL path
//! - Name the backend endpoints that need special handling
//!
//! # Design Decisions
//! - Matching works on parsed path segments, never on the raw URL string,
//!   so `/myoauth/authorize` does not match `oauth/authorize`
//! - Query and fragment never take part in a match
//! - Empty segments (`//`, trailing `/`) are ignored
//! - No regex to guarantee O(n) matching

use url::Url;

/// Trait for matching URLs against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the URL matches this condition.
    fn matches(&self, url: &Url) -> bool;
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn url_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Matches a contiguous run of path segments anywhere in the path.
#[derive(Debug, Clone)]
pub struct PathSegmentsMatcher {
    segments: Vec<String>,
}

impl PathSegmentsMatcher {
    /// Create a matcher from a slash-separated pattern such as `oauth/authorize`.
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            segments: split_segments(pattern.as_ref()),
        }
    }
}

impl Matcher for PathSegmentsMatcher {
    fn matches(&self, url: &Url) -> bool {
        if self.segments.is_empty() {
            return false;
        }
        url_segments(url)
            .windows(self.segments.len())
            .any(|window| window.iter().zip(&self.segments).all(|(a, b)| *a == b.as_str()))
    }
}

/// Matches a run of path segments at the end of the path.
#[derive(Debug, Clone)]
pub struct PathSuffixMatcher {
    segments: Vec<String>,
}

impl PathSuffixMatcher {
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            segments: split_segments(pattern.as_ref()),
        }
    }
}

impl Matcher for PathSuffixMatcher {
    fn matches(&self, url: &Url) -> bool {
        let path = url_segments(url);
        !self.segments.is_empty()
            && path.len() >= self.segments.len()
            && path[path.len() - self.segments.len()..]
                .iter()
                .zip(&self.segments)
                .all(|(a, b)| *a == b.as_str())
    }
}

/// Backend endpoint that rejects requests without a `referer` header.
pub fn is_work_packages_menu(url: &Url) -> bool {
    PathSuffixMatcher::new("work_packages/menu").matches(url)
}

/// Backend form whose storage id query parameter arrives mangled.
pub fn is_project_storages_new(url: &Url) -> bool {
    PathSegmentsMatcher::new("project_storages/new").matches(url)
}

/// The backend's own OAuth authorize endpoint.
pub fn is_oauth_authorize(url: &Url) -> bool {
    PathSegmentsMatcher::new("oauth/authorize").matches(url)
}

/// The platform's OAuth2 authorize endpoint.
pub fn is_oauth2_authorize(url: &Url) -> bool {
    PathSegmentsMatcher::new("apps/oauth2/authorize").matches(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_segments_matcher() {
        let matcher = PathSegmentsMatcher::new("proxy/openproject-nextcloud-app");

        assert!(matcher.matches(&url(
            "http://cloud.local/index.php/apps/app_api/proxy/openproject-nextcloud-app/projects"
        )));
        assert!(matcher.matches(&url("http://cloud.local/proxy/openproject-nextcloud-app")));
        assert!(!matcher.matches(&url("http://cloud.local/proxy/openproject-nextcloud-app-old/x")));
        assert!(!matcher.matches(&url(
            "http://cloud.local/login?back=proxy/openproject-nextcloud-app"
        )));
    }

    #[test]
    fn test_suffix_matcher() {
        assert!(is_work_packages_menu(&url("http://op:3000/projects/demo/work_packages/menu")));
        assert!(is_work_packages_menu(&url("http://op:3000/work_packages/menu?x=1")));
        assert!(!is_work_packages_menu(&url("http://op:3000/work_packages/menu/items")));
        assert!(!is_work_packages_menu(&url("http://op:3000/my_work_packages/menu")));
    }

    #[test]
    fn test_oauth_predicates_do_not_overlap() {
        let op_authorize = url("http://op:3000/oauth/authorize?client_id=abc");
        let nc_authorize = url("http://cloud.local/index.php/apps/oauth2/authorize?client_id=abc");

        assert!(is_oauth_authorize(&op_authorize));
        assert!(!is_oauth2_authorize(&op_authorize));
        assert!(is_oauth2_authorize(&nc_authorize));
        assert!(!is_oauth_authorize(&nc_authorize));
        assert!(!is_oauth_authorize(&url("http://op:3000/myoauth/authorize")));
    }

    #[test]
    fn test_project_storages_new() {
        assert!(is_project_storages_new(&url(
            "http://op:3000/projects/demo/settings/project_storages/new"
        )));
        assert!(!is_project_storages_new(&url(
            "http://op:3000/projects/demo/settings/project_storages"
        )));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        assert!(!PathSegmentsMatcher::new("/").matches(&url("http://op:3000/anything")));
        assert!(!PathSuffixMatcher::new("").matches(&url("http://op:3000/")));
    }
}
