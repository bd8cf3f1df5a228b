//! Endpoint-specific request rewrites applied before forwarding a GET.
//!
//! Two backend endpoints need help:
//! - `…/work_packages/menu` refuses requests without a `referer` header,
//!   which browsers do not send through the platform; an empty one is enough.
//! - `…/project_storages/new` expects `storages_project_storage[storage_id]`,
//!   but the platform's proxy strips the bracketed key down to
//!   `storages_project_storage[]`.

use axum::http::header::{self, HeaderValue};
use axum::http::Method;

use crate::http::request::OutboundRequest;
use crate::routing::matcher::{is_project_storages_new, is_work_packages_menu};

/// Query key as it arrives from the platform.
pub const MANGLED_STORAGE_KEY: &str = "storages_project_storage[]";

/// Query key the backend expects.
pub const STORAGE_ID_KEY: &str = "storages_project_storage[storage_id]";

/// Apply every rewrite rule whose endpoint matches. Non-GET requests are left
/// untouched.
pub fn rewrite_request(request: &mut OutboundRequest) {
    if request.method != Method::GET {
        return;
    }

    if is_work_packages_menu(&request.url) {
        tracing::debug!(url = %request.url, "Forcing empty referer");
        request
            .headers
            .insert(header::REFERER, HeaderValue::from_static(""));
    }

    if is_project_storages_new(&request.url) && rename_storage_key(request) {
        tracing::debug!(url = %request.url, "Restored storage id query parameter");
    }
}

/// Rename every `storages_project_storage[]` pair in place. Returns whether
/// the query changed.
fn rename_storage_key(request: &mut OutboundRequest) -> bool {
    let mut renamed = false;
    let pairs: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(key, value)| {
            if key == MANGLED_STORAGE_KEY {
                renamed = true;
                (STORAGE_ID_KEY.to_string(), value.into_owned())
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect();

    if renamed {
        request.url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    renamed
}
