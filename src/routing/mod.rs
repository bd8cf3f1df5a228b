//! URL classification and request rewriting.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (GET only)
//!     → rewrite.rs (endpoint-specific header/query fixes)
//!     → matcher.rs (which endpoint is this?)
//!
//! Backend redirect
//!     → matcher.rs (own mount? OAuth authorize?)
//!     → relay::redirect decides the action
//! ```
//!
//! # Design Decisions
//! - Every URL-based decision goes through a named predicate in matcher.rs
//! - Predicates see parsed path segments only
//! - Deterministic: same input always gives the same answer

pub mod matcher;
pub mod rewrite;

pub use matcher::{Matcher, PathSegmentsMatcher, PathSuffixMatcher};
pub use rewrite::rewrite_request;
