//! URL handling for Brickscout
//!
//! Target URL validation, host extraction, wildcard host matching for the
//! adapter registry, and canonicalization of deal links.

mod domain;
mod matcher;
mod normalize;

pub use domain::extract_domain;
pub use matcher::matches_wildcard;
pub use normalize::{canonical_link, parse_target};
