//! Integration tests for the scrape pipeline
//!
//! These tests run local wiremock servers, route them to the site adapters
//! through `[[site-alias]]` entries, and check what ends up in the store.

mod fixtures;
mod scrape_tests;
mod store_tests;
