//! Core data model
//!
//! - `DealRecord`: the unit of persisted knowledge, keyed by its canonical link
//! - `PageKind`: whether a target URL is a listing (search/index) or a detail page
//! - `Provenance`: the page kind a batch of records came from, which decides
//!   how the batch is merged into the store

mod kind;
mod record;

pub use kind::{PageKind, Provenance};
pub use record::DealRecord;
