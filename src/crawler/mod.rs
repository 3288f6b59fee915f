//! Scrape pipeline
//!
//! This module contains the scrape orchestration, including:
//! - Bounded retries with linear or exponential backoff
//! - Concurrent scrapes with a single store writer

mod coordinator;
mod retry;

pub use coordinator::{Coordinator, SharedStore};
pub use retry::{run_with_retry, Attempt, RetryOutcome, RetryPolicy};
