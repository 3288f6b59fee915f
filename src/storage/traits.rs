//! Store trait, query type and storage errors

use crate::model::DealRecord;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Deal not found: {0}")]
    NotFound(String),

    #[error("Deal already stored: {0}")]
    Duplicate(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A persisted collection of deals keyed by `link`
///
/// Implementations hold at most one record per link and keep insertion
/// order. They are not internally synchronized; callers serialize writers.
pub trait DealStore: Send {
    /// Returns every stored record in insertion order
    fn load_all(&self) -> StorageResult<Vec<DealRecord>>;

    /// Replaces the whole collection in a single atomic write
    fn replace_all(&mut self, records: &[DealRecord]) -> StorageResult<()>;

    /// Adds a record; fails with `Duplicate` if its link is already stored
    fn insert(&mut self, record: &DealRecord) -> StorageResult<()>;

    fn get(&self, link: &str) -> StorageResult<Option<DealRecord>>;

    /// Overwrites the record with the same link; fails with `NotFound` if absent
    fn replace(&mut self, record: &DealRecord) -> StorageResult<()>;

    /// Returns the records matching `query`, sorted and limited
    fn find(&self, query: &DealQuery) -> StorageResult<Vec<DealRecord>> {
        Ok(query.apply(self.load_all()?))
    }
}

/// Sort key for deal queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    Temperature,
    Comments,
    Date,
}

impl SortKey {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "price" => Some(Self::Price),
            "temperature" | "hot" => Some(Self::Temperature),
            "comments" | "most-commented" => Some(Self::Comments),
            "date" | "newest" => Some(Self::Date),
            _ => None,
        }
    }

    /// Cheapest first for prices, largest or newest first otherwise
    pub fn default_direction(&self) -> SortDirection {
        match self {
            Self::Price => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    fn compare(&self, a: &DealRecord, b: &DealRecord) -> Ordering {
        match self {
            Self::Price => a.price.total_cmp(&b.price),
            Self::Temperature => a.temperature.cmp(&b.temperature),
            Self::Comments => a.comments_count.cmp(&b.comments_count),
            Self::Date => a.posted_date.cmp(&b.posted_date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter, sort and limit applied to stored deals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealQuery {
    /// Keep deals priced at or below this amount
    pub max_price: Option<f64>,

    /// Keep deals posted at or after this instant; undated deals are excluded
    pub posted_after: Option<DateTime<Utc>>,

    pub set_number: Option<String>,

    /// Keep deals from this adapter only
    pub source: Option<String>,

    pub sort: Option<SortKey>,

    /// Overrides the sort key's default direction
    pub direction: Option<SortDirection>,

    pub limit: Option<usize>,
}

impl DealQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn posted_after(mut self, instant: DateTime<Utc>) -> Self {
        self.posted_after = Some(instant);
        self
    }

    pub fn set_number(mut self, set_number: impl Into<String>) -> Self {
        self.set_number = Some(set_number.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if `record` passes every filter
    pub fn matches(&self, record: &DealRecord) -> bool {
        if let Some(max) = self.max_price {
            if record.price > max {
                return false;
            }
        }

        if let Some(after) = self.posted_after {
            match record.posted_date {
                Some(posted) if posted >= after => {}
                _ => return false,
            }
        }

        if let Some(set_number) = &self.set_number {
            if record.set_number.as_deref() != Some(set_number.as_str()) {
                return false;
            }
        }

        if let Some(source) = &self.source {
            if !record.source.eq_ignore_ascii_case(source) {
                return false;
            }
        }

        true
    }

    /// Filters, sorts and truncates `records`
    ///
    /// Sorting is stable; without a sort key the input order is kept.
    pub fn apply(&self, records: Vec<DealRecord>) -> Vec<DealRecord> {
        let mut selected: Vec<DealRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();

        if let Some(key) = self.sort {
            let direction = self.direction.unwrap_or_else(|| key.default_direction());
            selected.sort_by(|a, b| match direction {
                SortDirection::Ascending => key.compare(a, b),
                SortDirection::Descending => key.compare(b, a),
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn deal(n: u32, price: f64, temperature: i64) -> DealRecord {
        let mut record = DealRecord::new(
            format!("https://www.dealabs.com/bons-plans/d-{}", n),
            format!("LEGO {}", n),
            price,
        );
        record.temperature = temperature;
        record.source = "dealabs".to_string();
        record
    }

    #[test]
    fn test_sort_key_names() {
        assert_eq!(SortKey::from_name("Price"), Some(SortKey::Price));
        assert_eq!(SortKey::from_name("most-commented"), Some(SortKey::Comments));
        assert_eq!(SortKey::from_name("discount"), None);
    }

    #[test]
    fn test_price_sorts_cheapest_first() {
        let records = vec![deal(1, 30.0, 0), deal(2, 10.0, 0), deal(3, 20.0, 0)];
        let found = DealQuery::new().sort_by(SortKey::Price).apply(records);
        let prices: Vec<f64> = found.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_temperature_sorts_hottest_first_with_limit() {
        let records = vec![deal(1, 1.0, 50), deal(2, 1.0, 300), deal(3, 1.0, 120)];
        let found = DealQuery::new()
            .sort_by(SortKey::Temperature)
            .limit(2)
            .apply(records);
        let temps: Vec<i64> = found.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![300, 120]);
    }

    #[test]
    fn test_filters() {
        let mut dated = deal(1, 40.0, 0);
        dated.posted_date = Some(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        dated.set_number = Some("42096".to_string());
        let undated = deal(2, 20.0, 0);
        let expensive = deal(3, 500.0, 0);

        let records = vec![dated, undated, expensive];

        let cheap = DealQuery::new().max_price(100.0).apply(records.clone());
        assert_eq!(cheap.len(), 2);

        let recent = DealQuery::new()
            .posted_after(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
            .apply(records.clone());
        assert_eq!(recent.len(), 1);

        let by_set = DealQuery::new().set_number("42096").apply(records.clone());
        assert_eq!(by_set.len(), 1);

        let other_site = DealQuery::new().source("vinted").apply(records);
        assert!(other_site.is_empty());
    }

    #[test]
    fn test_no_sort_keeps_order() {
        let records = vec![deal(3, 1.0, 0), deal(1, 1.0, 0), deal(2, 1.0, 0)];
        let found = DealQuery::new().apply(records.clone());
        assert_eq!(found, records);
    }
}
