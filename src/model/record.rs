use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single deal, as extracted from a page and as persisted in the store
///
/// `link` is the identity key: the store holds at most one record per link.
/// `temperature` and `comments_count` are volatile and may be refreshed by a
/// listing-page rescan; every other field is only replaced by a detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    /// Canonical absolute URL of the deal
    pub link: String,

    pub title: String,

    /// Total price in the currency major unit, shipping included when known
    pub price: f64,

    /// LEGO set number (4 to 6 digits), when one could be inferred
    #[serde(default)]
    pub set_number: Option<String>,

    /// Popularity score (votes on forums, favourites on marketplaces)
    #[serde(default)]
    pub temperature: i64,

    #[serde(default)]
    pub comments_count: i64,

    #[serde(default)]
    pub posted_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub free_shipping: bool,

    #[serde(default)]
    pub image_url: String,

    /// Name of the site adapter that produced the record
    #[serde(default)]
    pub source: String,
}

impl DealRecord {
    /// Creates a record with only the mandatory fields set
    pub fn new(link: impl Into<String>, title: impl Into<String>, price: f64) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            price,
            set_number: None,
            temperature: 0,
            comments_count: 0,
            posted_date: None,
            free_shipping: false,
            image_url: String::new(),
            source: String::new(),
        }
    }

    /// Copies the volatile fields from a fresher observation of the same deal
    ///
    /// Returns true if anything changed.
    pub fn refresh_volatile(&mut self, fresher: &DealRecord) -> bool {
        let changed = self.temperature != fresher.temperature
            || self.comments_count != fresher.comments_count;
        self.temperature = fresher.temperature;
        self.comments_count = fresher.comments_count;
        changed
    }
}
