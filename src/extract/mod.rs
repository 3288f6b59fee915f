//! Extraction engine: rendered markup to candidate deal records
//!
//! Extraction is pure. Given the same markup and the same [`ExtractContext`]
//! (in particular the same `now`), it returns the same records. Site-specific
//! card and field selectors live in the [`crate::sites`] adapters; this module
//! holds the shared field parsers and the acceptance rules every candidate
//! goes through.

mod dates;
mod markup;
mod price;
mod set_number;
mod structured;

pub use dates::{parse_french_timestamp, parse_iso, resolve_relative};
pub use markup::{
    best_image, best_srcset_candidate, first_attr, first_text, parse_count, select_all,
    select_first, shipping_snippet, text_of,
};
pub use price::{landed_price, normalize_price, Shipping};
pub use set_number::infer_set_number;
pub use structured::{thread_id, StructuredData};

use crate::model::{DealRecord, PageKind};
use crate::sites::SiteId;
use crate::url::canonical_link;
use chrono::{DateTime, Utc};
use scraper::Html;
use url::Url;

/// Everything extraction needs besides the markup itself
#[derive(Debug, Clone)]
pub struct ExtractContext<'a> {
    /// URL the markup was fetched from; relative links resolve against it
    pub page_url: &'a Url,

    /// Reference time for relative dates
    pub now: DateTime<Utc>,

    /// Required title keyword, matched case-insensitively; empty accepts all
    pub keyword: String,

    /// Fold a known shipping cost into the price
    pub include_shipping: bool,
}

impl<'a> ExtractContext<'a> {
    /// Creates a context with the default keyword and shipping policy
    pub fn new(page_url: &'a Url, now: DateTime<Utc>) -> Self {
        Self {
            page_url,
            now,
            keyword: "lego".to_string(),
            include_shipping: true,
        }
    }

    /// Returns true if `title` passes the keyword filter
    pub fn title_matches(&self, title: &str) -> bool {
        let keyword = self.keyword.trim();
        keyword.is_empty() || title.to_lowercase().contains(&keyword.to_lowercase())
    }

    /// Resolves a card href into a canonical absolute link
    pub fn link(&self, href: &str) -> Option<String> {
        canonical_link(href, self.page_url)
    }

    /// Applies the shipping policy to a base price
    ///
    /// Returns the landed price and whether shipping is free.
    pub fn price_with_shipping(&self, base: f64, snippet: Option<&str>) -> (f64, bool) {
        let shipping = snippet.map(Shipping::parse).unwrap_or_default();
        (
            landed_price(base, &shipping, self.include_shipping),
            shipping.free,
        )
    }
}

/// Extracts candidate records from a page of `site`
///
/// Candidates without a usable price are dropped, as are candidates whose
/// title misses the context keyword when the site filters by keyword. Every
/// surviving record is tagged with the site name.
pub fn extract(html: &str, kind: PageKind, site: SiteId, ctx: &ExtractContext<'_>) -> Vec<DealRecord> {
    let document = Html::parse_document(html);
    let adapter = site.adapter();

    let candidates = adapter.extract(&document, kind, ctx);
    let found = candidates.len();

    let records: Vec<DealRecord> = candidates
        .into_iter()
        .filter(|record| record.price.is_finite() && record.price >= 0.0)
        .filter(|record| !record.link.is_empty())
        .filter(|record| !adapter.filters_by_keyword() || ctx.title_matches(&record.title))
        .map(|mut record| {
            record.source = site.name().to_string();
            record
        })
        .collect();

    tracing::debug!(
        "Extracted {} of {} candidates from {} page {}",
        records.len(),
        found,
        kind,
        ctx.page_url
    );

    records
}
