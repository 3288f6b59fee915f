//! Vinted: second-hand marketplace, one item per listing

use super::{RenderMode, SiteAdapter, SiteId};
use crate::extract::{
    best_image, first_attr, first_text, infer_set_number, normalize_price, parse_count,
    select_all, select_first, ExtractContext,
};
use crate::model::{DealRecord, PageKind};
use scraper::{ElementRef, Html};
use url::Url;

const LISTING_READY: &str = r#"[data-testid="serp-item"], .feed-grid__item"#;

pub struct Vinted;

impl SiteAdapter for Vinted {
    fn id(&self) -> SiteId {
        SiteId::Vinted
    }

    fn page_kind(&self, url: &Url) -> PageKind {
        if url.path().contains("/items/") {
            PageKind::Detail
        } else {
            PageKind::Listing
        }
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::Browser
    }

    fn ready_selector(&self, kind: PageKind) -> &'static str {
        match kind {
            PageKind::Listing => LISTING_READY,
            PageKind::Detail => "h1",
        }
    }

    fn consent_selector(&self) -> Option<&'static str> {
        Some(r#"[data-testid="cookie-policy-modal-accept"]"#)
    }

    fn extract(&self, document: &Html, kind: PageKind, ctx: &ExtractContext<'_>) -> Vec<DealRecord> {
        let root = document.root_element();
        match kind {
            PageKind::Listing => {
                let mut cards = select_all(root, r#"[data-testid="serp-item"]"#);
                if cards.is_empty() {
                    cards = select_all(root, ".feed-grid__item");
                }
                cards
                    .into_iter()
                    .filter_map(|card| item_card(card, ctx))
                    .collect()
            }
            PageKind::Detail => item_page(root, ctx).into_iter().collect(),
        }
    }
}

fn item_card(card: ElementRef<'_>, ctx: &ExtractContext<'_>) -> Option<DealRecord> {
    let link = item_link(&first_attr(card, "a", "href")?, ctx)?;
    let title = first_text(card, r#"[data-testid="title"]"#)
        .or_else(|| first_attr(card, "a", "title"))
        .unwrap_or_default();
    let price = normalize_price(&first_text(card, r#"[data-testid="price"]"#)?)?;

    let mut record = DealRecord::new(link, title, price);
    record.set_number = infer_set_number(&record.title, &record.link);
    record.temperature = favourites(card);
    record.image_url = select_first(card, "img").map(best_image).unwrap_or_default();
    Some(record)
}

fn item_page(root: ElementRef<'_>, ctx: &ExtractContext<'_>) -> Option<DealRecord> {
    let title = first_text(root, "h1")?;
    let link = item_link(ctx.page_url.as_str(), ctx)?;
    let price = normalize_price(&first_text(root, r#"[data-testid="price-text"]"#)?)?;

    let mut record = DealRecord::new(link, title, price);
    record.set_number = infer_set_number(&record.title, &record.link);
    record.temperature = favourites(root);
    record.image_url = select_first(root, r#"[data-testid="image-container"] img"#)
        .map(best_image)
        .unwrap_or_default();
    Some(record)
}

/// Canonical item link: the query only carries navigation state
/// (`referrer`, `search_id`, ...), so an item is keyed by its path alone
fn item_link(href: &str, ctx: &ExtractContext<'_>) -> Option<String> {
    let mut url = Url::parse(&ctx.link(href)?).ok()?;
    url.set_query(None);
    Some(url.to_string())
}

fn favourites(scope: ElementRef<'_>) -> i64 {
    first_text(scope, r#"[data-testid="favorites-count"]"#)
        .and_then(|text| parse_count(&text))
        .unwrap_or(0)
}
