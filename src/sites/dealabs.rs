//! Dealabs: community deal forum, one thread per deal

use super::{RenderMode, SiteAdapter, SiteId};
use crate::extract::{
    best_image, best_srcset_candidate, first_attr, first_text, infer_set_number, normalize_price,
    parse_count, parse_french_timestamp, resolve_relative, select_all, select_first,
    shipping_snippet, text_of, thread_id, ExtractContext, StructuredData,
};
use crate::model::{DealRecord, PageKind};
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

const LISTING_CARD: &str = ".threadListCard";
const DETAIL_BLOCK: &str = r#".threadItemCard-content, article[data-handler="history thread-click"]"#;
const CONSENT_BUTTON: &str = r#"[id*="cookie"] button, [class*="cookie"] button, [id*="consent"] button"#;

fn comments_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*commentaires?").expect("comments regex is valid"))
}

pub struct Dealabs;

impl SiteAdapter for Dealabs {
    fn id(&self) -> SiteId {
        SiteId::Dealabs
    }

    /// Thread pages live under `/bons-plans/`; search results never count
    /// as threads even when they share the prefix.
    fn page_kind(&self, url: &Url) -> PageKind {
        if url.path().contains("/bons-plans/") && !url.as_str().contains("search") {
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
            PageKind::Listing => LISTING_CARD,
            PageKind::Detail => DETAIL_BLOCK,
        }
    }

    fn consent_selector(&self) -> Option<&'static str> {
        Some(CONSENT_BUTTON)
    }

    fn extract(&self, document: &Html, kind: PageKind, ctx: &ExtractContext<'_>) -> Vec<DealRecord> {
        let structured = StructuredData::from_document(document);
        match kind {
            PageKind::Listing => extract_listing(document, &structured, ctx),
            PageKind::Detail => extract_detail(document, &structured, ctx)
                .into_iter()
                .collect(),
        }
    }
}

fn extract_listing(
    document: &Html,
    structured: &StructuredData,
    ctx: &ExtractContext<'_>,
) -> Vec<DealRecord> {
    let thread_dates = structured.thread_dates();

    select_all(document.root_element(), LISTING_CARD)
        .into_iter()
        .filter_map(|card| listing_card(card, &thread_dates, ctx))
        .collect()
}

fn listing_card(
    card: ElementRef<'_>,
    thread_dates: &HashMap<String, DateTime<Utc>>,
    ctx: &ExtractContext<'_>,
) -> Option<DealRecord> {
    let title_link = select_first(card, ".cept-tt.thread-link")?;
    let title = text_of(title_link);
    let link = ctx.link(title_link.value().attr("href")?)?;
    let base = normalize_price(&first_text(card, ".thread-price")?)?;

    let (price, free_shipping) =
        ctx.price_with_shipping(base, shipping_snippet(card).as_deref());

    let posted_date = thread_id(&link)
        .and_then(|id| thread_dates.get(&id).copied())
        .or_else(|| {
            first_attr(card, ".chip--type-default .size--all-s[title]", "title")
                .and_then(|stamp| parse_french_timestamp(&stamp))
        })
        .or_else(|| {
            first_text(card, ".chip--type-default .size--all-s")
                .and_then(|age| resolve_relative(&age, ctx.now))
        });

    let mut record = DealRecord::new(link, title, price);
    record.set_number = infer_set_number(&record.title, &record.link);
    record.temperature = first_text(card, ".cept-vote-temp")
        .and_then(|t| parse_count(&t))
        .unwrap_or(0);
    record.comments_count = first_text(card, r#"a[title="Commentaires"]"#)
        .and_then(|c| parse_count(&c))
        .unwrap_or(0);
    record.posted_date = posted_date;
    record.free_shipping = free_shipping;
    record.image_url = select_first(card, ".threadListCard-image img")
        .map(best_image)
        .unwrap_or_default();

    Some(record)
}

fn extract_detail(
    document: &Html,
    structured: &StructuredData,
    ctx: &ExtractContext<'_>,
) -> Option<DealRecord> {
    let root = document.root_element();

    let title = first_text(root, ".thread-title span")
        .or_else(|| first_text(root, "h1"))
        .or_else(|| first_text(root, "title"))?;
    let link = ctx.link(ctx.page_url.as_str())?;
    let base = normalize_price(&first_text(root, ".thread-price, .threadItemCard-price")?)?;

    let (price, free_shipping) =
        ctx.price_with_shipping(base, shipping_snippet(root).as_deref());

    let stamp_selector = ".size--all-s.color--text-TranslucentSecondary[title]";
    let posted_date = structured
        .published_date()
        .or_else(|| {
            first_attr(root, stamp_selector, "title").and_then(|s| parse_french_timestamp(&s))
        })
        .or_else(|| {
            first_text(root, stamp_selector).and_then(|age| resolve_relative(&age, ctx.now))
        });

    let visible_comments = first_text(
        root,
        "h2.flex--inline.boxAlign-ai--all-c span.size--all-l, h2.flex--inline.boxAlign-ai--all-c span.size--fromW3-xl",
    )
    .and_then(|text| {
        comments_re()
            .captures(&text)
            .and_then(|caps| caps[1].parse::<i64>().ok())
    });

    let mut record = DealRecord::new(link, title, price);
    record.set_number = infer_set_number(&record.title, &record.link);
    record.temperature = first_text(root, ".cept-vote-temp")
        .and_then(|t| parse_count(&t))
        .unwrap_or(0);
    record.comments_count = visible_comments
        .filter(|count| *count > 0)
        .or_else(|| structured.comment_count())
        .unwrap_or(0);
    record.posted_date = posted_date;
    record.free_shipping = free_shipping;
    record.image_url = detail_image(root);

    Some(record)
}

fn detail_image(root: ElementRef<'_>) -> String {
    let Some(frame) = select_first(
        root,
        ".thread-image, .carousel-thumbnail-img, .threadItemCard-img picture",
    ) else {
        return String::new();
    };

    // Desktop source first, it carries the largest rendition
    if let Some(srcset) = first_attr(frame, r#"source[media="(min-width: 768px)"]"#, "srcset") {
        if let Some(best) = best_srcset_candidate(&srcset) {
            return best;
        }
    }

    if frame.value().name() == "img" {
        return best_image(frame);
    }

    select_first(frame, "img").map(best_image).unwrap_or_default()
}
