//! Avenue de la Brique: LEGO-only price comparator, server-rendered

use super::{RenderMode, SiteAdapter, SiteId};
use crate::extract::{
    best_image, first_text, infer_set_number, normalize_price, select_all, select_first,
    ExtractContext,
};
use crate::model::{DealRecord, PageKind};
use scraper::{ElementRef, Html};
use url::Url;

const PRODUCT_CARD: &str = "div.prods a";

pub struct AvenueDeLaBrique;

impl SiteAdapter for AvenueDeLaBrique {
    fn id(&self) -> SiteId {
        SiteId::AvenueDeLaBrique
    }

    fn page_kind(&self, _url: &Url) -> PageKind {
        PageKind::Listing
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::Static
    }

    fn ready_selector(&self, _kind: PageKind) -> &'static str {
        "div.prods"
    }

    /// Every product on this site is a LEGO set
    fn filters_by_keyword(&self) -> bool {
        false
    }

    fn extract(&self, document: &Html, _kind: PageKind, ctx: &ExtractContext<'_>) -> Vec<DealRecord> {
        select_all(document.root_element(), PRODUCT_CARD)
            .into_iter()
            .filter_map(|card| product_card(card, ctx))
            .collect()
    }
}

fn product_card(card: ElementRef<'_>, ctx: &ExtractContext<'_>) -> Option<DealRecord> {
    let attrs = card.value();
    let link = ctx.link(attrs.attr("href")?)?;
    let title = attrs.attr("title").map(str::trim).unwrap_or_default().to_string();
    let price = normalize_price(&first_text(card, "span.prodl-prix span")?)?;

    let mut record = DealRecord::new(link, title, price);
    record.set_number = infer_set_number(&record.title, &record.link);
    record.image_url = select_first(card, "img")
        .map(best_image)
        .map(|src| ctx.link(&src).unwrap_or(src))
        .unwrap_or_default();
    Some(record)
}
