//! Small helpers over `scraper` used by every site adapter
//!
//! Selectors are parsed at the call site; an invalid selector behaves like a
//! selector that matches nothing.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::OnceLock;

fn count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+").expect("count regex is valid"))
}

fn srcset_width_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)x\d+").expect("srcset width regex is valid"))
}

/// Returns the first element under `scope` matching `css`
pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Returns every element under `scope` matching `css`, in document order
pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collects an element's text with runs of whitespace collapsed
pub fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match, if that text is non-empty
pub fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select_first(scope, css)
        .map(text_of)
        .filter(|text| !text.is_empty())
}

/// Attribute of the first match, if present and non-empty
pub fn first_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_first(scope, css)
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads the first signed integer in a counter text (`"152°"`, `"-12°"`, `"8"`)
pub fn parse_count(text: &str) -> Option<i64> {
    count_re().find(text)?.as_str().parse().ok()
}

/// Picks the widest candidate from a `srcset` attribute
///
/// Candidates are compared on the first `WxH` found in their URL; ties and
/// candidates without dimensions keep the earliest entry.
pub fn best_srcset_candidate(srcset: &str) -> Option<String> {
    let width = |candidate: &str| -> u32 {
        srcset_width_re()
            .captures(candidate)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0)
    };

    let mut best: Option<&str> = None;
    for candidate in srcset.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        match best {
            Some(current) if width(candidate) <= width(current) => {}
            _ => best = Some(candidate),
        }
    }

    best.and_then(|candidate| candidate.split_whitespace().next())
        .map(str::to_string)
}

/// Best image URL of an `<img>`: widest `srcset` candidate, else `src`
pub fn best_image(img: ElementRef<'_>) -> String {
    let attrs = img.value();
    attrs
        .attr("srcset")
        .and_then(best_srcset_candidate)
        .or_else(|| attrs.attr("src").map(|src| src.trim().to_string()))
        .unwrap_or_default()
}

/// Text of the shipping snippet next to a truck icon inside `scope`
pub fn shipping_snippet(scope: ElementRef<'_>) -> Option<String> {
    let icon = select_first(scope, ".icon--truck")?;
    let parent = icon.parent().and_then(ElementRef::wrap)?;
    first_text(parent, ".overflow--wrap-off")
}
