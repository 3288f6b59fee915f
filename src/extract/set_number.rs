//! LEGO set number inference

use regex::Regex;
use std::sync::OnceLock;

fn parenthesized_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d{4,6})\)").expect("parenthesized regex is valid"))
}

fn standalone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{4,6}\b").expect("standalone regex is valid"))
}

/// Unit words that mark a number as a piece count rather than a set number
const PIECE_UNITS: &[&str] = &[
    "pièces", "pièce", "pieces", "piece", "pcs", "pc", "éléments", "briques",
];

/// Infers a LEGO set number from a deal title and link
///
/// Rules, first match wins:
/// 1. 4 to 6 digits in parentheses in the title: `"(42096)"`
/// 2. A standalone 4 to 6 digit number in the title that is not
///    immediately followed by a piece-count unit (`"1580 pièces"`)
/// 3. A standalone 4 to 6 digit number in the URL
///
/// # Examples
///
/// ```
/// use brickscout::extract::infer_set_number;
///
/// let title = "LEGO Technic Car (42096) 42156 pièces";
/// assert_eq!(infer_set_number(title, ""), Some("42096".to_string()));
/// assert_eq!(infer_set_number("LEGO Star Wars", "https://x.fr/75192-faucon"), Some("75192".to_string()));
/// assert_eq!(infer_set_number("LEGO City", ""), None);
/// ```
pub fn infer_set_number(title: &str, url: &str) -> Option<String> {
    if let Some(caps) = parenthesized_re().captures(title) {
        return Some(caps[1].to_string());
    }

    for candidate in standalone_re().find_iter(title) {
        if !is_piece_count(&title[candidate.end()..]) {
            return Some(candidate.as_str().to_string());
        }
    }

    standalone_re()
        .find(url)
        .map(|candidate| candidate.as_str().to_string())
}

/// Returns true if the text right after a number names a piece-count unit
fn is_piece_count(rest: &str) -> bool {
    let rest = rest.trim_start().to_lowercase();
    PIECE_UNITS.iter().any(|unit| {
        rest.strip_prefix(unit)
            .map(|after| !after.starts_with(char::is_alphanumeric))
            .unwrap_or(false)
    })
}
