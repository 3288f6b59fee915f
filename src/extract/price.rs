//! Price and shipping normalization

use regex::Regex;
use std::sync::OnceLock;

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("amount regex is valid"))
}

/// Words that mark a shipping snippet as free
const FREE_MARKERS: &[&str] = &["gratuit", "free"];

/// Extracts the first amount from a price text
///
/// The first integer-or-decimal substring is taken and a decimal comma is
/// read as a decimal point. Currency symbols and surrounding words are
/// ignored.
///
/// # Examples
///
/// ```
/// use brickscout::extract::normalize_price;
///
/// assert_eq!(normalize_price("49,99 €"), Some(49.99));
/// assert_eq!(normalize_price("Prix : 120€"), Some(120.0));
/// assert_eq!(normalize_price("GRATUIT"), None);
/// ```
pub fn normalize_price(raw: &str) -> Option<f64> {
    let matched = amount_re().find(raw)?;
    matched.as_str().replace(',', ".").parse::<f64>().ok()
}

/// Shipping information read from a deal's shipping snippet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shipping {
    /// The snippet says shipping is free
    pub free: bool,

    /// Shipping cost, when the snippet is not free and carries an amount
    pub cost: Option<f64>,
}

impl Shipping {
    /// Interprets a shipping snippet; an empty snippet means "unknown"
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::default();
        }

        let lower = text.to_lowercase();
        if FREE_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return Self {
                free: true,
                cost: None,
            };
        }

        Self {
            free: false,
            cost: normalize_price(text),
        }
    }
}

/// Total landed cost of a deal
///
/// With `include_shipping`, a known shipping cost is added to the base price.
/// The result is rounded to cents.
pub fn landed_price(base: f64, shipping: &Shipping, include_shipping: bool) -> f64 {
    let total = match shipping.cost {
        Some(cost) if include_shipping => base + cost,
        _ => base,
    };
    round_cents(total)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
