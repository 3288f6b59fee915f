use crate::UrlError;
use url::Url;

/// Query parameters that only carry tracking information
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "xtor"];

/// Parses and validates a scrape target
///
/// Only absolute `http`/`https` URLs with a host are accepted.
///
/// # Examples
///
/// ```
/// use brickscout::url::parse_target;
///
/// assert!(parse_target("https://www.dealabs.com/search?q=lego").is_ok());
/// assert!(parse_target("ftp://dealabs.com/").is_err());
/// assert!(parse_target("dealabs.com").is_err());
/// ```
pub fn parse_target(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Resolves a deal href into the canonical link used as the record key
///
/// Relative hrefs are joined onto `base`. The fragment and tracking query
/// parameters are removed; remaining parameters keep their order.
///
/// Returns `None` for empty hrefs, fragment-only hrefs, non-HTTP schemes and
/// anything that fails to resolve.
///
/// # Examples
///
/// ```
/// use brickscout::url::canonical_link;
/// use url::Url;
///
/// let base = Url::parse("https://www.dealabs.com/search?q=lego").unwrap();
/// assert_eq!(
///     canonical_link("/bons-plans/lego-42096-123#comments", &base).as_deref(),
///     Some("https://www.dealabs.com/bons-plans/lego-42096-123"),
/// );
/// ```
pub fn canonical_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Some(url.to_string())
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
