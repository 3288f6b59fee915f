use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use brickscout::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Dealabs.com/bons-plans").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.dealabs.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
