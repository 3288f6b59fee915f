/// Checks if a host matches an adapter domain pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact: `"vinted.fr"` matches only `"vinted.fr"`
/// 2. Wildcard: `"*.dealabs.com"` matches `"dealabs.com"` and any subdomain
///    of it (`"www.dealabs.com"`, `"m.dealabs.com"`)
///
/// Comparison is case-insensitive.
///
/// # Examples
///
/// ```
/// use brickscout::url::matches_wildcard;
///
/// assert!(matches_wildcard("vinted.fr", "vinted.fr"));
/// assert!(!matches_wildcard("vinted.fr", "vinted.de"));
///
/// assert!(matches_wildcard("*.dealabs.com", "dealabs.com"));
/// assert!(matches_wildcard("*.dealabs.com", "m.dealabs.com"));
/// assert!(!matches_wildcard("*.dealabs.com", "notdealabs.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let candidate = candidate.to_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => candidate == base || candidate.ends_with(&format!(".{}", base)),
        None => candidate == pattern,
    }
}
