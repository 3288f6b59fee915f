use super::SiteId;
use crate::config::SiteAlias;
use crate::url::{extract_domain, matches_wildcard, parse_target};
use crate::ScoutError;
use url::Url;

/// Host-pattern table resolving target URLs to site adapters
///
/// Built once at startup. Configured aliases are checked before the built-in
/// domains, so an alias can point a mirror or a local test server at a known
/// adapter.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    entries: Vec<(String, SiteId)>,
}

impl AdapterRegistry {
    /// Builds the table from configured aliases and the built-in domains
    ///
    /// Aliases naming an unknown site are skipped; config validation rejects
    /// them before this point.
    pub fn new(aliases: &[SiteAlias]) -> Self {
        let mut entries = Vec::new();

        for alias in aliases {
            match SiteId::from_name(&alias.site) {
                Some(site) => entries.push((alias.domain.to_lowercase(), site)),
                None => tracing::warn!("Ignoring alias {} for unknown site {}", alias.domain, alias.site),
            }
        }

        for site in SiteId::ALL {
            for pattern in site.default_domains() {
                entries.push((pattern.to_string(), site));
            }
        }

        Self { entries }
    }

    /// Finds the site serving `url`, if any
    pub fn resolve(&self, url: &Url) -> Option<SiteId> {
        let host = extract_domain(url)?;
        self.entries
            .iter()
            .find(|(pattern, _)| matches_wildcard(pattern, &host))
            .map(|(_, site)| *site)
    }

    /// Parses a raw target and resolves its site
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the target is not an http(s) URL or when no adapter
    /// serves its host.
    pub fn resolve_target(&self, raw: &str) -> Result<(Url, SiteId), ScoutError> {
        let url = parse_target(raw)
            .map_err(|e| ScoutError::InvalidInput(format!("{}: {}", raw.trim(), e)))?;

        match self.resolve(&url) {
            Some(site) => Ok((url, site)),
            None => Err(ScoutError::InvalidInput(format!(
                "no adapter for {}",
                url.host_str().unwrap_or_default()
            ))),
        }
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(&[])
    }
}
