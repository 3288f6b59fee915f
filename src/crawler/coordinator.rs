//! Scrape orchestration: adapter resolution, retries and merging
//!
//! The coordinator owns the adapter registry, the two page drivers (a
//! browser for rendered sites, plain HTTP for static ones) and the deal
//! store. Scrapes may run concurrently; merges are serialized through a
//! single async mutex around the store.

use crate::browser::{acquire, BrowserDriver, ChromiumDriver, HttpDriver};
use crate::config::Config;
use crate::crawler::retry::{run_with_retry, RetryPolicy};
use crate::extract::{extract, ExtractContext};
use crate::model::DealRecord;
use crate::sites::{AdapterRegistry, RenderMode};
use crate::storage::{merge_into_store, open_store, DealStore, MergeStats};
use crate::ScoutError;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Store handle shared by concurrent scrapes
pub type SharedStore = Arc<Mutex<Box<dyn DealStore>>>;

/// Main scrape coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    registry: AdapterRegistry,
    policy: RetryPolicy,
    browser: Arc<dyn BrowserDriver>,
    fetcher: Arc<dyn BrowserDriver>,
    store: SharedStore,
}

impl Coordinator {
    /// Creates a coordinator with the production drivers and configured store
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to scrape
    /// * `Err(ScoutError)` - The store or the HTTP client could not be set up
    pub fn new(config: Config) -> Result<Self, ScoutError> {
        let store = open_store(&config.output)?;
        let fetcher = HttpDriver::new(&config.browser)?;

        Ok(Self::with_drivers(
            config,
            Arc::new(ChromiumDriver::new()),
            Arc::new(fetcher),
            store,
        ))
    }

    /// Creates a coordinator from explicit parts
    pub fn with_drivers(
        config: Config,
        browser: Arc<dyn BrowserDriver>,
        fetcher: Arc<dyn BrowserDriver>,
        store: Box<dyn DealStore>,
    ) -> Self {
        let registry = AdapterRegistry::new(&config.site_alias);
        let policy = RetryPolicy::from_config(&config.retry);

        Self {
            config: Arc::new(config),
            registry,
            policy,
            browser,
            fetcher,
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Creates a coordinator that acquires every site through `driver`
    pub fn with_driver(
        config: Config,
        driver: Arc<dyn BrowserDriver>,
        store: Box<dyn DealStore>,
    ) -> Self {
        Self::with_drivers(config, Arc::clone(&driver), driver, store)
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    /// Scrapes one target and merges the result into the store
    ///
    /// Navigation and extraction failures are retried and, once exhausted,
    /// give an empty batch. Returns the merged batch.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - the target is not a URL served by a known site
    /// * `Persistence` - the merged batch could not be written
    pub async fn scrape(&self, target: &str) -> Result<Vec<DealRecord>, ScoutError> {
        let (url, site) = self.registry.resolve_target(target)?;
        let adapter = site.adapter();
        let kind = adapter.page_kind(&url);
        let plan = adapter.navigation_plan(kind);

        let driver: &dyn BrowserDriver = match adapter.render_mode() {
            RenderMode::Browser => self.browser.as_ref(),
            RenderMode::Static => self.fetcher.as_ref(),
        };

        tracing::info!("Scraping {} ({} {} page)", url, site, kind);

        let page_url = &url;
        let outcome = run_with_retry(&self.policy, kind, page_url, |_attempt| async move {
            let html = acquire(driver, page_url, &plan, &self.config.browser).await?;
            let ctx = self.extract_context(page_url);
            Ok(extract(&html, kind, site, &ctx))
        })
        .await;

        if let Some(error) = &outcome.last_error {
            tracing::warn!(
                "Scrape of {} failed after {} attempts: {}",
                url,
                outcome.attempts,
                error
            );
        }

        let stats = self.merge(&outcome.records, kind.provenance()).await?;
        tracing::info!(
            "Finished {}: {} deals in {} attempts ({})",
            url,
            outcome.records.len(),
            outcome.attempts,
            stats
        );

        Ok(outcome.records)
    }

    /// Scrapes several targets, at most `max-concurrent-scrapes` at a time
    ///
    /// One failing target does not stop the others. Results come back in
    /// completion order, each paired with its target.
    pub async fn scrape_all(
        &self,
        targets: &[String],
    ) -> Vec<(String, Result<Vec<DealRecord>, ScoutError>)> {
        let limit = self.config.scheduler.max_concurrent_scrapes.max(1);

        stream::iter(targets.iter().cloned())
            .map(|target| async move {
                let result = self.scrape(&target).await;
                if let Err(e) = &result {
                    tracing::warn!("Scrape of {} aborted: {}", target, e);
                }
                (target, result)
            })
            .buffer_unordered(limit)
            .collect()
            .await
    }

    fn extract_context<'a>(&self, page_url: &'a Url) -> ExtractContext<'a> {
        ExtractContext {
            page_url,
            now: Utc::now(),
            keyword: self.config.extraction.keyword.clone(),
            include_shipping: self.config.extraction.include_shipping,
        }
    }

    async fn merge(
        &self,
        batch: &[DealRecord],
        provenance: crate::model::Provenance,
    ) -> Result<MergeStats, ScoutError> {
        if batch.is_empty() {
            return Ok(MergeStats::default());
        }

        let mut store = self.store.lock().await;
        let stats = merge_into_store(store.as_mut(), batch, provenance)?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{instant_config, FailAt, ScriptedDriver};
    use crate::config::{RetryConfig, SiteAlias};
    use crate::storage::{JsonStore, StorageError, StorageResult};

    const LISTING: &str = r#"<html><body>
        <article class="threadListCard">
            <a class="cept-tt thread-link" href="/bons-plans/lego-technic-42096-101">LEGO Technic 42096</a>
            <span class="thread-price">49,99€</span>
            <span class="cept-vote-temp">120°</span>
        </article>
        <article class="threadListCard">
            <a class="cept-tt thread-link" href="/bons-plans/lego-city-60337-102">LEGO City 60337</a>
            <span class="thread-price">89,99€</span>
            <span class="cept-vote-temp">45°</span>
        </article>
    </body></html>"#;

    fn test_config() -> Config {
        Config {
            browser: instant_config(),
            retry: RetryConfig {
                max_attempts: 3,
                backoff_ms: 0,
                ..RetryConfig::default()
            },
            ..Config::default()
        }
    }

    fn json_store(dir: &tempfile::TempDir) -> Box<dyn DealStore> {
        Box::new(JsonStore::open(dir.path().join("deals.json")).unwrap())
    }

    #[tokio::test]
    async fn test_scrape_merges_listing() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(ScriptedDriver::serving(LISTING));
        let coordinator = Coordinator::with_driver(test_config(), driver.clone(), json_store(&dir));

        let records = coordinator
            .scrape("https://www.dealabs.com/groupe/lego")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        let stored = coordinator.store().lock().await.load_all().unwrap();
        assert_eq!(stored, records);
        assert_eq!(driver.counters.launches(), 1);
        assert_eq!(driver.counters.releases(), 1);
    }

    #[tokio::test]
    async fn test_unknown_site_is_rejected_without_launching() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(ScriptedDriver::serving(LISTING));
        let coordinator = Coordinator::with_driver(test_config(), driver.clone(), json_store(&dir));

        let err = coordinator.scrape("https://www.amazon.fr/lego").await.unwrap_err();
        assert!(matches!(err, ScoutError::InvalidInput(_)));
        assert_eq!(driver.counters.launches(), 0);
    }

    #[tokio::test]
    async fn test_two_failures_then_success() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(ScriptedDriver::new(vec![
            (FailAt::Navigate, String::new()),
            (FailAt::ReadyMarker, String::new()),
            (FailAt::Nothing, LISTING.to_string()),
        ]));
        let coordinator = Coordinator::with_driver(test_config(), driver.clone(), json_store(&dir));

        let records = coordinator
            .scrape("https://www.dealabs.com/groupe/lego")
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(driver.counters.launches(), 3);
        assert_eq!(driver.counters.releases(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_give_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(ScriptedDriver::serving("<html><body>Aucun résultat</body></html>"));
        let coordinator = Coordinator::with_driver(test_config(), driver.clone(), json_store(&dir));

        let records = coordinator
            .scrape("https://www.dealabs.com/groupe/lego")
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(driver.counters.launches(), 3);
        assert!(!dir.path().join("deals.json").exists());
    }

    #[tokio::test]
    async fn test_alias_routes_to_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(ScriptedDriver::serving(LISTING));
        let mut config = test_config();
        config.site_alias.push(SiteAlias {
            domain: "localhost".to_string(),
            site: "dealabs".to_string(),
        });
        let coordinator = Coordinator::with_driver(config, driver, json_store(&dir));

        let records = coordinator.scrape("http://localhost:9/groupe/lego").await.unwrap();
        assert_eq!(records[0].link, "http://localhost:9/bons-plans/lego-technic-42096-101");
    }

    struct BrokenStore;

    impl DealStore for BrokenStore {
        fn load_all(&self) -> StorageResult<Vec<DealRecord>> {
            Ok(Vec::new())
        }

        fn replace_all(&mut self, _records: &[DealRecord]) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only volume",
            )))
        }

        fn insert(&mut self, _record: &DealRecord) -> StorageResult<()> {
            unreachable!()
        }

        fn get(&self, _link: &str) -> StorageResult<Option<DealRecord>> {
            Ok(None)
        }

        fn replace(&mut self, _record: &DealRecord) -> StorageResult<()> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_persistence_error_propagates() {
        let driver = Arc::new(ScriptedDriver::serving(LISTING));
        let coordinator = Coordinator::with_driver(test_config(), driver.clone(), Box::new(BrokenStore));

        let err = coordinator
            .scrape("https://www.dealabs.com/groupe/lego")
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::Persistence(_)));
        assert_eq!(driver.counters.launches(), 1);
    }

    #[tokio::test]
    async fn test_scrape_all_reports_each_target() {
        let dir = tempfile::tempdir().unwrap();
        let driver = Arc::new(ScriptedDriver::serving(LISTING));
        let coordinator = Coordinator::with_driver(test_config(), driver, json_store(&dir));

        let targets = vec![
            "https://www.dealabs.com/groupe/lego".to_string(),
            "ftp://nowhere".to_string(),
        ];
        let mut results = coordinator.scrape_all(&targets).await;
        results.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].1, Err(ScoutError::InvalidInput(_))));
        assert_eq!(results[1].1.as_ref().unwrap().len(), 2);
    }
}
