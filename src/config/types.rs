use serde::Deserialize;
use std::path::Path;

/// Main configuration structure for Brickscout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub retry: RetryConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
    pub scheduler: SchedulerConfig,

    /// Extra hosts mapped onto a built-in site adapter
    #[serde(rename = "site-alias")]
    pub site_alias: Vec<SiteAlias>,
}

/// Rendering session settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    /// User agent presented by every session
    pub user_agent: String,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Maximum time for the initial navigation (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Pause after load so asynchronous widgets finish painting (milliseconds)
    pub settle_delay_ms: u64,

    /// Maximum wait for the listing content marker (milliseconds)
    pub listing_ready_timeout_ms: u64,

    /// Maximum wait for the detail content marker (milliseconds)
    pub detail_ready_timeout_ms: u64,

    /// Pixels scrolled per step while lazy-loading listing pages
    pub scroll_step_px: u32,

    /// Pause between scroll steps (milliseconds)
    pub scroll_interval_ms: u64,

    /// Upper bound on scroll steps per page
    pub max_scroll_attempts: u32,

    pub headless: bool,

    /// Explicit Chromium binary; looked up on PATH when absent
    pub chrome_executable: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36"
                .to_string(),
            viewport_width: 1366,
            viewport_height: 768,
            navigation_timeout_ms: 120_000,
            settle_delay_ms: 5_000,
            listing_ready_timeout_ms: 90_000,
            detail_ready_timeout_ms: 30_000,
            scroll_step_px: 500,
            scroll_interval_ms: 800,
            max_scroll_attempts: 40,
            headless: true,
            chrome_executable: None,
        }
    }
}

/// How the pause between attempts grows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// base, 2 x base, 3 x base, ...
    Linear,
    /// base, 2 x base, 4 x base, ...
    Exponential,
}

/// Retry controller settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryConfig {
    pub max_attempts: u32,

    /// Backoff unit (milliseconds)
    pub backoff_ms: u64,

    pub strategy: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 2_000,
            strategy: BackoffStrategy::Linear,
        }
    }
}

/// Extraction policy shared by every adapter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractionConfig {
    /// Add non-free shipping costs to the listed price
    pub include_shipping: bool,

    /// Word every title must contain on sites that mix product categories
    pub keyword: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            include_shipping: true,
            keyword: "lego".to_string(),
        }
    }
}

/// Persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Json,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the deal store
    pub store_path: String,

    /// Backend override; inferred from the store path extension when absent
    pub backend: Option<StoreBackend>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_path: "./data/deals.json".to_string(),
            backend: None,
        }
    }
}

impl OutputConfig {
    /// Returns the configured backend, or the one implied by the file extension
    ///
    /// `.db`, `.sqlite` and `.sqlite3` select SQLite; anything else is JSON.
    pub fn resolved_backend(&self) -> StoreBackend {
        if let Some(backend) = self.backend {
            return backend;
        }

        match Path::new(&self.store_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("db") | Some("sqlite") | Some("sqlite3") => StoreBackend::Sqlite,
            _ => StoreBackend::Json,
        }
    }
}

/// Scheduling of independent scrapes
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SchedulerConfig {
    /// Scrapes allowed in flight at once, each owning its own session
    pub max_concurrent_scrapes: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scrapes: 2,
        }
    }
}

/// Maps an additional host pattern onto a built-in adapter
#[derive(Debug, Clone, Deserialize)]
pub struct SiteAlias {
    /// Host pattern (e.g., "127.0.0.1" or "*.dealabs.fr")
    pub domain: String,

    /// Adapter name: "dealabs", "vinted" or "avenuedelabrique"
    pub site: String,
}
