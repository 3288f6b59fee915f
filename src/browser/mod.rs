//! Page acquisition through rendering sessions
//!
//! A [`BrowserDriver`] launches one [`RenderSession`] per acquisition. The
//! sequence of steps run against a session lives in [`acquire`], so every
//! driver shares the same release guarantee: a launched session is released
//! exactly once, whatever step fails.

mod chromium;
mod http;

pub use chromium::ChromiumDriver;
pub use http::HttpDriver;

use crate::config::BrowserConfig;
use crate::model::PageKind;
use crate::sites::NavigationPlan;
use crate::ScoutError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Script installed before any page script runs
///
/// Hides the usual automation tells: the webdriver flag, an empty plugin list
/// and a missing `window.chrome`.
pub const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => false });
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });
Object.defineProperty(navigator, 'languages', { get: () => ['fr-FR', 'fr', 'en-US', 'en'] });
window.chrome = { runtime: {} };
"#;

/// Failure of a single session step
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SessionError(pub String);

impl SessionError {
    pub fn new(message: impl ToString) -> Self {
        Self(message.to_string())
    }
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Starts rendering sessions
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn launch(&self, config: &BrowserConfig) -> SessionResult<Box<dyn RenderSession>>;
}

/// One isolated page, open until [`RenderSession::release`] is called
#[async_trait]
pub trait RenderSession: Send {
    /// Registers a script to run before page scripts on every navigation
    async fn install_stealth(&mut self, script: &str) -> SessionResult<()>;

    async fn navigate(&mut self, url: &Url, timeout: Duration) -> SessionResult<()>;

    /// Clicks the first element matching `selector`; false if none was clicked
    async fn click_first(&mut self, selector: &str) -> bool;

    /// Blocks until an element matches `selector`, or fails after `timeout`
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> SessionResult<()>;

    async fn scroll_by(&mut self, pixels: u32) -> SessionResult<()>;

    async fn document_height(&mut self) -> SessionResult<u64>;

    /// Current markup of the whole document
    async fn content(&mut self) -> SessionResult<String>;

    /// Closes the session and frees its resources
    async fn release(self: Box<Self>);
}

/// Acquires the rendered markup of `url`
///
/// Launches a session, hides automation markers, navigates, lets the page
/// settle, dismisses the cookie prompt if the plan names one, waits for the
/// content marker and, for listings, scrolls until no more content loads.
///
/// # Errors
///
/// Every step failure is reported as [`ScoutError::Navigation`].
pub async fn acquire(
    driver: &dyn BrowserDriver,
    url: &Url,
    plan: &NavigationPlan,
    config: &BrowserConfig,
) -> Result<String, ScoutError> {
    let mut session = driver
        .launch(config)
        .await
        .map_err(|e| ScoutError::navigation(url.as_str(), format!("launch failed: {}", e)))?;

    let result = drive(session.as_mut(), url, plan, config).await;
    session.release().await;

    result.map_err(|e| ScoutError::navigation(url.as_str(), e))
}

async fn drive(
    session: &mut dyn RenderSession,
    url: &Url,
    plan: &NavigationPlan,
    config: &BrowserConfig,
) -> SessionResult<String> {
    let settle = Duration::from_millis(config.settle_delay_ms);

    session.install_stealth(STEALTH_SCRIPT).await?;

    tracing::debug!("Navigating to {}", url);
    session
        .navigate(url, Duration::from_millis(config.navigation_timeout_ms))
        .await?;
    tokio::time::sleep(settle).await;

    if let Some(consent) = plan.consent_selector {
        if session.click_first(consent).await {
            tracing::debug!("Dismissed cookie prompt on {}", url);
        }
    }

    let ready_timeout = match plan.kind {
        PageKind::Listing => config.listing_ready_timeout_ms,
        PageKind::Detail => config.detail_ready_timeout_ms,
    };
    session
        .wait_for_selector(plan.ready_selector, Duration::from_millis(ready_timeout))
        .await?;

    if plan.scroll {
        let steps = scroll_until_stable(session, config).await?;
        tracing::debug!("Scrolled {} steps on {}", steps, url);
        tokio::time::sleep(settle).await;
    }

    session.content().await
}

/// Scrolls step by step until the document stops growing
///
/// Stops when the scroll position has passed the document height and the last
/// step loaded nothing new, or after `max_scroll_attempts` steps. Returns the
/// number of steps taken.
async fn scroll_until_stable(
    session: &mut dyn RenderSession,
    config: &BrowserConfig,
) -> SessionResult<u32> {
    let interval = Duration::from_millis(config.scroll_interval_ms);
    let mut position: u64 = 0;
    let mut last_height = session.document_height().await?;

    for step in 1..=config.max_scroll_attempts {
        session.scroll_by(config.scroll_step_px).await?;
        position += u64::from(config.scroll_step_px);
        tokio::time::sleep(interval).await;

        let height = session.document_height().await?;
        if position >= height && height <= last_height {
            return Ok(step);
        }
        last_height = height;
    }

    Ok(config.max_scroll_attempts)
}
