//! Plain HTTP sessions for server-rendered sites

use super::{BrowserDriver, RenderSession, SessionError, SessionResult};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Fetches pages with a single GET, without running any script
///
/// Stealth and scrolling are no-ops; the content marker is checked against
/// the fetched markup.
#[derive(Debug, Clone)]
pub struct HttpDriver {
    client: Client,
}

impl HttpDriver {
    /// Builds the shared HTTP client
    ///
    /// # Arguments
    ///
    /// * `config` - Session settings; only the user agent is used
    pub fn new(config: &BrowserConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl BrowserDriver for HttpDriver {
    async fn launch(&self, _config: &BrowserConfig) -> SessionResult<Box<dyn RenderSession>> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            body: None,
        }))
    }
}

struct HttpSession {
    client: Client,
    body: Option<String>,
}

impl HttpSession {
    fn body(&self) -> SessionResult<&str> {
        self.body
            .as_deref()
            .ok_or_else(|| SessionError::new("no page loaded"))
    }
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn install_stealth(&mut self, _script: &str) -> SessionResult<()> {
        Ok(())
    }

    async fn navigate(&mut self, url: &Url, timeout: Duration) -> SessionResult<()> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SessionError::new(format!("request timed out after {}ms", timeout.as_millis()))
                } else {
                    SessionError::new(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::new(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SessionError::new(format!("failed to read body: {}", e)))?;
        self.body = Some(body);
        Ok(())
    }

    async fn click_first(&mut self, _selector: &str) -> bool {
        false
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> SessionResult<()> {
        let parsed = Selector::parse(selector)
            .map_err(|e| SessionError::new(format!("invalid selector {}: {:?}", selector, e)))?;

        let document = Html::parse_document(self.body()?);
        if document.select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(SessionError::new(format!("{} not found in page", selector)))
        }
    }

    async fn scroll_by(&mut self, _pixels: u32) -> SessionResult<()> {
        Ok(())
    }

    async fn document_height(&mut self) -> SessionResult<u64> {
        Ok(0)
    }

    async fn content(&mut self) -> SessionResult<String> {
        self.body().map(str::to_string)
    }

    async fn release(self: Box<Self>) {}
}
