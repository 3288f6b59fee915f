//! Headless Chromium sessions over the DevTools protocol

use super::{BrowserDriver, RenderSession, SessionError, SessionResult};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Interval between two checks for the content marker
const SELECTOR_POLL: Duration = Duration::from_millis(250);

const LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-blink-features=AutomationControlled",
    "--disable-features=IsolateOrigins,site-per-process",
    "--disable-infobars",
    "--no-first-run",
];

/// Launches one Chromium process per session
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumDriver;

impl ChromiumDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn launch(&self, config: &BrowserConfig) -> SessionResult<Box<dyn RenderSession>> {
        let mut builder = LaunchConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Some(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                device_scale_factor: Some(1.0),
                ..Default::default()
            }))
            .args(LAUNCH_ARGS.iter().copied());

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let launch_config = builder.build().map_err(SessionError::new)?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| SessionError::new(format!("failed to launch Chromium: {}", e)))?;

        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let mut session = ChromiumSession {
            browser,
            page: None,
            handler_task,
        };

        // The session owns the process from here on; close it if the page fails
        match session.open_page(&config.user_agent).await {
            Ok(()) => Ok(Box::new(session)),
            Err(e) => {
                session.shutdown().await;
                Err(e)
            }
        }
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    async fn open_page(&mut self, user_agent: &str) -> SessionResult<()> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::new(format!("failed to open page: {}", e)))?;

        page.execute(SetUserAgentOverrideParams::new(user_agent))
            .await
            .map_err(|e| SessionError::new(format!("failed to set user agent: {}", e)))?;

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> SessionResult<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| SessionError::new("session has no open page"))
    }

    async fn shutdown(mut self) {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

/// Bounds a whole page load (request and load event) by `timeout`
async fn navigation_within<F, E>(timeout: Duration, load: F) -> SessionResult<()>
where
    F: std::future::Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, load).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(SessionError::new(format!("navigation failed: {}", e))),
        Err(_) => Err(SessionError::new(format!(
            "navigation timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn install_stealth(&mut self, script: &str) -> SessionResult<()> {
        self.page()?
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(script))
            .await
            .map_err(|e| SessionError::new(format!("failed to install stealth script: {}", e)))?;
        Ok(())
    }

    async fn navigate(&mut self, url: &Url, timeout: Duration) -> SessionResult<()> {
        let page = self.page()?;
        let load = async {
            page.goto(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<(), CdpError>(())
        };
        navigation_within(timeout, load).await
    }

    async fn click_first(&mut self, selector: &str) -> bool {
        let Ok(page) = self.page() else {
            return false;
        };
        match page.find_element(selector).await {
            Ok(element) => element.click().await.is_ok(),
            Err(_) => false,
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> SessionResult<()> {
        let page = self.page()?;
        let poll = async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(SELECTOR_POLL).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            SessionError::new(format!(
                "{} did not appear within {}ms",
                selector,
                timeout.as_millis()
            ))
        })
    }

    async fn scroll_by(&mut self, pixels: u32) -> SessionResult<()> {
        self.page()?
            .evaluate(format!("window.scrollBy(0, {})", pixels))
            .await
            .map_err(|e| SessionError::new(format!("scroll failed: {}", e)))?;
        Ok(())
    }

    async fn document_height(&mut self) -> SessionResult<u64> {
        let height: f64 = self
            .page()?
            .evaluate("document.body ? document.body.scrollHeight : 0")
            .await
            .map_err(|e| SessionError::new(format!("failed to read height: {}", e)))?
            .into_value()
            .map_err(|e| SessionError::new(format!("unexpected height value: {:?}", e)))?;
        Ok(height.max(0.0) as u64)
    }

    async fn content(&mut self) -> SessionResult<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| SessionError::new(format!("failed to read content: {}", e)))
    }

    async fn release(self: Box<Self>) {
        self.shutdown().await;
    }
}
