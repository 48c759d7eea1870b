//! Browser-based page fetcher.
//!
//! Renders client-side content with chromiumoxide (CDP) before text
//! extraction, for pages that only populate their visible text after
//! script execution. The browser is launched once per run and closed at
//! the end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{visible_text, FetchError, PageFetcher};
use crate::config::Settings;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// Fetcher that renders pages in a headless browser before extraction.
pub struct BrowserFetcher {
    browser: Arc<Mutex<Browser>>,
    request_timeout: Duration,
    render_wait: Duration,
}

impl BrowserFetcher {
    /// Find a Chrome executable.
    fn find_chrome() -> Result<PathBuf, FetchError> {
        for path in CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        // Check if in PATH via `which`
        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(FetchError::Browser(
            "Chrome/Chromium not found; install it or run with --no-browser".to_string(),
        ))
    }

    /// Launch a headless browser for the run.
    pub async fn launch(settings: &Settings) -> Result<Self, FetchError> {
        let chrome_path = Self::find_chrome()?;

        info!("Launching browser (headless)");

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--no-sandbox") // Needed for headless in containers/restricted environments
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .build()
            .map_err(FetchError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // Spawn handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            request_timeout: settings.request_timeout,
            render_wait: settings.render_wait,
        })
    }

    /// Navigate, wait for the page to settle, and return its HTML.
    async fn render(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        tokio::time::timeout(self.request_timeout, navigation)
            .await
            .map_err(|_| FetchError::Timeout(url.to_string()))?
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // Let late-loading scripts populate the page
        tokio::time::sleep(self.render_wait).await;

        page.content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn extract_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("Rendering {}", url);

        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?
        };

        let result = self.render(&page, url).await;

        // Close the page to prevent tab accumulation
        let _ = page.close().await;

        Ok(visible_text(&result?))
    }

    async fn close(&self) -> Result<(), FetchError> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        let _ = browser.wait().await;
        Ok(())
    }
}
