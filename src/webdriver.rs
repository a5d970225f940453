use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::DiscoverError;
use crate::types::ViewportSize;
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    pub fn driver_name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }
}

/// Launch options for one isolated browser session
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub browser_type: BrowserType,
    pub viewport: ViewportSize,
    pub headless: bool,
}

/// One WebDriver session with its own throwaway profile
pub struct Browser {
    pub(crate) client: Client,
    browser_type: BrowserType,
    // Removed on drop; keeps sessions from sharing cookies or storage
    _profile_dir: tempfile::TempDir,
}

impl Browser {
    /// Start a fresh session, auto-starting the WebDriver server if needed
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let browser_type = options.browser_type;
        info!("Connecting to {:?} WebDriver", browser_type);

        let webdriver_url = GLOBAL_WEBDRIVER_MANAGER
            .ensure_driver(&browser_type)
            .await
            .map_err(|e| DiscoverError::WebDriverFailed(format!("{:#}", e)))?;

        let profile_dir = tempfile::Builder::new()
            .prefix(&format!("discover-{:?}-", browser_type).to_lowercase())
            .tempdir()
            .context("Failed to create browser profile directory")?;

        let caps = Self::capabilities(options, profile_dir.path());
        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("Session is already started")
                    || error_str.contains("session not created")
                {
                    // Other sessions may still be using this driver, so only
                    // retry; a driver that died is replaced by ensure_driver
                    info!("Session was not created, retrying once");
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

                    let retry_url = GLOBAL_WEBDRIVER_MANAGER
                        .ensure_driver(&browser_type)
                        .await
                        .map_err(|e| DiscoverError::WebDriverFailed(format!("{:#}", e)))?;

                    ClientBuilder::rustls()
                        .capabilities(caps)
                        .connect(&retry_url)
                        .await
                        .map_err(|e| {
                            DiscoverError::WebDriverFailed(format!(
                                "Failed to connect to WebDriver after retry: {}",
                                e
                            ))
                        })?
                } else {
                    return Err(DiscoverError::WebDriverFailed(format!(
                        "Failed to connect to WebDriver at {}: {}",
                        webdriver_url, e
                    ))
                    .into());
                }
            }
        };

        let vp = options.viewport;
        debug!("Setting viewport to {}", vp);
        if let Err(e) = client.set_window_size(vp.width, vp.height).await {
            // Window sizing is best-effort; headless Firefox sometimes refuses it
            debug!("Could not set window size: {}", e);
        }

        Ok(Browser {
            client,
            browser_type,
            _profile_dir: profile_dir,
        })
    }

    fn capabilities(
        options: &LaunchOptions,
        profile_path: &Path,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        let vp = options.viewport;

        match options.browser_type {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if options.headless {
                    args.push("--headless".to_string());
                }
                args.push(format!("--width={}", vp.width));
                args.push(format!("--height={}", vp.height));
                args.push("-profile".to_string());
                args.push(profile_path.display().to_string());

                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
            BrowserType::Chrome => {
                let mut args = vec!["--no-sandbox".to_string()];
                if options.headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                args.push(format!("--window-size={},{}", vp.width, vp.height));
                args.push(format!("--user-data-dir={}", profile_path.display()));

                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
        }

        caps
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser_type
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod webdriver_test;
