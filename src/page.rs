//! A browser page bound to one WebDriver session.
//!
//! Every element interaction goes through [`PageLocator`], which resolves its
//! [`Locator`] afresh on each call. Interactions poll until at least one
//! element matches or the action timeout elapses; read-only probes such as
//! [`PageLocator::count`] never wait.

use anyhow::{Context, Result};
use fantoccini::elements::Element;
use fantoccini::elements::ElementRef;
use serde_json::{Value, json};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use crate::config::Timeouts;
use crate::errors::DiscoverError;
use crate::locator::{Locator, RESOLVE_SCRIPT};
use crate::webdriver::{Browser, BrowserType};

/// W3C key identifying a serialized element reference
const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4d07a5f7c8b6";

/// WebDriver code point for the Enter key
pub const KEY_ENTER: &str = "\u{E007}";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Quiet period required before the network counts as idle
const NETWORK_QUIET: Duration = Duration::from_millis(500);

/// Installs an in-flight request counter once per document and reports the
/// loading state with a running total of finished resource loads.
const NETWORK_PROBE_SCRIPT: &str = r#"
    if (!window.__discover_net) {
        window.__discover_net = { inflight: 0, resources: 0 };
        const net = window.__discover_net;
        if (window.fetch) {
            const originalFetch = window.fetch;
            window.fetch = function(...args) {
                net.inflight++;
                return originalFetch.apply(this, args).finally(() => { net.inflight--; });
            };
        }
        const originalSend = XMLHttpRequest.prototype.send;
        XMLHttpRequest.prototype.send = function(...args) {
            net.inflight++;
            this.addEventListener('loadend', () => { net.inflight--; }, { once: true });
            return originalSend.apply(this, args);
        };
    }
    // Drain the timing buffer so it never fills up and stops counting
    const net = window.__discover_net;
    const fresh = performance.getEntriesByType('resource').length;
    if (fresh > 0) {
        net.resources += fresh;
        performance.clearResourceTimings();
    }
    return {
        ready: document.readyState,
        inflight: net.inflight,
        resources: net.resources
    };
"#;

const DOCUMENT_SIZE_SCRIPT: &str = r#"
    const doc = document.documentElement;
    const body = document.body || doc;
    return {
        width: Math.max(doc.scrollWidth, body.scrollWidth, window.innerWidth),
        height: Math.max(doc.scrollHeight, body.scrollHeight, window.innerHeight),
        chrome_width: Math.max(0, window.outerWidth - window.innerWidth),
        chrome_height: Math.max(0, window.outerHeight - window.innerHeight)
    };
"#;

/// Upper bound on the window height used for full-page captures
const MAX_CAPTURE_HEIGHT: u32 = 16_384;

#[derive(Debug, serde::Deserialize)]
pub(crate) struct NetworkState {
    pub(crate) ready: String,
    pub(crate) inflight: i64,
    pub(crate) resources: u64,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct DocumentSize {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) chrome_width: f64,
    pub(crate) chrome_height: f64,
}

/// Window size needed to show the whole document, or `None` when the
/// current window already covers it
pub(crate) fn capture_window(size: &DocumentSize, current: (u64, u64)) -> Option<(u32, u32)> {
    let width = (size.width + size.chrome_width).ceil() as u64;
    let height = ((size.height + size.chrome_height).ceil() as u64).min(MAX_CAPTURE_HEIGHT as u64);
    if width <= current.0 && height <= current.1 {
        return None;
    }
    Some((width.max(current.0) as u32, height.max(current.1) as u32))
}

/// One isolated browser page
pub struct Page {
    browser: Browser,
    base_url: Url,
    timeouts: Timeouts,
}

impl Page {
    pub fn new(browser: Browser, base_url: Url, timeouts: Timeouts) -> Self {
        Page {
            browser,
            base_url,
            timeouts,
        }
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn browser_type(&self) -> BrowserType {
        self.browser.browser_type()
    }

    /// Resolve `path` against the base URL
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Cannot resolve '{}' against {}", path, self.base_url))
    }

    /// Navigate relative to the base URL and wait for the document to load
    pub async fn goto(&self, path: &str) -> Result<()> {
        let url = self.resolve_url(path)?;
        info!("Navigating to {}", url);

        tokio::time::timeout(self.timeouts.navigation, self.browser.client.goto(url.as_str()))
            .await
            .map_err(|_| {
                DiscoverError::Timeout(format!(
                    "navigation to {} exceeded {}ms",
                    url,
                    self.timeouts.navigation.as_millis()
                ))
            })??;

        Ok(())
    }

    pub async fn url(&self) -> Result<Url> {
        Ok(self.browser.client.current_url().await?)
    }

    /// Wait until the document is complete and no request has been seen for
    /// the quiet period
    pub async fn wait_for_network_idle(&self) -> Result<()> {
        let deadline = Instant::now() + self.timeouts.navigation;
        let mut last_resources = None;
        let mut quiet_since = Instant::now();

        loop {
            let state: Option<NetworkState> = self
                .evaluate(NETWORK_PROBE_SCRIPT, vec![])
                .await
                .ok()
                .and_then(|v| serde_json::from_value(v).ok());

            match state {
                Some(state) if state.ready == "complete" && state.inflight <= 0 => {
                    if last_resources != Some(state.resources) {
                        last_resources = Some(state.resources);
                        quiet_since = Instant::now();
                    } else if quiet_since.elapsed() >= NETWORK_QUIET {
                        debug!("Network idle ({} resources)", state.resources);
                        return Ok(());
                    }
                }
                // Loading, busy, or mid-navigation: restart the quiet window
                _ => {
                    last_resources = None;
                    quiet_since = Instant::now();
                }
            }

            if Instant::now() >= deadline {
                return Err(DiscoverError::Timeout(format!(
                    "network did not become idle within {}ms",
                    self.timeouts.navigation.as_millis()
                ))
                .into());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn wait_for_timeout(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Run a script in the page
    pub async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.browser
            .client
            .execute(script, args)
            .await
            .context("Failed to execute script")
    }

    pub fn locator(&self, locator: Locator) -> PageLocator<'_> {
        PageLocator {
            page: self,
            locator,
        }
    }

    /// Capture a PNG to `path`; `full_page` grows the window to the document
    /// size for the duration of the capture. Returns the byte count.
    pub async fn screenshot(&self, path: &Path, full_page: bool) -> Result<usize> {
        let client = &self.browser.client;
        let restore = if full_page {
            self.grow_to_document().await.unwrap_or_else(|e| {
                debug!("Full-page resize failed, capturing viewport: {:#}", e);
                None
            })
        } else {
            None
        };

        let shot = client.screenshot().await;

        if let Some((w, h)) = restore {
            let _ = client.set_window_size(w, h).await;
        }

        let bytes = shot.context("Failed to capture screenshot")?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(bytes.len())
    }

    /// Returns the previous window size when a resize happened
    async fn grow_to_document(&self) -> Result<Option<(u32, u32)>> {
        let client = &self.browser.client;
        let size: DocumentSize =
            serde_json::from_value(self.evaluate(DOCUMENT_SIZE_SCRIPT, vec![]).await?)?;
        let (orig_w, orig_h) = client.get_window_size().await?;

        match capture_window(&size, (orig_w, orig_h)) {
            Some((width, height)) => {
                client.set_window_size(width, height).await?;
                Ok(Some((orig_w as u32, orig_h as u32)))
            }
            None => Ok(None),
        }
    }

    pub async fn close(self) -> Result<()> {
        self.browser.close().await
    }
}

/// A [`Locator`] bound to a page
#[derive(Clone)]
pub struct PageLocator<'p> {
    page: &'p Page,
    locator: Locator,
}

impl<'p> PageLocator<'p> {
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn first(&self) -> PageLocator<'p> {
        self.page.locator(self.locator.clone().first())
    }

    pub fn nth(&self, index: usize) -> PageLocator<'p> {
        self.page.locator(self.locator.clone().nth(index))
    }

    /// Narrow to descendants of the current matches
    pub fn within(&self, child: Locator) -> PageLocator<'p> {
        self.page.locator(self.locator.clone().locator(child))
    }

    pub fn parent(&self) -> PageLocator<'p> {
        self.page.locator(self.locator.clone().parent())
    }

    async fn query(&self, op: &str, arg: Value) -> Result<Value> {
        self.page
            .evaluate(
                RESOLVE_SCRIPT,
                vec![self.locator.to_descriptor(), json!(op), arg],
            )
            .await
            .with_context(|| format!("Failed to resolve {}", self.locator))
    }

    /// Number of elements currently matching
    pub async fn count(&self) -> Result<usize> {
        let value = self.query("count", Value::Null).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    /// Raw `textContent` of every match
    pub async fn all_text_contents(&self) -> Result<Vec<String>> {
        let value = self.query("texts", Value::Null).await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// Resolve to live element handles, possibly none
    pub async fn elements(&self) -> Result<Vec<Element>> {
        let value = self.query("elements", Value::Null).await?;
        let refs = value.as_array().cloned().unwrap_or_default();

        Ok(refs
            .iter()
            .filter_map(|r| r.get(ELEMENT_KEY).and_then(|id| id.as_str()))
            .map(|id| {
                Element::from_element_id(
                    self.page.browser.client.clone(),
                    ElementRef::from(id.to_string()),
                )
            })
            .collect())
    }

    /// Poll until something matches, failing after the action timeout
    pub async fn wait_for_element(&self) -> Result<Element> {
        let timeout = self.page.timeouts.action;
        let started = Instant::now();

        loop {
            if let Some(element) = self.elements().await?.into_iter().next() {
                return Ok(element);
            }
            if started.elapsed() >= timeout {
                return Err(DiscoverError::ElementNotFound {
                    locator: self.locator.to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                }
                .into());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait for the first match to become visible
    pub async fn wait_for_visible(&self, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        loop {
            if self.is_visible().await {
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(DiscoverError::Timeout(format!(
                    "{} not visible after {}ms",
                    self.locator,
                    timeout.as_millis()
                ))
                .into());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Visibility of the first match; any failure reads as not visible
    pub async fn is_visible(&self) -> bool {
        match self.query("visible", Value::Null).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(e) => {
                debug!("Visibility probe for {} failed: {:#}", self.locator, e);
                false
            }
        }
    }

    pub async fn click(&self) -> Result<()> {
        let element = self.wait_for_element().await?;
        debug!("Clicking {}", self.locator);
        element
            .click()
            .await
            .with_context(|| format!("Failed to click {}", self.locator))?;
        Ok(())
    }

    /// Replace the field's content with `text`
    pub async fn fill(&self, text: &str) -> Result<()> {
        let element = self.wait_for_element().await?;
        debug!("Filling {} with {:?}", self.locator, text);
        element.clear().await?;
        if !text.is_empty() {
            element.send_keys(text).await?;
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        let element = self.wait_for_element().await?;
        element.clear().await?;
        Ok(())
    }

    /// Send a key sequence to the first match
    pub async fn press(&self, keys: &str) -> Result<()> {
        let element = self.wait_for_element().await?;
        element.send_keys(keys).await?;
        Ok(())
    }

    pub async fn press_enter(&self) -> Result<()> {
        self.press(KEY_ENTER).await
    }

    /// Current `value` of the first match
    pub async fn input_value(&self) -> Result<String> {
        self.wait_for_element().await?;
        let value = self.query("value", Value::Null).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.wait_for_element().await?;
        let value = self.query("attribute", json!(name)).await?;
        Ok(value.as_str().map(str::to_string))
    }

    pub async fn text_content(&self) -> Result<Option<String>> {
        self.wait_for_element().await?;
        let value = self.query("text", Value::Null).await?;
        Ok(value.as_str().map(str::to_string))
    }

    /// Upper-case tag name of the first match
    pub async fn tag_name(&self) -> Result<String> {
        self.wait_for_element().await?;
        let value = self.query("tag", Value::Null).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;
