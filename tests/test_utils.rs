// Test utilities for browser-backed tests

#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

use discover_e2e::config::{OutputPaths, RunConfig};
use discover_e2e::logger::LogSink;
use discover_e2e::webdriver::BrowserType;
use discover_e2e::Fixture;

// Serializes WebDriver starts across tests in one binary
lazy_static::lazy_static! {
    static ref WEBDRIVER_LOCK: Arc<Mutex<()>> = Arc::new(Mutex::new(()));
}

/// Browser chosen with TEST_BROWSER, Chrome by default
pub fn test_browser() -> BrowserType {
    match std::env::var("TEST_BROWSER").as_deref() {
        Ok("firefox") => BrowserType::Firefox,
        _ => BrowserType::Chrome,
    }
}

/// Configuration aimed at `base_url` with artifacts under a temp dir
pub fn test_config(base_url: &str) -> (RunConfig, TempDir) {
    let artifacts = TempDir::new().expect("Failed to create temp dir");
    let mut config = RunConfig::from_lookup(|_| None);
    config.environment.base_url = base_url.to_string();
    config.browser = test_browser();
    config.workers = 1;
    config.outputs = OutputPaths::under(artifacts.path());
    (config, artifacts)
}

/// Open a fixture, or `None` when no WebDriver can be started
pub async fn open_fixture(config: &RunConfig, title: &str) -> Option<Fixture> {
    let _lock = WEBDRIVER_LOCK.lock().await;

    for attempt in 1..=3 {
        match Fixture::open_with_sink(config, "integration", title, LogSink::Console).await {
            Ok(fixture) => return Some(fixture),
            Err(e) => {
                eprintln!("Session attempt {} for '{}' failed: {:#}", attempt, title, e);
                tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            }
        }
    }
    eprintln!("Skipping '{}' - WebDriver not available", title);
    None
}
