//! Target environment and run configuration

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::types::ViewportSize;
use crate::webdriver::BrowserType;

/// Default target application
pub const DEFAULT_BASE_URL: &str = "https://tmdb-discover.surge.sh";

/// Environment variable overriding the base URL
pub const BASE_URL_VAR: &str = "DISCOVER_BASE_URL";

/// A named deployment of the application under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub name: String,
    pub base_url: String,
}

/// Resolve the environment under test
pub fn environment() -> Environment {
    environment_from(|key| std::env::var(key).ok())
}

/// Same as [`environment`] with an injectable variable lookup
pub fn environment_from(lookup: impl Fn(&str) -> Option<String>) -> Environment {
    let base_url = lookup(BASE_URL_VAR)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Environment {
        name: "tmdb".to_string(),
        base_url,
    }
}

/// Per-run timeouts
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Timeouts {
    /// Whole-test budget
    #[serde(with = "millis")]
    pub test: Duration,
    /// Budget for polled expectations
    #[serde(with = "millis")]
    pub expect: Duration,
    /// Budget for a single click/fill/read to find its element
    #[serde(with = "millis")]
    pub action: Duration,
    /// Budget for navigation and load-state waits
    #[serde(with = "millis")]
    pub navigation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            test: Duration::from_millis(30_000),
            expect: Duration::from_millis(10_000),
            action: Duration::from_millis(10_000),
            navigation: Duration::from_millis(30_000),
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

/// Enabled report emitters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    /// One console line per test
    List,
    /// Self-contained HTML table
    Html,
    /// Machine-readable run summary
    Json,
    /// JUnit-style XML for CI
    Junit,
}

/// Output locations for report artifacts
#[derive(Debug, Clone, Serialize)]
pub struct OutputPaths {
    pub html_report: PathBuf,
    pub json_report: PathBuf,
    pub junit_report: PathBuf,
    pub screenshots: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        OutputPaths {
            html_report: PathBuf::from("discover-report/index.html"),
            json_report: PathBuf::from("test-results/results.json"),
            junit_report: PathBuf::from("test-results/junit.xml"),
            screenshots: PathBuf::from("screenshots"),
        }
    }
}

impl OutputPaths {
    /// Relocate every artifact under `root`
    pub fn under(root: &std::path::Path) -> Self {
        let defaults = OutputPaths::default();
        OutputPaths {
            html_report: root.join(defaults.html_report),
            json_report: root.join(defaults.json_report),
            junit_report: root.join(defaults.junit_report),
            screenshots: root.join(defaults.screenshots),
        }
    }
}

/// Everything a run needs to know
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub environment: Environment,
    pub ci: bool,
    pub timeouts: Timeouts,
    pub retries: u32,
    pub workers: usize,
    pub browser: BrowserType,
    pub headless: bool,
    pub viewport: ViewportSize,
    pub reporters: Vec<ReporterKind>,
    pub outputs: OutputPaths,
}

impl RunConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ci = lookup("CI").is_some_and(|v| !v.is_empty() && v != "0" && v != "false");
        let environment = environment_from(&lookup);

        RunConfig {
            environment,
            ci,
            timeouts: Timeouts::default(),
            retries: if ci { 2 } else { 0 },
            workers: if ci { 2 } else { default_workers() },
            browser: BrowserType::Chrome,
            headless: true,
            viewport: ViewportSize::default(),
            reporters: vec![
                ReporterKind::List,
                ReporterKind::Html,
                ReporterKind::Json,
                ReporterKind::Junit,
            ],
            outputs: OutputPaths::default(),
        }
    }

    /// Parsed base URL
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.environment.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.environment.base_url))
    }

    /// Worker count actually used for this browser
    pub fn effective_workers(&self) -> usize {
        match self.browser {
            // geckodriver serves a single session per process
            BrowserType::Firefox => 1,
            BrowserType::Chrome => self.workers.max(1),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| (n.get() / 2).max(1))
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
