//! Per-test setup and teardown.
//!
//! A [`Fixture`] gives one scenario a fresh browser session, the page
//! objects bound to it, and its own [`TestLogger`]. Finishing the fixture
//! records the outcome, captures a full-page screenshot when the test did
//! not pass, and ends the session.

use anyhow::Result;
use chrono::Utc;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::errors::DiscoverError;
use crate::logger::{LogSink, TestLogger};
use crate::page::Page;
use crate::pages::{DiscoverPage, FilterComponent};
use crate::types::TestStatus;
use crate::webdriver::{Browser, LaunchOptions};

const EXPECT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Name of the failure screenshot for `title` taken at `millis`
pub fn screenshot_file_name(title: &str, millis: i64) -> String {
    let slug = title.split_whitespace().collect::<Vec<_>>().join("-");
    format!("failure-{}-{}.png", slug, millis)
}

pub struct Fixture {
    suite: String,
    title: String,
    page: Page,
    logger: TestLogger,
    screenshots: PathBuf,
}

impl Fixture {
    /// Start a session for one test, logging to the console
    pub async fn open(config: &RunConfig, suite: &str, title: &str) -> Result<Self> {
        Self::open_with_sink(config, suite, title, LogSink::Console).await
    }

    pub async fn open_with_sink(
        config: &RunConfig,
        suite: &str,
        title: &str,
        sink: LogSink,
    ) -> Result<Self> {
        let base_url = config.base_url()?;
        let browser = Browser::launch(&LaunchOptions {
            browser_type: config.browser,
            viewport: config.viewport,
            headless: config.headless,
        })
        .await?;

        let logger = TestLogger::for_test(title, sink);
        logger.browser_api(
            "browser.new_session",
            Some(&format!("{} {}", config.browser.driver_name(), config.viewport)),
        );

        Ok(Fixture {
            suite: suite.to_string(),
            title: title.to_string(),
            page: Page::new(browser, base_url, config.timeouts),
            logger,
            screenshots: config.outputs.screenshots.clone(),
        })
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn logger(&self) -> &TestLogger {
        &self.logger
    }

    pub fn discover_page(&self) -> DiscoverPage<'_> {
        DiscoverPage::new(&self.page)
    }

    pub fn filter_component(&self) -> FilterComponent<'_> {
        FilterComponent::new(&self.page)
    }

    /// Log the assertion and fail the test when it does not hold
    pub fn expect(&self, description: &str, passed: bool) -> Result<()> {
        self.logger.assertion(description, passed);
        if passed {
            Ok(())
        } else {
            Err(DiscoverError::AssertionFailed(description.to_string()).into())
        }
    }

    /// Poll `probe` until it holds or the expect timeout runs out
    pub async fn expect_eventually<F, Fut>(&self, description: &str, mut probe: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let timeout = self.page.timeouts().expect;
        let started = Instant::now();
        loop {
            if probe().await {
                return self.expect(description, true);
            }
            if started.elapsed() >= timeout {
                return self.expect(description, false);
            }
            tokio::time::sleep(EXPECT_POLL_INTERVAL).await;
        }
    }

    /// Stop the test here and report it as skipped
    pub fn skip(&self, reason: &str) -> Result<()> {
        self.logger.warn(&format!("Skipping: {}", reason));
        Err(DiscoverError::Skipped(reason.to_string()).into())
    }

    /// Record the outcome and end the session. Returns attachment paths.
    pub async fn finish(self, status: TestStatus, duration: Duration) -> Vec<PathBuf> {
        let mut attachments = Vec::new();

        if status != TestStatus::Passed {
            let path = self.screenshots.join(screenshot_file_name(
                &self.title,
                Utc::now().timestamp_millis(),
            ));
            match self.capture(&path).await {
                Ok(()) => {
                    self.logger
                        .info(&format!("Screenshot saved: {}", path.display()));
                    attachments.push(path);
                }
                Err(e) => {
                    warn!("Failure screenshot for '{}' failed: {:#}", self.title, e);
                    self.logger.warn(&format!("Screenshot failed: {:#}", e));
                }
            }
        }

        self.logger
            .test_result(&self.title, status, Some(duration.as_millis() as u64));
        self.logger.clear_test_context();

        if let Err(e) = self.page.close().await {
            debug!("Closing session failed: {:#}", e);
        }

        attachments
    }

    async fn capture(&self, path: &Path) -> Result<()> {
        self.logger
            .browser_api("page.screenshot", Some(&path.display().to_string()));
        self.page.screenshot(path, true).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fixture_test.rs"]
mod fixture_test;
