//! Scenario execution with bounded concurrency.
//!
//! Each attempt opens its own [`Fixture`], so retries start from a clean
//! browser session. Scenarios run as tokio tasks gated by a semaphore sized
//! by the effective worker count.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::RunConfig;
use crate::errors::DiscoverError;
use crate::fixture::Fixture;
use crate::logger::LogSink;
use crate::scenarios::Scenario;
use crate::types::TestStatus;

/// Outcome of one scenario after retries
#[derive(Debug, Clone, Serialize)]
pub struct TestRecord {
    pub suite: String,
    pub title: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    /// Attempts beyond the first
    pub retries: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub attachments: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub timed_out: usize,
}

impl StatusCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a TestRecord>) -> Self {
        let mut counts = StatusCounts::default();
        for record in records {
            match record.status {
                TestStatus::Passed => counts.passed += 1,
                TestStatus::Failed => counts.failed += 1,
                TestStatus::Skipped => counts.skipped += 1,
                TestStatus::TimedOut => counts.timed_out += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.timed_out
    }
}

/// Everything the reporters need about a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub base_url: String,
    pub browser: String,
    pub counts: StatusCounts,
    pub records: Vec<TestRecord>,
}

impl RunSummary {
    pub fn new(
        started_at: DateTime<Utc>,
        duration: Duration,
        config: &RunConfig,
        records: Vec<TestRecord>,
    ) -> Self {
        RunSummary {
            run_id: Uuid::new_v4(),
            started_at,
            duration_ms: duration.as_millis() as u64,
            base_url: config.environment.base_url.clone(),
            browser: config.browser.driver_name().to_string(),
            counts: StatusCounts::tally(&records),
            records,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.records.iter().any(|r| r.status.is_failure())
    }

    /// 0 when nothing failed, else the code of the first failure
    pub fn exit_code(&self) -> i32 {
        self.records
            .iter()
            .find(|r| r.status.is_failure())
            .map(|r| r.exit_code.unwrap_or(1))
            .unwrap_or(0)
    }
}

/// Status and error for one attempt. `None` means the test timeout fired.
pub fn classify(outcome: Option<Result<()>>, timeout: Duration) -> (TestStatus, Option<DiscoverError>) {
    match outcome {
        Some(Ok(())) => (TestStatus::Passed, None),
        Some(Err(e)) => {
            let err = DiscoverError::from(e);
            if err.is_skip() {
                (TestStatus::Skipped, Some(err))
            } else {
                (TestStatus::Failed, Some(err))
            }
        }
        None => (
            TestStatus::TimedOut,
            Some(DiscoverError::Timeout(format!(
                "Test timeout of {}ms exceeded",
                timeout.as_millis()
            ))),
        ),
    }
}

struct Attempt {
    status: TestStatus,
    error: Option<DiscoverError>,
    attachments: Vec<PathBuf>,
}

pub struct Runner {
    config: Arc<RunConfig>,
    sink: LogSink,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Runner {
            config: Arc::new(config),
            sink: LogSink::Console,
        }
    }

    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run `scenarios` and return records in registration order
    pub async fn run(&self, scenarios: Vec<Scenario>) -> RunSummary {
        let started_at = Utc::now();
        let clock = Instant::now();
        let workers = self.config.effective_workers();
        info!(
            "Running {} tests with {} worker(s) against {}",
            scenarios.len(),
            workers,
            self.config.environment.base_url
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut set = JoinSet::new();

        for (index, scenario) in scenarios.into_iter().enumerate() {
            let config = self.config.clone();
            let sink = self.sink.clone();
            let semaphore = semaphore.clone();
            set.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                let started = Instant::now();
                // Own task so a panicking scenario still yields a record
                let worker =
                    tokio::spawn(async move { run_scenario(&config, scenario, sink).await });
                (index, settle(scenario, worker.await, started.elapsed()))
            });
        }

        let mut records = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(entry) => records.push(entry),
                Err(e) => error!("Test task panicked: {}", e),
            }
        }
        records.sort_by_key(|(index, _)| *index);
        let records: Vec<TestRecord> = records.into_iter().map(|(_, r)| r).collect();

        let summary = RunSummary::new(started_at, clock.elapsed(), &self.config, records);
        info!(
            "Finished: {} passed, {} failed, {} skipped, {} timed out",
            summary.counts.passed,
            summary.counts.failed,
            summary.counts.skipped,
            summary.counts.timed_out
        );
        summary
    }
}

/// The record of a finished scenario task; a panic becomes a failure
pub fn settle(
    scenario: Scenario,
    joined: std::result::Result<TestRecord, JoinError>,
    elapsed: Duration,
) -> TestRecord {
    let err = match joined {
        Ok(record) => return record,
        Err(err) => err,
    };
    let message = if err.is_panic() {
        let payload = err.into_panic();
        let text = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        format!("Test panicked: {}", text)
    } else {
        "Test task was cancelled".to_string()
    };
    error!("'{}' did not complete: {}", scenario.full_title(), message);

    TestRecord {
        suite: scenario.suite.to_string(),
        title: scenario.title.to_string(),
        status: TestStatus::Failed,
        duration_ms: elapsed.as_millis() as u64,
        retries: 0,
        error: Some(message),
        exit_code: Some(1),
        attachments: Vec::new(),
    }
}

/// One scenario including retries
pub async fn run_scenario(config: &RunConfig, scenario: Scenario, sink: LogSink) -> TestRecord {
    let started = Instant::now();
    let mut attempt_no = 0;

    let last = loop {
        let attempt = run_attempt(config, scenario, sink.clone()).await;
        let done = !attempt.status.is_failure() || attempt_no >= config.retries;
        if done {
            break attempt;
        }
        attempt_no += 1;
        warn!(
            "Retrying '{}' ({}/{})",
            scenario.full_title(),
            attempt_no,
            config.retries
        );
    };

    TestRecord {
        suite: scenario.suite.to_string(),
        title: scenario.title.to_string(),
        status: last.status,
        duration_ms: started.elapsed().as_millis() as u64,
        retries: attempt_no,
        exit_code: last
            .error
            .as_ref()
            .filter(|e| !e.is_skip())
            .map(DiscoverError::exit_code),
        error: last.error.map(|e| format!("{:#}", e)),
        attachments: last.attachments,
    }
}

async fn run_attempt(config: &RunConfig, scenario: Scenario, sink: LogSink) -> Attempt {
    let started = Instant::now();
    let title = scenario.title;

    let fixture = match Fixture::open_with_sink(config, scenario.suite, title, sink).await {
        Ok(fixture) => fixture,
        Err(e) => {
            error!("Could not open a session for '{}': {:#}", title, e);
            let (status, error) = classify(Some(Err(e)), config.timeouts.test);
            return Attempt {
                status,
                error,
                attachments: Vec::new(),
            };
        }
    };

    fixture
        .logger()
        .divider(Some(&scenario.suite_display()));

    let outcome = tokio::time::timeout(config.timeouts.test, (scenario.run)(&fixture))
        .await
        .ok();
    let (status, error) = classify(outcome, config.timeouts.test);

    if let Some(err) = &error {
        if err.is_skip() {
            debug!("'{}' skipped: {}", title, err);
        } else {
            fixture.logger().error(&err.to_string());
        }
    }

    let attachments = fixture.finish(status, started.elapsed()).await;
    Attempt {
        status,
        error,
        attachments,
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
