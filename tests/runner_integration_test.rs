// Runner and reporting against the local discover fixture

mod test_utils;

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::time::Duration;
use test_server::ensure_test_server;
use test_utils::{open_fixture, test_config};

use discover_e2e::config::ReporterKind;
use discover_e2e::logger::LogSink;
use discover_e2e::report::write_reports;
use discover_e2e::scenarios::{self, Scenario, ScenarioFuture};
use discover_e2e::{Fixture, Runner, TestStatus};

fn always_fails(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        fx.discover_page().goto("/").await?;
        fx.expect("the impossible happens", false)
    })
}

fn skips(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move { fx.skip("feature not rendered") })
}

fn sleeps(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        fx.page().wait_for_timeout(30_000).await;
        Ok(())
    })
}

fn panics(fx: &Fixture) -> ScenarioFuture<'_> {
    Box::pin(async move {
        fx.discover_page().goto("/").await?;
        let titles: Vec<String> = Vec::new();
        let _ = &titles[3];
        Ok(())
    })
}

/// Whether a session can be opened at all in this environment
async fn browser_available(config: &discover_e2e::RunConfig) -> bool {
    match open_fixture(config, "probe").await {
        Some(fx) => {
            fx.finish(TestStatus::Passed, Duration::ZERO).await;
            true
        }
        None => false,
    }
}

#[tokio::test]
#[serial]
async fn test_navigation_suite_passes() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    if !browser_available(&config).await {
        return;
    }

    let selected = scenarios::select(scenarios::all(), &["navigation".to_string()], None);
    let expected = selected.len();
    let summary = Runner::new(config).run(selected).await;

    assert_eq!(summary.records.len(), expected);
    for record in &summary.records {
        assert_eq!(record.status, TestStatus::Passed, "{:?}", record.error);
        assert!(record.attachments.is_empty());
    }
    assert!(!summary.has_failures());
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
#[serial]
async fn test_failure_records_screenshot_and_reports() {
    let server = ensure_test_server().await;
    let (config, artifacts) = test_config(&server.base_url);
    if !browser_available(&config).await {
        return;
    }
    let outputs = config.outputs.clone();

    let (sink, lines) = LogSink::buffer();
    let summary = Runner::new(config)
        .with_sink(sink)
        .run(vec![
            Scenario::new("custom", "should fail on purpose", always_fails),
            Scenario::new("custom", "should skip on purpose", skips),
        ])
        .await;

    let failed = &summary.records[0];
    assert_eq!(failed.status, TestStatus::Failed);
    assert_eq!(failed.exit_code, Some(3));
    assert!(failed.error.as_deref().unwrap().contains("the impossible happens"));
    assert_eq!(failed.attachments.len(), 1);
    assert!(failed.attachments[0].exists());
    assert!(failed.attachments[0].starts_with(artifacts.path()));

    let skipped = &summary.records[1];
    assert_eq!(skipped.status, TestStatus::Skipped);
    assert_eq!(skipped.exit_code, None);

    assert!(summary.has_failures());
    assert_eq!(summary.exit_code(), 3);

    {
        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("Screenshot saved:")));
        assert!(lines.iter().any(|l| l.contains("[should fail on purpose]")));
    }

    let written = write_reports(
        &summary,
        &[ReporterKind::Json, ReporterKind::Junit, ReporterKind::Html],
        &outputs,
    )
    .unwrap();
    assert_eq!(written.len(), 3);
    let junit = std::fs::read_to_string(&outputs.junit_report).unwrap();
    assert!(junit.contains("<failure"));
    assert!(junit.contains("<skipped"));
    assert!(junit.contains("[[ATTACHMENT|"));
}

#[tokio::test]
#[serial]
async fn test_test_timeout_is_reported() {
    let server = ensure_test_server().await;
    let (mut config, _artifacts) = test_config(&server.base_url);
    if !browser_available(&config).await {
        return;
    }
    config.timeouts.test = Duration::from_millis(500);

    let summary = Runner::new(config)
        .run(vec![Scenario::new("custom", "should run out of time", sleeps)])
        .await;

    let record = &summary.records[0];
    assert_eq!(record.status, TestStatus::TimedOut);
    assert!(record.error.as_deref().unwrap().contains("500"));
    assert_eq!(summary.counts.timed_out, 1);
}

#[tokio::test]
#[serial]
async fn test_retries_rerun_failures() {
    let server = ensure_test_server().await;
    let (mut config, _artifacts) = test_config(&server.base_url);
    if !browser_available(&config).await {
        return;
    }
    config.retries = 1;

    let summary = Runner::new(config)
        .run(vec![Scenario::new("custom", "should fail twice", always_fails)])
        .await;

    let record = &summary.records[0];
    assert_eq!(record.status, TestStatus::Failed);
    assert_eq!(record.retries, 1);
}

#[tokio::test]
#[serial]
async fn test_panicking_scenario_is_recorded_as_failure() {
    let server = ensure_test_server().await;
    let (config, _artifacts) = test_config(&server.base_url);
    if !browser_available(&config).await {
        return;
    }

    let selected = vec![
        Scenario::new("custom", "should panic", panics),
        Scenario::new("custom", "should skip on purpose", skips),
    ];
    let expected = selected.len();
    let summary = Runner::new(config).run(selected).await;

    assert_eq!(summary.records.len(), expected);
    let panicked = &summary.records[0];
    assert_eq!(panicked.title, "should panic");
    assert_eq!(panicked.status, TestStatus::Failed);
    assert!(panicked.error.as_deref().unwrap().contains("index out of bounds"));
    assert_eq!(summary.exit_code(), 1);
}
