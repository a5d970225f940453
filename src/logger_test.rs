// Unit tests for the test logger

use super::*;
use pretty_assertions::assert_eq;

fn captured() -> (TestLogger, Arc<Mutex<Vec<String>>>) {
    let (sink, lines) = LogSink::buffer();
    (TestLogger::with_sink(sink), lines)
}

fn lines(buffer: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    buffer.lock().unwrap().clone()
}

#[test]
fn test_format_without_test_name() {
    let line = format_line(LogLevel::Info, "2025-01-01T00:00:00.000Z", "", "hello");
    assert_eq!(line, "ℹ️  [INFO] 2025-01-01T00:00:00.000Z - hello");
}

#[test]
fn test_format_with_test_name() {
    let line = format_line(
        LogLevel::Step,
        "2025-01-01T00:00:00.000Z",
        "should load page",
        "Step 1: open",
    );
    assert_eq!(
        line,
        "👉 [STEP] 2025-01-01T00:00:00.000Z [should load page] - Step 1: open"
    );
}

#[test]
fn test_every_level_has_tag_and_emoji() {
    for level in [
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Success,
        LogLevel::Step,
    ] {
        let line = format_line(level, "ts", "", "m");
        assert!(line.starts_with(level.emoji()));
        assert!(line.contains(&format!("[{}]", level.tag())));
    }
}

#[test]
fn test_set_context_logs_start_and_resets_steps() {
    let (logger, buffer) = captured();
    logger.step("before any test", None);
    assert_eq!(logger.steps_taken(), 1);

    logger.set_test_context("search works");
    assert_eq!(logger.steps_taken(), 0);
    assert_eq!(logger.test_name(), "search works");

    let out = lines(&buffer);
    assert!(out[1].contains("[INFO]"));
    assert!(out[1].contains("[search works] - Starting test: search works"));
}

#[test]
fn test_steps_are_numbered_with_expectation() {
    let (sink, buffer) = LogSink::buffer();
    let logger = TestLogger::for_test("t", sink);
    logger.step("Fill search", Some("value is Batman"));
    logger.step("Clear search", None);

    let out = lines(&buffer);
    assert!(out[1].ends_with("[t] - Step 1: Fill search"));
    assert_eq!(out[2], "   ↳ Expected: value is Batman");
    assert!(out[3].ends_with("[t] - Step 2: Clear search"));
    assert_eq!(logger.steps_taken(), 2);
}

#[test]
fn test_clear_context_drops_prefix() {
    let (logger, buffer) = captured();
    logger.set_test_context("x");
    logger.clear_test_context();
    logger.info("after");

    let last = lines(&buffer).pop().unwrap();
    assert!(last.ends_with(" - after"));
    assert!(!last.contains("[x]"));
}

#[test]
fn test_assertion_lines() {
    let (logger, buffer) = captured();
    logger.assertion("has content", true);
    logger.assertion("card count > 0", false);

    let out = lines(&buffer);
    assert!(out[0].contains("[SUCCESS]"));
    assert!(out[0].ends_with("Assertion PASSED: has content"));
    assert!(out[1].contains("[ERROR]"));
    assert!(out[1].ends_with("Assertion FAILED: card count > 0"));
}

#[test]
fn test_result_lines() {
    let (logger, buffer) = captured();
    logger.test_result("a", TestStatus::Passed, Some(120));
    logger.test_result("b", TestStatus::Failed, None);
    logger.test_result("c", TestStatus::Skipped, Some(5));
    logger.test_result("d", TestStatus::TimedOut, Some(30_000));

    let out = lines(&buffer);
    assert!(out[0].ends_with("Test PASSED: a (120ms)"));
    assert!(out[1].ends_with("Test FAILED: b"));
    assert!(out[2].contains("[WARN]"));
    assert!(out[2].ends_with("Test SKIPPED: c"));
    assert!(out[3].ends_with("Test FAILED: d (30000ms)"));
}

#[test]
fn test_browser_api_and_divider() {
    let (logger, buffer) = captured();
    logger.browser_api("page.goto", Some("/"));
    logger.browser_api("page.reload", None);
    logger.divider(Some("Search"));
    logger.divider(None);

    let out = lines(&buffer);
    assert!(out[0].ends_with("Browser API: page.goto with /"));
    assert!(out[1].ends_with("Browser API: page.reload"));
    assert_eq!(out[2], format!("\n{} Search {}\n", "═".repeat(20), "═".repeat(20)));
    assert_eq!(out[3].chars().count(), 50);
}

#[test]
fn test_loggers_do_not_share_context() {
    let (sink, buffer) = LogSink::buffer();
    let a = TestLogger::for_test("first", sink.clone());
    let b = TestLogger::for_test("second", sink);
    a.step("a1", None);
    b.step("b1", None);
    a.step("a2", None);

    assert_eq!(a.steps_taken(), 2);
    assert_eq!(b.steps_taken(), 1);
    let out = lines(&buffer);
    assert!(out.iter().any(|l| l.ends_with("[first] - Step 2: a2")));
    assert!(out.iter().any(|l| l.ends_with("[second] - Step 1: b1")));
}

#[test]
fn test_streams_follow_call_site() {
    let (sink, stdout, stderr) = LogSink::split();
    let logger = TestLogger::with_sink(sink);

    logger.assertion("rating shown", false);
    logger.test_result("should filter", TestStatus::Failed, Some(80));
    logger.test_result("should skip", TestStatus::Skipped, None);
    logger.info("plain info");
    logger.warn("careful");
    logger.error("broken");

    let stdout = stdout.lock().unwrap();
    let stderr = stderr.lock().unwrap();
    assert_eq!(stdout.len(), 4);
    assert!(stdout[0].contains("[ERROR]") && stdout[0].contains("Assertion FAILED: rating shown"));
    assert!(stdout[1].contains("Test FAILED: should filter (80ms)"));
    assert!(stdout[2].contains("[WARN]") && stdout[2].contains("Test SKIPPED: should skip"));
    assert_eq!(stderr.len(), 2);
    assert!(stderr[0].ends_with("- careful"));
    assert!(stderr[1].ends_with("- broken"));
}
