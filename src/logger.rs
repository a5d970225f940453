//! Console logging for test steps, assertions and results.
//!
//! Each test owns a [`TestLogger`] carrying its name and step counter, so
//! concurrently running tests never share context. Lines look like
//!
//! ```text
//! 👉 [STEP] 2025-01-01T12:00:00.000Z [should display movie cards] - Step 1: Open the page
//! ```
//!
//! Internal diagnostics go through `tracing`; this module is the
//! human-facing report stream.

use chrono::{SecondsFormat, Utc};
use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::types::TestStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
    Warn,
    Error,
    Success,
    Step,
}

impl LogLevel {
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
            LogLevel::Step => "STEP",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            LogLevel::Info => "ℹ️ ",
            LogLevel::Debug => "🔍",
            LogLevel::Warn => "⚠️ ",
            LogLevel::Error => "❌",
            LogLevel::Success => "✅",
            LogLevel::Step => "👉",
        }
    }

    /// Default stream for plain level calls
    fn to_stderr(self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

/// Render one log line
pub fn format_line(level: LogLevel, timestamp: &str, test_name: &str, message: &str) -> String {
    let prefix = if test_name.is_empty() {
        String::new()
    } else {
        format!("[{}] ", test_name)
    };
    format!(
        "{} [{}] {} {}- {}",
        level.emoji(),
        level.tag(),
        timestamp,
        prefix,
        message
    )
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Where log lines end up
#[derive(Clone, Default)]
pub enum LogSink {
    /// stdout, with warnings and errors on stderr
    #[default]
    Console,
    /// Captured in memory
    Buffer(Arc<Mutex<Vec<String>>>),
    /// Captured in memory, one list per console stream
    Split {
        stdout: Arc<Mutex<Vec<String>>>,
        stderr: Arc<Mutex<Vec<String>>>,
    },
}

impl LogSink {
    pub fn buffer() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (LogSink::Buffer(lines.clone()), lines)
    }

    /// In-memory sink that keeps stdout and stderr lines apart
    #[allow(clippy::type_complexity)]
    pub fn split() -> (Self, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let stdout = Arc::new(Mutex::new(Vec::new()));
        let stderr = Arc::new(Mutex::new(Vec::new()));
        let sink = LogSink::Split {
            stdout: stdout.clone(),
            stderr: stderr.clone(),
        };
        (sink, stdout, stderr)
    }

    fn emit(&self, to_stderr: bool, line: &str) {
        match self {
            LogSink::Console => {
                // Write errors (closed pipe) are not worth failing a test over
                if to_stderr {
                    let _ = writeln!(std::io::stderr().lock(), "{}", line);
                } else {
                    let _ = writeln!(std::io::stdout().lock(), "{}", line);
                }
            }
            LogSink::Buffer(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line.to_string());
                }
            }
            LogSink::Split { stdout, stderr } => {
                let target = if to_stderr { stderr } else { stdout };
                if let Ok(mut lines) = target.lock() {
                    lines.push(line.to_string());
                }
            }
        }
    }
}

/// Logging context for a single test
pub struct TestLogger {
    test_name: Mutex<String>,
    step_counter: AtomicU32,
    sink: LogSink,
}

impl Default for TestLogger {
    fn default() -> Self {
        TestLogger::with_sink(LogSink::Console)
    }
}

impl TestLogger {
    /// Logger with no test context writing to the console
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: LogSink) -> Self {
        TestLogger {
            test_name: Mutex::new(String::new()),
            step_counter: AtomicU32::new(0),
            sink,
        }
    }

    /// Logger already scoped to `test_name`
    pub fn for_test(test_name: &str, sink: LogSink) -> Self {
        let logger = Self::with_sink(sink);
        logger.set_test_context(test_name);
        logger
    }

    pub fn test_name(&self) -> String {
        self.test_name
            .lock()
            .map(|name| name.clone())
            .unwrap_or_default()
    }

    pub fn steps_taken(&self) -> u32 {
        self.step_counter.load(Ordering::SeqCst)
    }

    /// Set the current test and restart step numbering
    pub fn set_test_context(&self, test_name: &str) {
        if let Ok(mut name) = self.test_name.lock() {
            *name = test_name.to_string();
        }
        self.step_counter.store(0, Ordering::SeqCst);
        self.info(&format!("Starting test: {}", test_name));
    }

    pub fn clear_test_context(&self) {
        if let Ok(mut name) = self.test_name.lock() {
            name.clear();
        }
        self.step_counter.store(0, Ordering::SeqCst);
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.log_to(level, level.to_stderr(), message);
    }

    fn log_to(&self, level: LogLevel, to_stderr: bool, message: &str) {
        let line = format_line(level, &now_iso(), &self.test_name(), message);
        self.sink.emit(to_stderr, &line);
    }

    /// Log a numbered step, with the expected outcome on a follow-up line
    pub fn step(&self, action: &str, expected: Option<&str>) {
        let n = self.step_counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.log(LogLevel::Step, &format!("Step {}: {}", n, action));
        if let Some(expected) = expected {
            self.sink
                .emit(false, &format!("   ↳ Expected: {}", expected));
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }

    /// Record a call into the browser
    pub fn browser_api(&self, api: &str, params: Option<&str>) {
        let params = params.map(|p| format!(" with {}", p)).unwrap_or_default();
        self.log(LogLevel::Debug, &format!("Browser API: {}{}", api, params));
    }

    /// Report an assertion outcome on stdout; does not itself fail anything
    pub fn assertion(&self, description: &str, passed: bool) {
        if passed {
            self.log_to(
                LogLevel::Success,
                false,
                &format!("Assertion PASSED: {}", description),
            );
        } else {
            self.log_to(
                LogLevel::Error,
                false,
                &format!("Assertion FAILED: {}", description),
            );
        }
    }

    /// Summary line for a finished test, always on stdout
    pub fn test_result(&self, test_name: &str, status: TestStatus, duration_ms: Option<u64>) {
        let duration = match duration_ms {
            Some(ms) if ms > 0 => format!(" ({}ms)", ms),
            _ => String::new(),
        };
        match status {
            TestStatus::Passed => {
                self.log_to(
                    LogLevel::Success,
                    false,
                    &format!("Test PASSED: {}{}", test_name, duration),
                );
            }
            TestStatus::Failed | TestStatus::TimedOut => {
                self.log_to(
                    LogLevel::Error,
                    false,
                    &format!("Test FAILED: {}{}", test_name, duration),
                );
            }
            TestStatus::Skipped => {
                self.log_to(
                    LogLevel::Warn,
                    false,
                    &format!("Test SKIPPED: {}", test_name),
                );
            }
        }
    }

    pub fn divider(&self, title: Option<&str>) {
        let line = match title {
            Some(title) => format!("\n{} {} {}\n", "═".repeat(20), title, "═".repeat(20)),
            None => "─".repeat(50),
        };
        self.sink.emit(false, &line);
    }
}

#[cfg(test)]
#[path = "logger_test.rs"]
mod logger_test;
