//! Run reporters: console list, JSON, JUnit XML and a static HTML page.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{OutputPaths, ReporterKind};
use crate::runner::{RunSummary, TestRecord};
use crate::types::TestStatus;

fn status_mark(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "✓",
        TestStatus::Failed | TestStatus::TimedOut => "✘",
        TestStatus::Skipped => "-",
    }
}

/// One line per test followed by a totals line
pub fn render_list(summary: &RunSummary) -> String {
    let mut out = String::new();
    for (i, record) in summary.records.iter().enumerate() {
        let retry = if record.retries > 0 {
            format!(" (retry #{})", record.retries)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "  {} {:>3} [{}] › {}{} ({}ms)",
            status_mark(record.status),
            i + 1,
            record.suite,
            record.title,
            retry,
            record.duration_ms
        );
        if let Some(error) = &record.error
            && record.status.is_failure()
        {
            let _ = writeln!(out, "        {}", error);
        }
        for attachment in &record.attachments {
            let _ = writeln!(out, "        attachment: {}", attachment.display());
        }
    }

    let counts = &summary.counts;
    let _ = writeln!(
        out,
        "\n  {} passed, {} failed, {} skipped, {} timed out ({}ms)",
        counts.passed, counts.failed, counts.skipped, counts.timed_out, summary.duration_ms
    );
    out
}

pub fn render_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("Failed to serialize run summary")
}

/// Escape text for XML and HTML bodies and attribute values
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn seconds(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// JUnit XML with one `<testsuite>` per suite, in first-seen order
pub fn render_junit(summary: &RunSummary) -> String {
    let mut suites: Vec<(&str, Vec<&TestRecord>)> = Vec::new();
    for record in &summary.records {
        match suites.iter_mut().find(|(name, _)| *name == record.suite) {
            Some((_, records)) => records.push(record),
            None => suites.push((record.suite.as_str(), vec![record])),
        }
    }

    let counts = &summary.counts;
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<testsuites id=\"{}\" name=\"discover-e2e\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" errors=\"0\" time=\"{}\">",
        summary.run_id,
        counts.total(),
        counts.failed + counts.timed_out,
        counts.skipped,
        seconds(summary.duration_ms)
    );

    for (suite, records) in suites {
        let failures = records.iter().filter(|r| r.status.is_failure()).count();
        let skipped = records
            .iter()
            .filter(|r| r.status == TestStatus::Skipped)
            .count();
        let time: u64 = records.iter().map(|r| r.duration_ms).sum();
        let _ = writeln!(
            out,
            "  <testsuite name=\"{}\" timestamp=\"{}\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" errors=\"0\" time=\"{}\">",
            escape_markup(suite),
            summary.started_at.to_rfc3339(),
            records.len(),
            failures,
            skipped,
            seconds(time)
        );
        for record in records {
            let _ = write!(
                out,
                "    <testcase name=\"{}\" classname=\"{}\" time=\"{}\"",
                escape_markup(&record.title),
                escape_markup(suite),
                seconds(record.duration_ms)
            );
            let message = escape_markup(record.error.as_deref().unwrap_or_default());
            match record.status {
                TestStatus::Passed => out.push_str(">\n"),
                TestStatus::Skipped => {
                    let _ = writeln!(out, ">\n      <skipped message=\"{}\"/>", message);
                }
                TestStatus::Failed | TestStatus::TimedOut => {
                    let _ = writeln!(
                        out,
                        ">\n      <failure message=\"{}\" type=\"{}\">{}</failure>",
                        message, record.status, message
                    );
                }
            }
            if !record.attachments.is_empty() {
                out.push_str("      <system-out>\n");
                for attachment in &record.attachments {
                    let _ = writeln!(
                        out,
                        "[[ATTACHMENT|{}]]",
                        escape_markup(&attachment.display().to_string())
                    );
                }
                out.push_str("      </system-out>\n");
            }
            out.push_str("    </testcase>\n");
        }
        out.push_str("  </testsuite>\n");
    }
    out.push_str("</testsuites>\n");
    out
}

/// Self-contained HTML table of results
pub fn render_html(summary: &RunSummary) -> String {
    let counts = &summary.counts;
    let mut rows = String::new();
    for record in &summary.records {
        let attachments: Vec<String> = record
            .attachments
            .iter()
            .map(|a| {
                let path = escape_markup(&a.display().to_string());
                format!("<a href=\"{}\">{}</a>", path, path)
            })
            .collect();
        let _ = writeln!(
            rows,
            "<tr class=\"{status}\"><td>{suite}</td><td>{title}</td><td>{status}</td><td>{ms}</td><td>{retries}</td><td>{error}</td><td>{attachments}</td></tr>",
            status = record.status,
            suite = escape_markup(&record.suite),
            title = escape_markup(&record.title),
            ms = record.duration_ms,
            retries = record.retries,
            error = escape_markup(record.error.as_deref().unwrap_or_default()),
            attachments = attachments.join("<br>"),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Discover E2E report</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border: 1px solid #ccc; padding: 4px 8px; text-align: left; vertical-align: top; }}
tr.passed td:nth-child(3) {{ color: #1a7f37; }}
tr.failed td:nth-child(3), tr.timedOut td:nth-child(3) {{ color: #cf222e; }}
tr.skipped td:nth-child(3) {{ color: #9a6700; }}
</style>
</head>
<body>
<h1>Discover E2E report</h1>
<p>Run {run_id} against {base_url} ({browser}), started {started}, {duration}ms</p>
<p>{passed} passed, {failed} failed, {skipped} skipped, {timed_out} timed out</p>
<table>
<tr><th>Suite</th><th>Test</th><th>Status</th><th>ms</th><th>Retries</th><th>Error</th><th>Attachments</th></tr>
{rows}</table>
</body>
</html>
"#,
        run_id = summary.run_id,
        base_url = escape_markup(&summary.base_url),
        browser = escape_markup(&summary.browser),
        started = summary.started_at.to_rfc3339(),
        duration = summary.duration_ms,
        passed = counts.passed,
        failed = counts.failed,
        skipped = counts.skipped,
        timed_out = counts.timed_out,
        rows = rows,
    )
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Emit every requested report; returns the files written
pub fn write_reports(
    summary: &RunSummary,
    reporters: &[ReporterKind],
    outputs: &OutputPaths,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for reporter in reporters {
        let (path, contents) = match reporter {
            ReporterKind::List => {
                print!("{}", render_list(summary));
                continue;
            }
            ReporterKind::Json => (&outputs.json_report, render_json(summary)?),
            ReporterKind::Junit => (&outputs.junit_report, render_junit(summary)),
            ReporterKind::Html => (&outputs.html_report, render_html(summary)),
        };
        write_file(path, &contents)?;
        info!("Wrote {:?} report to {}", reporter, path.display());
        written.push(path.clone());
    }
    Ok(written)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;
