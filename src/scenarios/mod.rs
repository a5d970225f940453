//! End-to-end scenarios grouped by suite.
//!
//! Every scenario receives a fresh [`Fixture`] and starts from the discover
//! page at the base URL. A scenario fails by returning an error; use
//! [`Fixture::expect`] for assertions and [`Fixture::skip`] to bail out when
//! the page lacks the feature under test.

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

use crate::fixture::Fixture;

pub mod filters;
pub mod navigation;
pub mod pagination;
pub mod search;

pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

pub type ScenarioFn = for<'a> fn(&'a Fixture) -> ScenarioFuture<'a>;

/// A named, runnable test
#[derive(Clone, Copy)]
pub struct Scenario {
    pub suite: &'static str,
    pub title: &'static str,
    pub run: ScenarioFn,
}

impl Scenario {
    pub const fn new(suite: &'static str, title: &'static str, run: ScenarioFn) -> Self {
        Scenario { suite, title, run }
    }

    /// `suite › title`, used for grep matching and reports
    pub fn full_title(&self) -> String {
        format!("{} › {}", self.suite_display(), self.title)
    }

    pub fn suite_display(&self) -> String {
        format!("Discover - {}", capitalize(self.suite))
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("suite", &self.suite)
            .field("title", &self.title)
            .finish()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub const SUITES: &[&str] = &["navigation", "search", "filters", "pagination"];

/// Every registered scenario in suite order
pub fn all() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(navigation::scenarios());
    scenarios.extend(search::scenarios());
    scenarios.extend(filters::scenarios());
    scenarios.extend(pagination::scenarios());
    scenarios
}

/// Scenarios in any of `suites` (all when empty) whose full title contains
/// `grep`, case-insensitively
pub fn select(scenarios: Vec<Scenario>, suites: &[String], grep: Option<&str>) -> Vec<Scenario> {
    let grep = grep.map(str::to_lowercase);
    scenarios
        .into_iter()
        .filter(|s| suites.is_empty() || suites.iter().any(|suite| suite == s.suite))
        .filter(|s| {
            grep.as_ref()
                .is_none_or(|g| s.full_title().to_lowercase().contains(g))
        })
        .collect()
}

/// Shared setup: open the discover page and wait for content
pub(crate) async fn open_discover(fx: &Fixture) -> Result<()> {
    fx.logger()
        .step("Open the discover page", Some("content has loaded"));
    fx.logger().browser_api("page.goto", Some("/"));
    fx.discover_page().goto("/").await
}

#[cfg(test)]
#[path = "../scenarios_test.rs"]
mod scenarios_test;
