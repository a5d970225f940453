//! # discover-e2e
#![allow(clippy::uninlined_format_args)]
//!
//! End-to-end UI tests for a movie discovery single-page application,
//! driven over WebDriver.
//!
//! The suite is built from page objects: [`pages::DiscoverPage`] exposes
//! one method per user-visible action or query, [`pages::FilterComponent`]
//! and [`pages::MovieCard`] cover the filter panel and a single result card.
//! Elements are described by [`Locator`]s, which are resolved inside the
//! page on every interaction rather than cached.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Run every scenario against the default deployment
//! discover-e2e run
//!
//! # Run one suite in a visible Firefox window
//! discover-e2e run --suite search --browser firefox --headed
//!
//! # Point at a local build and only write the JUnit report
//! discover-e2e run --base-url http://localhost:3000 --reporter junit
//!
//! # Filter by title
//! discover-e2e run --grep "movie cards"
//!
//! # Show the registered scenarios and the resolved configuration
//! discover-e2e list --suite pagination
//! discover-e2e env
//! ```
//!
//! `DISCOVER_BASE_URL` changes the target; `CI` turns on retries and fixes
//! the worker count at 2. Logging is controlled with `RUST_LOG`
//! (default `discover_e2e=info`).
//!
//! ## Library Usage
//!
//! ```no_run
//! use discover_e2e::{Fixture, RunConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RunConfig::from_env();
//! let fx = Fixture::open(&config, "search", "types into search").await?;
//!
//! let discover = fx.discover_page();
//! discover.goto("/").await?;
//! discover.search("Batman").await?;
//! fx.expect("search holds the query", discover.get_search_value().await? == "Batman")?;
//! # Ok(())
//! # }
//! ```

/// Run configuration and target environment
pub mod config;

/// Error classification and exit codes
pub mod errors;

/// Per-test setup and teardown
pub mod fixture;

/// Lazily-resolved element descriptions
pub mod locator;

/// Human-facing test log
pub mod logger;

/// Browser page and bound locators
pub mod page;

/// Page objects for the discover application
pub mod pages;

/// Report writers
pub mod report;

/// Scenario execution
pub mod runner;

/// Test scenarios by suite
pub mod scenarios;

/// Shared value types
pub mod types;

/// WebDriver session control
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use config::{Environment, RunConfig, environment};
pub use errors::DiscoverError;
pub use fixture::Fixture;
pub use locator::Locator;
pub use logger::{LogSink, TestLogger};
pub use page::{Page, PageLocator};
pub use pages::{DiscoverPage, FilterComponent, MovieCard};
pub use runner::{RunSummary, Runner, TestRecord};
pub use types::{ContentType, Section, TestStatus, ViewportSize, YearRange};
pub use webdriver::{Browser, BrowserType, LaunchOptions};
