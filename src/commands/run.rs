use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use discover_e2e::config::{ReporterKind, RunConfig};
use discover_e2e::report::write_reports;
use discover_e2e::runner::Runner;
use discover_e2e::scenarios;
use discover_e2e::webdriver::BrowserType;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only run these suites (navigation, search, filters, pagination)
    #[arg(short, long = "suite")]
    pub suites: Vec<String>,

    /// Only run tests whose "suite › title" contains this text
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Target application URL (overrides DISCOVER_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Browser to use (chrome or firefox)
    #[arg(short, long)]
    pub browser: Option<String>,

    /// Run browser in visible mode
    #[arg(long)]
    pub headed: bool,

    /// Concurrent browser sessions
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Re-runs allowed for a failing test
    #[arg(long)]
    pub retries: Option<u32>,

    /// Reporters to enable; defaults to all
    #[arg(long = "reporter", value_enum)]
    pub reporters: Vec<ReporterKind>,

    /// Viewport size (WIDTHxHEIGHT)
    #[arg(long)]
    pub viewport: Option<String>,
}

/// Fold command-line overrides into the environment-derived config
pub fn apply_overrides(mut config: RunConfig, args: &RunArgs) -> Result<RunConfig> {
    if let Some(url) = &args.base_url {
        url::Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid --base-url '{}': {}", url, e))?;
        config.environment.base_url = url.clone();
    }
    if let Some(browser) = &args.browser {
        config.browser = browser.parse::<BrowserType>()?;
    }
    if args.headed {
        config.headless = false;
    }
    if let Some(workers) = args.workers {
        config.workers = workers.max(1);
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }
    if !args.reporters.is_empty() {
        config.reporters = args.reporters.clone();
    }
    if let Some(viewport) = &args.viewport {
        config.viewport = discover_e2e::types::ViewportSize::parse(viewport)?;
    }
    Ok(config)
}

pub fn check_suites(suites: &[String]) -> Result<()> {
    for suite in suites {
        if !scenarios::SUITES.contains(&suite.as_str()) {
            anyhow::bail!(
                "Unknown suite '{}'. Available: {}",
                suite,
                scenarios::SUITES.join(", ")
            );
        }
    }
    Ok(())
}

/// Run the selected scenarios, write reports, and return the exit code
pub async fn handle_run(args: RunArgs) -> Result<i32> {
    check_suites(&args.suites)?;
    let config = apply_overrides(RunConfig::from_env(), &args)?;

    let selected = scenarios::select(scenarios::all(), &args.suites, args.grep.as_deref());
    if selected.is_empty() {
        warn!("No tests matched the given filters");
        return Ok(0);
    }

    if config.browser == BrowserType::Firefox && config.workers > 1 {
        info!("geckodriver serves one session at a time; running with 1 worker");
    }

    let reporters = config.reporters.clone();
    let outputs = config.outputs.clone();
    let runner = Runner::new(config);
    let summary = runner.run(selected).await;

    write_reports(&summary, &reporters, &outputs)?;
    Ok(summary.exit_code())
}
