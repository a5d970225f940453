#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use discover_e2e::errors::DiscoverError;
use discover_e2e::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

mod commands;

use crate::commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "discover-e2e")]
#[command(about = "End-to-end tests for the movie discovery app", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run test scenarios
    Run(RunArgs),

    /// List test scenarios without running them
    List {
        /// Only list these suites
        #[arg(short, long = "suite")]
        suites: Vec<String>,

        /// Only list tests whose title contains this text
        #[arg(short, long)]
        grep: Option<String>,
    },

    /// Print the resolved run configuration
    Env,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let discover_err: DiscoverError = err.into();

            let error_json = json!({
                "error": true,
                "message": discover_err.to_string(),
                "exit_code": discover_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            eprintln!("Error: {}", discover_err);
            std::process::exit(discover_err.exit_code().max(1));
        }
    }
}

async fn run() -> Result<i32> {
    // Logs go to stderr so the list reporter owns stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "discover_e2e=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::handle_run(args).await,
        Commands::List { suites, grep } => {
            commands::list::handle_list(suites, grep).await?;
            Ok(0)
        }
        Commands::Env => {
            commands::env::handle_env().await?;
            Ok(0)
        }
    }
}
