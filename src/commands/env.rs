use anyhow::Result;

use discover_e2e::config::RunConfig;

/// Print the resolved run configuration as JSON
pub async fn handle_env() -> Result<()> {
    let config = RunConfig::from_env();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
