use anyhow::Result;

use discover_e2e::scenarios;

use super::run::check_suites;

/// Print the registered tests, optionally limited to some suites
pub async fn handle_list(suites: Vec<String>, grep: Option<String>) -> Result<()> {
    check_suites(&suites)?;
    let selected = scenarios::select(scenarios::all(), &suites, grep.as_deref());
    for scenario in &selected {
        println!("  {}", scenario.full_title());
    }
    println!("Total: {} tests", selected.len());
    Ok(())
}
