// Unit tests for environment and run configuration

use super::*;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_default_environment() {
    let env = environment_from(lookup_from(&[]));
    assert_eq!(env.name, "tmdb");
    assert_eq!(env.base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_base_url_override() {
    let env = environment_from(lookup_from(&[(BASE_URL_VAR, "http://127.0.0.1:3000")]));
    assert_eq!(env.base_url, "http://127.0.0.1:3000");

    // Blank values fall back to the default
    let env = environment_from(lookup_from(&[(BASE_URL_VAR, "  ")]));
    assert_eq!(env.base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_local_run_defaults() {
    let config = RunConfig::from_lookup(lookup_from(&[]));
    assert!(!config.ci);
    assert_eq!(config.retries, 0);
    assert!(config.workers >= 1);
    assert_eq!(config.timeouts.test, Duration::from_secs(30));
    assert_eq!(config.timeouts.expect, Duration::from_secs(10));
    assert_eq!(config.timeouts.action, Duration::from_secs(10));
    assert_eq!(config.timeouts.navigation, Duration::from_secs(30));
    assert_eq!(config.viewport, ViewportSize { width: 1280, height: 720 });
    assert_eq!(config.reporters.len(), 4);
    assert!(config.headless);
}

#[test]
fn test_ci_flag_changes_retries_and_workers() {
    let config = RunConfig::from_lookup(lookup_from(&[("CI", "true")]));
    assert!(config.ci);
    assert_eq!(config.retries, 2);
    assert_eq!(config.workers, 2);

    let config = RunConfig::from_lookup(lookup_from(&[("CI", "false")]));
    assert!(!config.ci);
}

#[test]
fn test_firefox_runs_single_worker() {
    let mut config = RunConfig::from_lookup(lookup_from(&[("CI", "1")]));
    assert_eq!(config.effective_workers(), 2);
    config.browser = BrowserType::Firefox;
    assert_eq!(config.effective_workers(), 1);
}

#[test]
fn test_base_url_parsing() {
    let mut config = RunConfig::from_lookup(lookup_from(&[]));
    assert_eq!(config.base_url().unwrap().host_str(), Some("tmdb-discover.surge.sh"));

    config.environment.base_url = "not a url".to_string();
    assert!(config.base_url().is_err());
}

#[test]
fn test_output_paths_relocate() {
    let root = std::path::Path::new("/tmp/run");
    let outputs = OutputPaths::under(root);
    assert_eq!(outputs.json_report, root.join("test-results/results.json"));
    assert_eq!(outputs.screenshots, root.join("screenshots"));
}

#[test]
fn test_config_serializes_timeouts_as_millis() {
    let config = RunConfig::from_lookup(lookup_from(&[]));
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["timeouts"]["action"], 10_000);
    assert_eq!(json["reporters"][3], "junit");
}
