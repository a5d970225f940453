#[cfg(test)]
mod tests {
    use super::super::run::{RunArgs, apply_overrides, check_suites};
    use discover_e2e::config::{ReporterKind, RunConfig};
    use discover_e2e::webdriver::BrowserType;

    fn base() -> RunConfig {
        RunConfig::from_lookup(|_| None)
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let config = apply_overrides(base(), &RunArgs::default()).unwrap();
        assert_eq!(config.browser, BrowserType::Chrome);
        assert!(config.headless);
        assert_eq!(config.reporters.len(), 4);
        assert_eq!(
            config.environment.base_url,
            discover_e2e::config::DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_overrides_apply() {
        let args = RunArgs {
            base_url: Some("http://localhost:3000".to_string()),
            browser: Some("firefox".to_string()),
            headed: true,
            workers: Some(0),
            retries: Some(1),
            reporters: vec![ReporterKind::Json],
            viewport: Some("800x600".to_string()),
            ..RunArgs::default()
        };
        let config = apply_overrides(base(), &args).unwrap();
        assert_eq!(config.environment.base_url, "http://localhost:3000");
        assert_eq!(config.browser, BrowserType::Firefox);
        assert!(!config.headless);
        assert_eq!(config.workers, 1);
        assert_eq!(config.retries, 1);
        assert_eq!(config.reporters, vec![ReporterKind::Json]);
        assert_eq!(config.viewport.width, 800);
        assert_eq!(config.effective_workers(), 1);
    }

    #[test]
    fn test_invalid_overrides_fail() {
        let bad_url = RunArgs {
            base_url: Some("not a url".to_string()),
            ..RunArgs::default()
        };
        assert!(apply_overrides(base(), &bad_url).is_err());

        let bad_browser = RunArgs {
            browser: Some("netscape".to_string()),
            ..RunArgs::default()
        };
        assert!(apply_overrides(base(), &bad_browser).is_err());
    }

    #[test]
    fn test_check_suites() {
        assert!(check_suites(&[]).is_ok());
        assert!(check_suites(&["search".to_string(), "filters".to_string()]).is_ok());
        let err = check_suites(&["checkout".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown suite 'checkout'"));
    }
}
