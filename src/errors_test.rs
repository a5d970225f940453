// Unit tests for error classification

use super::*;

#[test]
fn test_exit_codes() {
    let not_found = DiscoverError::ElementNotFound {
        locator: "css=img".to_string(),
        waited_ms: 10_000,
    };
    assert_eq!(not_found.exit_code(), 2);
    assert_eq!(DiscoverError::AssertionFailed("x".into()).exit_code(), 3);
    assert_eq!(DiscoverError::WebDriverFailed("x".into()).exit_code(), 4);
    assert_eq!(DiscoverError::Timeout("x".into()).exit_code(), 5);
    assert_eq!(DiscoverError::Skipped("x".into()).exit_code(), 0);
    assert_eq!(
        DiscoverError::Other(anyhow::anyhow!("boom")).exit_code(),
        1
    );
}

#[test]
fn test_element_not_found_message_names_locator() {
    let err = DiscoverError::ElementNotFound {
        locator: "text=Movie >> nth=0".to_string(),
        waited_ms: 250,
    };
    let msg = err.to_string();
    assert!(msg.contains("text=Movie >> nth=0"));
    assert!(msg.contains("250ms"));
}

#[test]
fn test_typed_error_survives_anyhow_round_trip() {
    let err: anyhow::Error = DiscoverError::AssertionFailed("page has content".into()).into();
    let back: DiscoverError = err.into();
    assert!(matches!(back, DiscoverError::AssertionFailed(ref d) if d == "page has content"));
}

#[test]
fn test_skip_is_not_failure() {
    let err: anyhow::Error = DiscoverError::Skipped("no TV toggle".into()).into();
    let back: DiscoverError = err.into();
    assert!(back.is_skip());
    assert_eq!(back.exit_code(), 0);
}

#[test]
fn test_message_sniffing() {
    let driver: DiscoverError = anyhow::anyhow!("chromedriver not found in PATH").into();
    assert!(matches!(driver, DiscoverError::WebDriverFailed(_)));

    let other: DiscoverError = anyhow::anyhow!("something else").into();
    assert!(matches!(other, DiscoverError::Other(_)));
}

#[test]
fn test_timeout_words_in_messages_stay_generic() {
    // Titles and selectors may mention timeouts without being one
    for msg in [
        "No results for 'timeout'",
        "Assertion on [data-test=\"session-timeout\"] banner",
        "request timed out upstream",
    ] {
        let err: DiscoverError = anyhow::anyhow!("{}", msg).into();
        assert!(matches!(err, DiscoverError::Other(_)), "{}", msg);
        assert_eq!(err.exit_code(), 1);
    }

    let typed: anyhow::Error = fantoccini::error::CmdError::WaitTimeout.into();
    let typed: DiscoverError = typed.into();
    assert!(matches!(typed, DiscoverError::Timeout(_)));
    assert_eq!(typed.exit_code(), 5);
}
