use thiserror::Error;

/// Failure classes surfaced by scenarios, fixtures and the runner
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// No element matched a locator within the action timeout (exit code 2)
    #[error("No element matching {locator} after waiting {waited_ms}ms")]
    ElementNotFound { locator: String, waited_ms: u64 },
    /// An expectation about observed page state did not hold (exit code 3)
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),
    /// WebDriver connection or session failure (exit code 4)
    #[error("WebDriver connection failed: {0}")]
    WebDriverFailed(String),
    /// Operation timeout (exit code 5)
    #[error("Operation timed out: {0}")]
    Timeout(String),
    /// Scenario asked to be skipped; never counted as a failure
    #[error("Skipped: {0}")]
    Skipped(String),
    /// Generic error (exit code 1)
    #[error(transparent)]
    Other(anyhow::Error),
}

impl DiscoverError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DiscoverError::ElementNotFound { .. } => 2,
            DiscoverError::AssertionFailed(_) => 3,
            DiscoverError::WebDriverFailed(_) => 4,
            DiscoverError::Timeout(_) => 5,
            DiscoverError::Skipped(_) => 0,
            DiscoverError::Other(_) => 1,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, DiscoverError::Skipped(_))
    }
}

impl From<anyhow::Error> for DiscoverError {
    fn from(err: anyhow::Error) -> Self {
        // Errors raised by this crate travel inside anyhow; unwrap them first
        let err = match err.downcast::<DiscoverError>() {
            Ok(typed) => return typed,
            Err(err) => err,
        };

        if let Some(cmd) = err.downcast_ref::<fantoccini::error::CmdError>() {
            if cmd.is_no_such_element() {
                return DiscoverError::ElementNotFound {
                    locator: cmd.to_string(),
                    waited_ms: 0,
                };
            }
            if matches!(cmd, fantoccini::error::CmdError::WaitTimeout) {
                return DiscoverError::Timeout(cmd.to_string());
            }
            return DiscoverError::Other(err);
        }

        if err
            .downcast_ref::<fantoccini::error::NewSessionError>()
            .is_some()
        {
            return DiscoverError::WebDriverFailed(format!("{:#}", err));
        }

        // Driver start failures arrive as plain context chains; timeouts are
        // only ever classified from typed errors
        let msg = err.to_string();
        if msg.contains("Failed to connect to WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            DiscoverError::WebDriverFailed(msg)
        } else {
            DiscoverError::Other(err)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
