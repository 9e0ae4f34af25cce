//! # Bridge Error Types

use thiserror::Error;

/// Bridge operation result type
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failures talking to the Things app.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("AppleScript failed: {0}")]
    ScriptFailed(String),

    #[error("Things returned an error: {0}")]
    Things(String),

    #[error("AppleScript timed out after {0}s; is Things 3 running?")]
    Timeout(u64),

    #[error("Failed to open URL: {0}")]
    UrlOpen(String),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn script_failed(message: impl Into<String>) -> Self {
        Self::ScriptFailed(message.into())
    }

    pub fn url_open(message: impl Into<String>) -> Self {
        Self::UrlOpen(message.into())
    }

    /// Whether the URL scheme is worth trying after this failure.
    #[must_use]
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, BridgeError::UrlOpen(_) | BridgeError::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_failures_allow_fallback() {
        assert!(BridgeError::script_failed("boom").allows_fallback());
        assert!(BridgeError::Timeout(10).allows_fallback());
        assert!(BridgeError::Things("Can't get to do id".into()).allows_fallback());
        assert!(!BridgeError::url_open("no opener").allows_fallback());
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            BridgeError::Timeout(10).to_string(),
            "AppleScript timed out after 10s; is Things 3 running?"
        );
    }
}
