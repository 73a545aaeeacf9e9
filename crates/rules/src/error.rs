use std::path::PathBuf;
use std::time::Duration;

use fairplay_core::error::NormalizeError;

/// Failure fetching or decoding one rule source.
///
/// Never escapes the repository: the failing source is replaced by the
/// tier's built-in defaults.
#[derive(Debug, thiserror::Error)]
pub enum SourceLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rule source returned HTTP {0}")]
    Status(u16),

    #[error("Rule source timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid rule JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unusable rule document: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Rule source returned an empty document")]
    Empty,
}

/// A malformed environment variable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_timeout() {
        let err = SourceLoadError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Rule source timed out after 10s");
    }

    #[test]
    fn display_io_names_the_path() {
        let err = SourceLoadError::Io {
            path: PathBuf::from("/rules/ncaa.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Failed to read /rules/ncaa.json: not found");
    }

    #[test]
    fn display_invalid_var() {
        let err = ConfigError::InvalidVar {
            name: "FAIRPLAY_RULE_FETCH_TIMEOUT_SECS",
            reason: "expected whole seconds".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for FAIRPLAY_RULE_FETCH_TIMEOUT_SECS: expected whole seconds"
        );
    }
}
