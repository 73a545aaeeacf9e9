//! Fetching raw rule documents.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SourceSpec;
use crate::error::SourceLoadError;

/// Fetches the raw JSON document behind a [`SourceSpec`].
///
/// Implementations do not interpret the document; the repository
/// normalizes it.
#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn fetch(&self, spec: &SourceSpec) -> Result<Value, SourceLoadError>;
}

/// Reads files from disk and remote documents over HTTP.
pub struct StandardRuleSource {
    client: reqwest::Client,
}

impl StandardRuleSource {
    /// A source whose HTTP client gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client; using defaults");
                reqwest::Client::new()
            });
        Self { client }
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_remote(&self, url: &str, api_key: Option<&str>) -> Result<String, SourceLoadError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceLoadError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RuleSource for StandardRuleSource {
    async fn fetch(&self, spec: &SourceSpec) -> Result<Value, SourceLoadError> {
        let body = match spec {
            SourceSpec::File { path } => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceLoadError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            SourceSpec::Remote { url, api_key } => {
                self.fetch_remote(url, api_key.as_deref()).await?
            }
        };
        parse_document(&body)
    }
}

/// Parse a document body; blank bodies and `null` count as empty.
pub fn parse_document(body: &str) -> Result<Value, SourceLoadError> {
    if body.trim().is_empty() {
        return Err(SourceLoadError::Empty);
    }
    match serde_json::from_str(body)? {
        Value::Null => Err(SourceLoadError::Empty),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;
    use assert_matches::assert_matches;

    fn source() -> StandardRuleSource {
        StandardRuleSource::new(Duration::from_secs(1))
    }

    #[test]
    fn blank_and_null_documents_are_empty() {
        assert_matches!(parse_document("  \n"), Err(SourceLoadError::Empty));
        assert_matches!(parse_document("null"), Err(SourceLoadError::Empty));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert_matches!(parse_document("{rules: ["), Err(SourceLoadError::Parse(_)));
    }

    #[tokio::test]
    async fn reads_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rules": [{{"id": "r1"}}]}}"#).unwrap();

        let spec = SourceSpec::File {
            path: file.path().to_path_buf(),
        };
        let value = source().fetch(&spec).await.unwrap();

        assert_eq!(value["rules"][0]["id"], "r1");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let spec = SourceSpec::File {
            path: PathBuf::from("/nonexistent/fairplay/ncaa.json"),
        };
        assert_matches!(
            source().fetch(&spec).await,
            Err(SourceLoadError::Io { path, .. }) if path.ends_with("ncaa.json")
        );
    }

    #[tokio::test]
    async fn unreachable_remote_is_an_http_error() {
        let spec = SourceSpec::Remote {
            url: "http://127.0.0.1:9/rules".into(),
            api_key: Some("secret".into()),
        };
        assert_matches!(
            source().fetch(&spec).await,
            Err(SourceLoadError::Http(_) | SourceLoadError::Status(_))
        );
    }
}
