use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default per-source fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Where one tier's rules come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    /// A local JSON document.
    File { path: PathBuf },
    /// An HTTP endpoint returning a JSON document, optionally behind a
    /// bearer token.
    Remote {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },
}

impl SourceSpec {
    /// `http://` and `https://` locations are remote; anything else is a path.
    pub fn parse(raw: &str, api_key: Option<&str>) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote {
                url: raw.to_string(),
                api_key: api_key.map(str::to_string),
            }
        } else {
            Self::File {
                path: PathBuf::from(raw),
            }
        }
    }

    /// Human-readable location for logs. Never includes the api key.
    pub fn describe(&self) -> String {
        match self {
            Self::File { path } => path.display().to_string(),
            Self::Remote { url, .. } => url.clone(),
        }
    }
}

/// A conference or institution and its rule source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSource {
    pub name: String,
    pub source: SourceSpec,
}

/// Rule source configuration.
///
/// | Env Var                            | Default  |
/// |------------------------------------|----------|
/// | `FAIRPLAY_NCAA_RULES`              | built-in |
/// | `FAIRPLAY_RULES_API_KEY`           | none     |
/// | `FAIRPLAY_CONFERENCE_RULES`        | none     |
/// | `FAIRPLAY_INSTITUTION_RULES_DIR`   | none     |
/// | `FAIRPLAY_INSTITUTION_RULES`       | none     |
/// | `FAIRPLAY_RULE_FETCH_TIMEOUT_SECS` | `10`     |
///
/// List variables are comma-separated `name=source` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Governing-body source; built-in defaults when absent.
    #[serde(default)]
    pub governing_body: Option<SourceSpec>,
    #[serde(default)]
    pub conferences: Vec<NamedSource>,
    /// Directory of `<institution>.json` override files.
    #[serde(default)]
    pub institution_dir: Option<PathBuf>,
    /// Explicit institution sources; these win over directory entries
    /// with the same name.
    #[serde(default)]
    pub institutions: Vec<NamedSource>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            governing_body: None,
            conferences: Vec::new(),
            institution_dir: None,
            institutions: Vec::new(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl RulesConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        let api_key = get("FAIRPLAY_RULES_API_KEY");
        let api_key = api_key.as_deref();

        let governing_body = get("FAIRPLAY_NCAA_RULES").map(|raw| SourceSpec::parse(&raw, api_key));

        let conferences = match get("FAIRPLAY_CONFERENCE_RULES") {
            Some(raw) => parse_named_sources("FAIRPLAY_CONFERENCE_RULES", &raw, api_key)?,
            None => Vec::new(),
        };
        let institutions = match get("FAIRPLAY_INSTITUTION_RULES") {
            Some(raw) => parse_named_sources("FAIRPLAY_INSTITUTION_RULES", &raw, api_key)?,
            None => Vec::new(),
        };
        let institution_dir = get("FAIRPLAY_INSTITUTION_RULES_DIR").map(PathBuf::from);

        let fetch_timeout_secs = match get("FAIRPLAY_RULE_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                ConfigError::InvalidVar {
                    name: "FAIRPLAY_RULE_FETCH_TIMEOUT_SECS",
                    reason: format!("expected a positive number of seconds, got '{raw}'"),
                }
            })?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Self {
            governing_body,
            conferences,
            institution_dir,
            institutions,
            fetch_timeout_secs,
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_named_sources(
    name: &'static str,
    raw: &str,
    api_key: Option<&str>,
) -> Result<Vec<NamedSource>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<NamedSource, ConfigError> {
            let (key, location) = entry
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .ok_or_else(|| ConfigError::InvalidVar {
                    name,
                    reason: format!("expected 'name=source', got '{entry}'"),
                })?;
            Ok(NamedSource {
                name: key.to_string(),
                source: SourceSpec::parse(location, api_key),
            })
        })
        .collect()
}
