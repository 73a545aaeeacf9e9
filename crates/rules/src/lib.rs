//! Rule loading for the compliance engine.
//!
//! [`RuleRepository`] fans out one task per configured source, normalizes
//! whatever each source returns and falls back to the built-in defaults
//! for any source that fails. [`ComplianceService`] pairs the repository
//! with a [`ValidationEngine`](fairplay_core::compliance::ValidationEngine).

pub mod config;
pub mod error;
pub mod repository;
pub mod service;
pub mod source;

pub use config::{NamedSource, RulesConfig, SourceSpec};
pub use error::{ConfigError, SourceLoadError};
pub use repository::RuleRepository;
pub use service::ComplianceService;
pub use source::{RuleSource, StandardRuleSource};
