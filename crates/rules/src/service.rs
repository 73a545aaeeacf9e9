use std::sync::Arc;

use fairplay_core::compliance::{
    RuleEngineState, Schedule, ValidateOptions, ValidationEngine, ViolationReport,
};

use crate::config::RulesConfig;
use crate::repository::RuleRepository;
use crate::source::{RuleSource, StandardRuleSource};

/// Rule loading plus validation behind one cheaply cloneable handle.
#[derive(Clone)]
pub struct ComplianceService {
    config: Arc<RulesConfig>,
    repository: Arc<RuleRepository>,
    engine: Arc<ValidationEngine>,
}

impl ComplianceService {
    /// Load every configured source and return a ready service.
    pub async fn start(
        config: RulesConfig,
        source: Arc<dyn RuleSource>,
        engine: ValidationEngine,
    ) -> Self {
        let repository = RuleRepository::new(source);
        repository.reload(&config).await;
        Self {
            config: Arc::new(config),
            repository: Arc::new(repository),
            engine: Arc::new(engine),
        }
    }

    /// [`start`](Self::start) with file and HTTP sources.
    pub async fn with_standard_sources(config: RulesConfig, engine: ValidationEngine) -> Self {
        let source = Arc::new(StandardRuleSource::new(config.fetch_timeout()));
        Self::start(config, source, engine).await
    }

    /// Validate against the rules current at the time of the call.
    pub async fn validate(&self, schedule: &Schedule, options: ValidateOptions) -> ViolationReport {
        let state = self.repository.snapshot();
        self.engine.validate(&state, schedule, options).await
    }

    /// Re-read every source with the configuration the service started with.
    pub async fn reload(&self) -> Arc<RuleEngineState> {
        self.repository.reload(&self.config).await
    }

    pub fn state(&self) -> Arc<RuleEngineState> {
        self.repository.snapshot()
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }
}
