//! Validation orchestration: resolve, run, aggregate, certify, persist.

use std::sync::Arc;

use crate::error::EngineError;

use super::certificate::Certifier;
use super::registry::ValidatorRegistry;
use super::report::ViolationReport;
use super::resolver::applicable_rules;
use super::rules::RuleEngineState;
use super::schedule::Schedule;
use super::sink::ReportSink;

/// Per-call switches for [`ValidationEngine::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Attach a signed certificate when the schedule is compliant.
    pub certify: bool,
    /// Hand the finished report to the configured sink.
    pub persist: bool,
}

impl ValidateOptions {
    pub fn certified() -> Self {
        Self {
            certify: true,
            persist: false,
        }
    }

    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }
}

#[derive(Clone, Default)]
pub struct ValidationEngine {
    registry: ValidatorRegistry,
    certifier: Certifier,
    sink: Option<Arc<dyn ReportSink>>,
}

impl ValidationEngine {
    pub fn new(registry: ValidatorRegistry) -> Self {
        Self {
            registry,
            certifier: Certifier::default(),
            sink: None,
        }
    }

    pub fn with_certifier(mut self, certifier: Certifier) -> Self {
        self.certifier = certifier;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Run every applicable rule and aggregate. Pure; never fails.
    pub fn evaluate(&self, state: &RuleEngineState, schedule: &Schedule) -> ViolationReport {
        if let Err(e) = schedule.check_shape() {
            return self.failure_report(schedule, &e);
        }

        let applications = applicable_rules(state, schedule);
        let results = applications
            .iter()
            .map(|application| self.registry.run(schedule, application))
            .collect();
        let report = ViolationReport::from_results(schedule, results);

        tracing::info!(
            report_id = %report.report_id,
            schedule_id = %schedule.id,
            team = %schedule.team.name,
            sport = %schedule.sport,
            rules = report.results.len(),
            violations = report.violation_count,
            compliant = report.compliant,
            "Schedule validated",
        );
        report
    }

    /// Validate a schedule and optionally certify and persist the report.
    ///
    /// Never fails: malformed input yields an error report, and sink
    /// failures are logged without altering the returned report.
    pub async fn validate(
        &self,
        state: &RuleEngineState,
        schedule: &Schedule,
        options: ValidateOptions,
    ) -> ViolationReport {
        let mut report = self.evaluate(state, schedule);

        if options.certify && report.compliant && !report.error {
            report.certificate = Some(self.certifier.certify(schedule, &report));
        }

        if options.persist {
            self.persist(&report).await;
        }

        report
    }

    async fn persist(&self, report: &ViolationReport) {
        let Some(sink) = &self.sink else {
            tracing::warn!(
                report_id = %report.report_id,
                "Persistence requested but no report sink is configured",
            );
            return;
        };

        if let Err(e) = sink.store(report).await {
            tracing::error!(
                report_id = %report.report_id,
                sink = sink.name(),
                error = %e,
                "Failed to persist compliance report",
            );
        }
    }

    fn failure_report(&self, schedule: &Schedule, err: &EngineError) -> ViolationReport {
        tracing::warn!(
            schedule_id = %schedule.id,
            error = %err,
            "Schedule rejected before validation",
        );
        ViolationReport::engine_failure(schedule, err)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;

    use super::*;
    use crate::compliance::rules::{Rule, RuleSet};
    use crate::compliance::sink::MemoryReportSink;
    use crate::compliance::testing::{at, game, rule, schedule, CONFERENCE};
    use crate::error::PersistenceError;
    use serde_json::json;

    struct FailingSink;

    #[async_trait]
    impl ReportSink for FailingSink {
        async fn store(&self, _: &ViolationReport) -> Result<(), PersistenceError> {
            Err(PersistenceError::Database("connection refused".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn state(rules: Vec<Rule>) -> RuleEngineState {
        RuleEngineState::new(rules.into_iter().collect(), BTreeMap::new(), BTreeMap::new())
    }

    fn spacing_state() -> RuleEngineState {
        state(vec![rule("game_spacing", json!({"minHoursBetweenGames": 20}))])
    }

    #[tokio::test]
    async fn compliant_schedule_gets_certificate_when_requested() {
        let s = schedule(
            "basketball_men",
            vec![game("g1", at(2025, 1, 3, 19)), game("g2", at(2025, 1, 6, 19))],
        );
        let report = ValidationEngine::default()
            .validate(&spacing_state(), &s, ValidateOptions::certified())
            .await;

        assert!(report.compliant);
        let cert = report.certificate.expect("certificate attached");
        assert!(cert.verify());
        assert_eq!(cert.validated_rules.len(), 1);
    }

    #[tokio::test]
    async fn non_compliant_schedule_gets_no_certificate() {
        let s = schedule(
            "basketball_men",
            vec![game("g1", at(2025, 1, 3, 12)), game("g2", at(2025, 1, 3, 18))],
        );
        let report = ValidationEngine::default()
            .validate(&spacing_state(), &s, ValidateOptions::certified())
            .await;

        assert!(!report.compliant);
        assert_eq!(report.violation_count, 1);
        assert!(report.certificate.is_none());
    }

    #[tokio::test]
    async fn certificate_is_not_attached_unless_requested() {
        let s = schedule("basketball_men", vec![]);
        let report = ValidationEngine::default()
            .validate(&spacing_state(), &s, ValidateOptions::default())
            .await;
        assert!(report.compliant);
        assert!(report.certificate.is_none());
    }

    #[tokio::test]
    async fn malformed_schedule_yields_error_report() {
        let s = schedule(
            "football",
            vec![game("g1", at(2024, 9, 1, 12)), game("g1", at(2024, 9, 8, 12))],
        );
        let report = ValidationEngine::default()
            .validate(&spacing_state(), &s, ValidateOptions::certified())
            .await;

        assert!(report.error);
        assert!(!report.compliant);
        assert!(report.results.is_empty());
        assert_eq!(report.violation_count, 0);
        assert!(report.certificate.is_none());
        assert!(report.error_message.unwrap().contains("duplicate game id"));
    }

    #[tokio::test]
    async fn persisted_report_reaches_sink() {
        let sink = Arc::new(MemoryReportSink::new());
        let engine = ValidationEngine::default().with_sink(sink.clone());
        let s = schedule("basketball_men", vec![]);

        let report = engine
            .validate(&spacing_state(), &s, ValidateOptions::default().persisted())
            .await;

        let stored = sink.reports();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].report_id, report.report_id);
    }

    #[tokio::test]
    async fn sink_failure_does_not_change_report() {
        let engine = ValidationEngine::default().with_sink(Arc::new(FailingSink));
        let s = schedule("basketball_men", vec![]);
        let report = engine
            .validate(&spacing_state(), &s, ValidateOptions::certified().persisted())
            .await;
        assert!(report.compliant);
        assert!(!report.error);
        assert!(report.certificate.is_some());
    }

    #[tokio::test]
    async fn persist_without_sink_is_a_no_op() {
        let s = schedule("basketball_men", vec![]);
        let report = ValidationEngine::default()
            .validate(&spacing_state(), &s, ValidateOptions::default().persisted())
            .await;
        assert!(report.compliant);
    }

    #[test]
    fn results_follow_tier_order() {
        let mut conferences = BTreeMap::new();
        conferences.insert(
            CONFERENCE.to_string(),
            RuleSet::from_iter([rule("off_days", json!({}))]),
        );
        let state = RuleEngineState::new(
            RuleSet::from_iter([rule("game_count", json!({})), rule("custom_xyz", json!({}))]),
            conferences,
            BTreeMap::new(),
        );
        let report = ValidationEngine::default().evaluate(&state, &schedule("football", vec![]));

        let ids: Vec<&str> = report.results.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, ["test_game_count", "test_custom_xyz", "test_off_days"]);
        assert_eq!(report.results[2].tier_name, CONFERENCE);
    }
}
