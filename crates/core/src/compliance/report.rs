//! Per-rule results and the aggregated violation report.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{EngineError, ValidatorError};
use crate::types::Timestamp;

use super::certificate::ComplianceCertificate;
use super::registry::Outcome;
use super::resolver::RuleApplication;
use super::rules::RuleCategory;
use super::schedule::Schedule;

// ---------------------------------------------------------------------------
// Violation detail
// ---------------------------------------------------------------------------

/// Why one check failed for specific games.
///
/// `facts` carries check-specific numbers (`hours_between`, `required`,
/// ...) and is flattened into the serialized object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationDetail {
    pub issue: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub game_ids: Vec<String>,
    #[serde(flatten)]
    pub facts: Map<String, Value>,
}

impl ViolationDetail {
    pub fn new(issue: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            game_ids: Vec::new(),
            facts: Map::new(),
        }
    }

    pub fn with_games<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.game_ids.extend(ids.into_iter().map(str::to_string));
        self
    }

    pub fn with_fact(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.facts.insert(key.to_string(), value.into());
        self
    }

    pub fn fact(&self, key: &str) -> Option<&Value> {
        self.facts.get(key)
    }
}

// ---------------------------------------------------------------------------
// Per-rule result
// ---------------------------------------------------------------------------

/// Outcome of running one applicable rule. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_id: String,
    pub tier_name: String,
    pub rule_name: String,
    pub category: RuleCategory,
    pub compliant: bool,
    pub details: String,
    #[serde(default)]
    pub violations: Vec<ViolationDetail>,
    #[serde(default)]
    pub error: bool,
}

impl ValidationResult {
    pub fn from_outcome(application: &RuleApplication<'_>, outcome: Outcome) -> Self {
        Self {
            rule_id: application.rule_id.to_string(),
            tier_name: application.tier_name.to_string(),
            rule_name: application.rule.title.clone(),
            category: application.rule.category.clone(),
            compliant: outcome.violations.is_empty(),
            details: outcome.details,
            violations: outcome.violations,
            error: false,
        }
    }

    pub fn from_error(application: &RuleApplication<'_>, err: &ValidatorError) -> Self {
        Self {
            rule_id: application.rule_id.to_string(),
            tier_name: application.tier_name.to_string(),
            rule_name: application.rule.title.clone(),
            category: application.rule.category.clone(),
            compliant: false,
            details: format!("Validation error: {err}"),
            violations: Vec::new(),
            error: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Summary line for one non-compliant rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportViolation {
    pub tier_name: String,
    pub rule_name: String,
    pub category: RuleCategory,
    pub details: String,
}

/// The outcome of one validation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationReport {
    pub report_id: Uuid,
    pub timestamp: Timestamp,
    pub team: String,
    pub sport: String,
    pub schedule_id: String,
    pub compliant: bool,
    pub violation_count: usize,
    pub results: Vec<ValidationResult>,
    pub violations: Vec<ReportViolation>,
    #[serde(default)]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<ComplianceCertificate>,
}

impl ViolationReport {
    /// Aggregate per-rule results, keeping their order.
    pub fn from_results(schedule: &Schedule, results: Vec<ValidationResult>) -> Self {
        let violations: Vec<ReportViolation> = results
            .iter()
            .filter(|r| !r.compliant)
            .map(|r| ReportViolation {
                tier_name: r.tier_name.clone(),
                rule_name: r.rule_name.clone(),
                category: r.category.clone(),
                details: r.details.clone(),
            })
            .collect();

        Self {
            report_id: Uuid::now_v7(),
            timestamp: chrono::Utc::now(),
            team: schedule.team.name.clone(),
            sport: schedule.sport.clone(),
            schedule_id: schedule.id.clone(),
            compliant: violations.is_empty(),
            violation_count: violations.len(),
            results,
            violations,
            error: false,
            error_message: None,
            certificate: None,
        }
    }

    /// Minimal non-compliant report for a run that could not proceed.
    pub fn engine_failure(schedule: &Schedule, err: &EngineError) -> Self {
        Self {
            compliant: false,
            error: true,
            error_message: Some(err.to_string()),
            ..Self::from_results(schedule, Vec::new())
        }
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.compliant)
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Plain-text rendering of a report for logs and file sinks.
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn summary(report: &ViolationReport) -> String {
        let mut out = String::new();
        let verdict = if report.error {
            "ERROR"
        } else if report.compliant {
            "COMPLIANT"
        } else {
            "NON-COMPLIANT"
        };
        let _ = writeln!(
            out,
            "{} {} schedule {}: {verdict} ({} rule(s) checked, {} violation(s))",
            report.team,
            report.sport,
            report.schedule_id,
            report.results.len(),
            report.violation_count,
        );
        if let Some(message) = &report.error_message {
            let _ = writeln!(out, "  error: {message}");
        }
        for v in &report.violations {
            let _ = writeln!(
                out,
                "  [{}] {} ({}): {}",
                v.tier_name, v.rule_name, v.category, v.details
            );
        }
        if let Some(cert) = &report.certificate {
            let _ = writeln!(out, "  certificate: {}", cert.id);
        }
        out
    }
}
