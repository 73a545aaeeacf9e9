//! Category → validator dispatch.
//!
//! Every validator is a plain function of the schedule, the rule and the
//! injected lookup services. The registry owns the services, resolves the
//! function for a rule's category and folds validator errors into the
//! rule's result so that one bad rule never aborts a run.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::ValidatorError;

use super::report::{ValidationResult, ViolationDetail};
use super::resolver::RuleApplication;
use super::rules::{Rule, RuleCategory};
use super::schedule::Schedule;
use super::services::{
    AcademicCalendarService, ConferenceRosterService, DistanceService, PlaceholderDistance,
    StaticAcademicCalendars, StaticConferenceRosters,
};
use super::validators;

/// What a validator found. No violations means compliant.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub details: String,
    pub violations: Vec<ViolationDetail>,
}

impl Outcome {
    pub fn compliant(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
            violations: Vec::new(),
        }
    }

    /// Build an outcome whose details depend on whether anything was found.
    pub fn from_violations(
        violations: Vec<ViolationDetail>,
        when_compliant: impl Into<String>,
        when_violated: impl FnOnce(usize) -> String,
    ) -> Self {
        let details = if violations.is_empty() {
            when_compliant.into()
        } else {
            when_violated(violations.len())
        };
        Self {
            details,
            violations,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Lookup capabilities handed to every validator.
#[derive(Clone)]
pub struct ValidatorContext {
    pub distance: Arc<dyn DistanceService>,
    pub calendars: Arc<dyn AcademicCalendarService>,
    pub rosters: Arc<dyn ConferenceRosterService>,
}

impl Default for ValidatorContext {
    fn default() -> Self {
        Self {
            distance: Arc::new(PlaceholderDistance::default()),
            calendars: Arc::new(StaticAcademicCalendars::default()),
            rosters: Arc::new(StaticConferenceRosters::default()),
        }
    }
}

impl ValidatorContext {
    pub fn with_distance(mut self, distance: Arc<dyn DistanceService>) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_calendars(mut self, calendars: Arc<dyn AcademicCalendarService>) -> Self {
        self.calendars = calendars;
        self
    }

    pub fn with_rosters(mut self, rosters: Arc<dyn ConferenceRosterService>) -> Self {
        self.rosters = rosters;
        self
    }
}

/// A pure compliance check.
pub type Validator = fn(&ValidatorContext, &Schedule, &Rule) -> Result<Outcome, ValidatorError>;

/// Maps rule categories to validators.
#[derive(Clone)]
pub struct ValidatorRegistry {
    context: ValidatorContext,
    validators: HashMap<RuleCategory, Validator>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new(ValidatorContext::default())
    }
}

impl ValidatorRegistry {
    /// A registry with every built-in validator registered.
    pub fn new(context: ValidatorContext) -> Self {
        let validators = RuleCategory::KNOWN
            .into_iter()
            .filter_map(|category| builtin(&category).map(|v| (category, v)))
            .collect();
        Self {
            context,
            validators,
        }
    }

    /// Add or replace the validator for `category`.
    pub fn register(&mut self, category: RuleCategory, validator: Validator) {
        self.validators.insert(category, validator);
    }

    /// The validator for `category`; unknown categories get a no-op.
    pub fn resolve(&self, category: &RuleCategory) -> Validator {
        self.validators
            .get(category)
            .copied()
            .unwrap_or(validators::noop)
    }

    pub fn context(&self) -> &ValidatorContext {
        &self.context
    }

    /// Run the validator for one applicable rule. Never fails.
    pub fn run(&self, schedule: &Schedule, application: &RuleApplication<'_>) -> ValidationResult {
        let rule = application.rule;
        let validator = self.resolve(&rule.category);

        tracing::debug!(
            rule_id = %rule.id,
            tier = %application.tier_name,
            category = %rule.category,
            "Running compliance validator",
        );

        let run = panic::catch_unwind(AssertUnwindSafe(|| {
            validator(&self.context, schedule, rule)
        }));
        let result = run.unwrap_or_else(|payload| {
            Err(ValidatorError::Internal(format!(
                "Validator panicked: {}",
                panic_message(payload.as_ref())
            )))
        });

        match result {
            Ok(outcome) => ValidationResult::from_outcome(application, outcome),
            Err(e) => {
                tracing::warn!(
                    rule_id = %rule.id,
                    tier = %application.tier_name,
                    schedule_id = %schedule.id,
                    error = %e,
                    "Validator failed; rule marked non-compliant",
                );
                ValidationResult::from_error(application, &e)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn builtin(category: &RuleCategory) -> Option<Validator> {
    let validator: Validator = match category {
        RuleCategory::GameCount => validators::calendar::game_count,
        RuleCategory::GameSpacing => validators::calendar::game_spacing,
        RuleCategory::PlayingSeason => validators::calendar::playing_season,
        RuleCategory::OffDays => validators::calendar::off_days,
        RuleCategory::AcademicCalendar => validators::calendar::academic_calendar,
        RuleCategory::TravelDistance => validators::travel::travel_distance,
        RuleCategory::TravelPartners => validators::travel::travel_partners,
        RuleCategory::ConferencePlay => validators::conference::conference_play,
        RuleCategory::ScheduleBalance => validators::conference::schedule_balance,
        RuleCategory::TournamentEligibility => validators::conference::tournament_eligibility,
        RuleCategory::Other(_) => return None,
    };
    Some(validator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::rules::RuleTier;
    use crate::compliance::testing::{at, game, rule, schedule};
    use serde_json::json;

    fn application(rule: &Rule) -> RuleApplication<'_> {
        RuleApplication {
            rule_id: &rule.id,
            tier: RuleTier::GoverningBody,
            tier_name: "NCAA",
            rule,
        }
    }

    fn always_fails(_: &ValidatorContext, _: &Schedule, _: &Rule) -> Result<Outcome, ValidatorError> {
        Err(ValidatorError::Internal("boom".into()))
    }

    fn always_panics(_: &ValidatorContext, _: &Schedule, _: &Rule) -> Result<Outcome, ValidatorError> {
        panic!("validator blew up")
    }

    #[test]
    fn panicking_validator_becomes_error_result() {
        let mut registry = ValidatorRegistry::default();
        registry.register(RuleCategory::OffDays, always_panics);
        let r = rule("off_days", json!({}));
        let s = schedule("football", vec![game("g1", at(2024, 9, 1, 12))]);

        let result = registry.run(&s, &application(&r));

        assert!(!result.compliant);
        assert!(result.error);
        assert!(result.details.contains("validator blew up"), "{}", result.details);
    }

    #[test]
    fn game_at_earliest_date_does_not_abort_run() {
        let registry = ValidatorRegistry::default();
        let earliest = chrono::NaiveDate::MIN.and_hms_opt(12, 0, 0).unwrap();
        let s = schedule("baseball", vec![game("g1", earliest)]);
        let r = rule("off_days", json!({}));

        let result = registry.run(&s, &application(&r));

        assert!(result.error);
        assert!(!result.compliant);
    }

    #[test]
    fn every_known_category_has_a_validator() {
        let registry = ValidatorRegistry::default();
        for category in RuleCategory::KNOWN {
            assert!(registry.validators.contains_key(&category), "{category} missing");
        }
    }

    #[test]
    fn unknown_category_is_always_compliant() {
        let registry = ValidatorRegistry::default();
        let r = rule("custom_xyz", json!({"anything": 1}));
        let s = schedule("football", vec![game("g1", at(2024, 9, 1, 12))]);
        let result = registry.run(&s, &application(&r));
        assert!(result.compliant);
        assert!(!result.error);
        assert_eq!(result.category.as_str(), "custom_xyz");
    }

    #[test]
    fn validator_error_becomes_error_result() {
        let mut registry = ValidatorRegistry::default();
        registry.register(RuleCategory::GameCount, always_fails);
        let r = rule("game_count", json!({}));
        let s = schedule("football", vec![]);
        let result = registry.run(&s, &application(&r));
        assert!(!result.compliant);
        assert!(result.error);
        assert_eq!(result.details, "Validation error: Internal error: boom");
    }

    #[test]
    fn malformed_parameter_becomes_error_result() {
        let registry = ValidatorRegistry::default();
        let r = rule("game_spacing", json!({"minHoursBetweenGames": "twenty"}));
        let s = schedule("football", vec![]);
        let result = registry.run(&s, &application(&r));
        assert!(result.error);
        assert!(result.details.contains("minHoursBetweenGames"));
    }

    #[test]
    fn result_carries_rule_identity() {
        let registry = ValidatorRegistry::default();
        let r = rule("travel_partners", json!({}));
        let s = schedule("football", vec![]);
        let result = registry.run(&s, &application(&r));
        assert_eq!(result.rule_id, "test_travel_partners");
        assert_eq!(result.rule_name, "Test travel_partners");
        assert_eq!(result.tier_name, "NCAA");
    }
}
