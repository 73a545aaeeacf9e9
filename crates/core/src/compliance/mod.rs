//! Schedule compliance engine.
//!
//! Rule data ([`rules`]) is kept apart from rule behavior ([`registry`]):
//! a rule only names its category, and the registry maps each category to
//! a pure validator function. The [`engine`] ties resolution, validation,
//! aggregation and certification together and never fails.

pub mod certificate;
pub mod defaults;
pub mod engine;
pub mod normalize;
pub mod params;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod rules;
pub mod schedule;
pub mod services;
pub mod sink;
pub mod validators;

#[cfg(test)]
pub(crate) mod testing;

pub use certificate::{CertifiedRule, Certifier, ComplianceCertificate};
pub use engine::{ValidateOptions, ValidationEngine};
pub use normalize::normalize_document;
pub use registry::{Outcome, Validator, ValidatorContext, ValidatorRegistry};
pub use report::{
    ReportFormatter, ReportViolation, ValidationResult, ViolationDetail, ViolationReport,
};
pub use resolver::{applicable_rules, RuleApplication};
pub use rules::{Rule, RuleCategory, RuleEngineState, RuleSet, RuleTier};
pub use schedule::{Game, Schedule, TeamInfo};
pub use services::{
    AcademicCalendar, AcademicCalendarService, ConferenceRosterService, DistanceService,
    DistanceTable, PlaceholderDistance, RosterTeam, StaticAcademicCalendars,
    StaticConferenceRosters,
};
pub use sink::{MemoryReportSink, ReportSink};
