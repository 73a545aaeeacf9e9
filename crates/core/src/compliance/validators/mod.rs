//! Built-in compliance validators, grouped by what they reason about.
//!
//! - [`calendar`]: game counts, spacing, season window, off days, finals.
//! - [`travel`]: inter-venue mileage and travel partners.
//! - [`conference`]: round-robin play, balance and tournament eligibility.

pub mod calendar;
pub mod conference;
pub mod travel;

use crate::error::ValidatorError;

use super::registry::{Outcome, ValidatorContext};
use super::rules::Rule;
use super::schedule::Schedule;

/// Fallback for categories without a validator.
pub fn noop(_: &ValidatorContext, _: &Schedule, rule: &Rule) -> Result<Outcome, ValidatorError> {
    Ok(Outcome::compliant(format!(
        "No validator for category '{}'; treated as compliant",
        rule.category
    )))
}
