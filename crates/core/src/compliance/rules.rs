//! Rule, rule set and engine state types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Timestamp;

use super::defaults;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Sport sentinel that makes a rule apply to every sport.
pub const ALL_SPORTS: &str = "all";

/// Tier name reported for governing-body rules.
pub const GOVERNING_BODY_NAME: &str = "NCAA";

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The compliance check a rule asks for.
///
/// Unknown category strings are preserved in [`RuleCategory::Other`] so
/// that rule data the engine does not understand yet still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleCategory {
    GameCount,
    GameSpacing,
    PlayingSeason,
    OffDays,
    TravelDistance,
    AcademicCalendar,
    ConferencePlay,
    ScheduleBalance,
    TournamentEligibility,
    TravelPartners,
    Other(String),
}

impl RuleCategory {
    /// Every category with a built-in validator.
    pub const KNOWN: [RuleCategory; 10] = [
        Self::GameCount,
        Self::GameSpacing,
        Self::PlayingSeason,
        Self::OffDays,
        Self::TravelDistance,
        Self::AcademicCalendar,
        Self::ConferencePlay,
        Self::ScheduleBalance,
        Self::TournamentEligibility,
        Self::TravelPartners,
    ];

    /// Parse a raw category string. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "game_count" => Self::GameCount,
            "game_spacing" => Self::GameSpacing,
            "playing_season" => Self::PlayingSeason,
            "off_days" => Self::OffDays,
            "travel_distance" => Self::TravelDistance,
            "academic_calendar" => Self::AcademicCalendar,
            "conference_play" => Self::ConferencePlay,
            "schedule_balance" => Self::ScheduleBalance,
            "tournament_eligibility" => Self::TournamentEligibility,
            "travel_partners" => Self::TravelPartners,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::GameCount => "game_count",
            Self::GameSpacing => "game_spacing",
            Self::PlayingSeason => "playing_season",
            Self::OffDays => "off_days",
            Self::TravelDistance => "travel_distance",
            Self::AcademicCalendar => "academic_calendar",
            Self::ConferencePlay => "conference_play",
            Self::ScheduleBalance => "schedule_balance",
            Self::TournamentEligibility => "tournament_eligibility",
            Self::TravelPartners => "travel_partners",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for RuleCategory {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<RuleCategory> for String {
    fn from(category: RuleCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A single regulatory rule, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: RuleCategory,
    pub applicable_sports: Vec<String>,
    pub parameters: Map<String, Value>,
}

impl Rule {
    /// Whether this rule applies to `sport`, directly or via [`ALL_SPORTS`].
    pub fn applies_to(&self, sport: &str) -> bool {
        let sport = sport.trim();
        self.applicable_sports
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ALL_SPORTS) || s.eq_ignore_ascii_case(sport))
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Which level of the rule hierarchy a rule set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTier {
    GoverningBody,
    Conference,
    Institution,
}

impl RuleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoverningBody => "governing_body",
            Self::Conference => "conference",
            Self::Institution => "institution",
        }
    }
}

impl fmt::Display for RuleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Rules keyed by id, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule. A rule with the same id is replaced in place and
    /// returned; its position in iteration order is kept.
    pub fn insert(&mut self, rule: Rule) -> Option<Rule> {
        match self.rules.iter().position(|r| r.id == rule.id) {
            Some(idx) => Some(std::mem::replace(&mut self.rules[idx], rule)),
            None => {
                self.rules.push(rule);
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

// ---------------------------------------------------------------------------
// Engine state
// ---------------------------------------------------------------------------

/// Every loaded rule tier.
///
/// Built once per load cycle and replaced wholesale on reload; the
/// validation path only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEngineState {
    pub governing_body: RuleSet,
    pub conferences: BTreeMap<String, RuleSet>,
    pub institutions: BTreeMap<String, RuleSet>,
    pub loaded_at: Timestamp,
}

impl RuleEngineState {
    pub fn new(
        governing_body: RuleSet,
        conferences: BTreeMap<String, RuleSet>,
        institutions: BTreeMap<String, RuleSet>,
    ) -> Self {
        Self {
            governing_body,
            conferences,
            institutions,
            loaded_at: chrono::Utc::now(),
        }
    }

    /// Built-in governing-body rules only.
    pub fn with_defaults() -> Self {
        Self::new(
            defaults::governing_body_rules(),
            BTreeMap::new(),
            BTreeMap::new(),
        )
    }

    pub fn conference(&self, name: &str) -> Option<&RuleSet> {
        self.conferences.get(name)
    }

    pub fn institution(&self, name: &str) -> Option<&RuleSet> {
        self.institutions.get(name)
    }

    /// Total number of rules across all tiers.
    pub fn rule_count(&self) -> usize {
        self.governing_body.len()
            + self.conferences.values().map(RuleSet::len).sum::<usize>()
            + self.institutions.values().map(RuleSet::len).sum::<usize>()
    }
}
