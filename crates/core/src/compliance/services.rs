//! Lookup capabilities validators consume.
//!
//! The surrounding application supplies real implementations; the ones
//! here are static stand-ins suitable for configuration-driven
//! deployments and tests.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// Road or air distance between two venues.
pub trait DistanceService: Send + Sync {
    fn distance_miles(&self, from_venue: &str, to_venue: &str) -> f64;
}

/// Stand-in distance: zero for the same venue, a flat figure otherwise.
///
/// Real deployments should plug in a geodesic or mapping-API backed
/// implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDistance {
    pub miles_between_venues: f64,
}

impl DistanceService for PlaceholderDistance {
    fn distance_miles(&self, from_venue: &str, to_venue: &str) -> f64 {
        if from_venue.eq_ignore_ascii_case(to_venue) {
            0.0
        } else {
            self.miles_between_venues
        }
    }
}

/// Symmetric venue-pair lookup table.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    miles: HashMap<(String, String), f64>,
    fallback: f64,
}

impl DistanceTable {
    pub fn new(fallback: f64) -> Self {
        Self {
            miles: HashMap::new(),
            fallback,
        }
    }

    pub fn with_distance(mut self, a: &str, b: &str, miles: f64) -> Self {
        self.miles.insert(Self::key(a, b), miles);
        self
    }

    fn key(a: &str, b: &str) -> (String, String) {
        let (a, b) = (a.to_ascii_lowercase(), b.to_ascii_lowercase());
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl DistanceService for DistanceTable {
    fn distance_miles(&self, from_venue: &str, to_venue: &str) -> f64 {
        if from_venue.eq_ignore_ascii_case(to_venue) {
            return 0.0;
        }
        self.miles
            .get(&Self::key(from_venue, to_venue))
            .copied()
            .unwrap_or(self.fallback)
    }
}

// ---------------------------------------------------------------------------
// Academic calendar
// ---------------------------------------------------------------------------

/// Final examination window of an institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicCalendar {
    pub finals_start: NaiveDate,
    pub finals_end: NaiveDate,
}

pub trait AcademicCalendarService: Send + Sync {
    fn for_institution(&self, institution: &str) -> Option<AcademicCalendar>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticAcademicCalendars {
    calendars: HashMap<String, AcademicCalendar>,
}

impl StaticAcademicCalendars {
    pub fn with_calendar(mut self, institution: &str, calendar: AcademicCalendar) -> Self {
        self.calendars.insert(institution.to_string(), calendar);
        self
    }
}

impl AcademicCalendarService for StaticAcademicCalendars {
    fn for_institution(&self, institution: &str) -> Option<AcademicCalendar> {
        self.calendars.get(institution).copied()
    }
}

// ---------------------------------------------------------------------------
// Conference rosters
// ---------------------------------------------------------------------------

/// A member team of a conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTeam {
    pub id: String,
    pub name: String,
}

impl RosterTeam {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// Whether `team` (a name or id as it appears on a game) is this member.
    pub fn matches(&self, team: &str) -> bool {
        let team = team.trim();
        team == self.id || team.eq_ignore_ascii_case(&self.name)
    }
}

pub trait ConferenceRosterService: Send + Sync {
    fn teams_in(&self, conference: &str) -> Vec<RosterTeam>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticConferenceRosters {
    rosters: HashMap<String, Vec<RosterTeam>>,
}

impl StaticConferenceRosters {
    pub fn with_roster(mut self, conference: &str, teams: Vec<RosterTeam>) -> Self {
        self.rosters.insert(conference.to_string(), teams);
        self
    }
}

impl ConferenceRosterService for StaticConferenceRosters {
    fn teams_in(&self, conference: &str) -> Vec<RosterTeam> {
        self.rosters.get(conference).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_zero_for_same_venue() {
        let d = PlaceholderDistance {
            miles_between_venues: 300.0,
        };
        assert_eq!(d.distance_miles("Arena", "arena"), 0.0);
        assert_eq!(d.distance_miles("Arena", "Dome"), 300.0);
    }

    #[test]
    fn distance_table_is_symmetric() {
        let table = DistanceTable::new(50.0).with_distance("Arena", "Dome", 812.0);
        assert_eq!(table.distance_miles("Dome", "Arena"), 812.0);
        assert_eq!(table.distance_miles("Arena", "Field House"), 50.0);
    }

    #[test]
    fn roster_team_matches_id_or_name() {
        let t = RosterTeam::new("t-2", "Rival");
        assert!(t.matches("t-2"));
        assert!(t.matches("rival"));
        assert!(!t.matches("State"));
    }

    #[test]
    fn unknown_conference_has_empty_roster() {
        let rosters = StaticConferenceRosters::default();
        assert!(rosters.teams_in("Nowhere").is_empty());
    }
}
