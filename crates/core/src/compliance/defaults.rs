//! Built-in rule sets used when a tier's source is absent or fails to load.

use serde_json::{json, Map, Value};

use super::rules::{Rule, RuleCategory, RuleSet, ALL_SPORTS};

fn rule(
    id: &str,
    title: &str,
    description: &str,
    category: RuleCategory,
    sports: &[&str],
    parameters: Value,
) -> Rule {
    Rule {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        applicable_sports: sports.iter().map(|s| s.to_string()).collect(),
        parameters: match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

/// Governing-body defaults.
pub fn governing_body_rules() -> RuleSet {
    [
        rule(
            "ncaa_basketball_game_count",
            "Basketball Maximum Contests",
            "Men's and women's basketball may play at most 29 countable contests; multi-team events count as one.",
            RuleCategory::GameCount,
            &["basketball_men", "basketball_women"],
            json!({"maxGames": 29, "exemptEvents": ["multi_team_event"]}),
        ),
        rule(
            "ncaa_football_game_count",
            "Football Maximum Contests",
            "Football may play at most 12 regular-season contests.",
            RuleCategory::GameCount,
            &["football"],
            json!({"maxGames": 12}),
        ),
        rule(
            "ncaa_game_spacing",
            "Minimum Rest Between Contests",
            "Consecutive contests must be at least 20 hours apart.",
            RuleCategory::GameSpacing,
            &[ALL_SPORTS],
            json!({"minHoursBetweenGames": 20}),
        ),
        rule(
            "ncaa_playing_season",
            "Playing Season Window",
            "All contests must fall inside the sport's playing season.",
            RuleCategory::PlayingSeason,
            &[ALL_SPORTS],
            json!({
                "seasons": {
                    "basketball_men": {"start": "11-04", "end": "04-07"},
                    "basketball_women": {"start": "11-04", "end": "04-07"},
                    "football": {"start": "08-24", "end": "01-20"},
                    "volleyball": {"start": "08-15", "end": "12-20"},
                    "baseball": {"start": "02-14", "end": "06-30"},
                    "softball": {"start": "02-06", "end": "06-10"}
                }
            }),
        ),
        rule(
            "ncaa_off_days",
            "Required Day Off",
            "Student-athletes must have at least one day off per week.",
            RuleCategory::OffDays,
            &[ALL_SPORTS],
            json!({"daysOffPerWeek": 1}),
        ),
        rule(
            "ncaa_academic_calendar",
            "Final Examination Protection",
            "No contests during the institution's final examination period.",
            RuleCategory::AcademicCalendar,
            &[ALL_SPORTS],
            json!({"noGamesDuringFinals": true}),
        ),
        rule(
            "ncaa_travel_distance",
            "Travel Distance Limits",
            "Caps mileage between consecutive contests.",
            RuleCategory::TravelDistance,
            &[ALL_SPORTS],
            json!({"maxMilesBetweenGames": 2500}),
        ),
    ]
    .into_iter()
    .collect()
}

/// Conference defaults, applied to any conference whose source failed.
pub fn conference_rules() -> RuleSet {
    [
        rule(
            "conference_round_robin",
            "Conference Round Robin",
            "Each conference opponent is played twice, once at home and once away.",
            RuleCategory::ConferencePlay,
            &["basketball_men", "basketball_women"],
            json!({"playEachTeamTwice": true, "homeAndAway": true}),
        ),
        rule(
            "conference_schedule_balance",
            "Conference Schedule Balance",
            "Limits back-to-back conference games and spaces out conference series.",
            RuleCategory::ScheduleBalance,
            &[ALL_SPORTS],
            json!({"maxConsecutiveConferenceGames": 6}),
        ),
        rule(
            "conference_tournament_eligibility",
            "Conference Tournament Eligibility",
            "Teams must complete the conference schedule to enter the tournament.",
            RuleCategory::TournamentEligibility,
            &[ALL_SPORTS],
            json!({"requireCompleteSchedule": true}),
        ),
    ]
    .into_iter()
    .collect()
}

/// Institution defaults, applied to any institution whose source failed.
pub fn institution_rules() -> RuleSet {
    [
        rule(
            "institution_finals_buffer",
            "Finals Buffer",
            "No contests during finals or in the two days before they begin.",
            RuleCategory::AcademicCalendar,
            &[ALL_SPORTS],
            json!({"noGamesBeforeFinals": 2, "noGamesDuringFinals": true}),
        ),
        rule(
            "institution_travel_budget",
            "Travel Budget",
            "Caps total season travel mileage.",
            RuleCategory::TravelDistance,
            &[ALL_SPORTS],
            json!({"maxMilesPerTrip": 15000}),
        ),
        rule(
            "institution_travel_partners",
            "Travel Partners",
            "Road trips are paired with the designated travel partner.",
            RuleCategory::TravelPartners,
            &[ALL_SPORTS],
            json!({}),
        ),
    ]
    .into_iter()
    .collect()
}
