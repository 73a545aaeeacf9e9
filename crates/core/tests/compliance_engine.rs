//! End-to-end behavior of the compliance engine over realistic schedules.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use fairplay_core::compliance::{
    AcademicCalendar, Game, RosterTeam, Rule, RuleCategory, RuleEngineState, RuleSet, Schedule,
    StaticAcademicCalendars, StaticConferenceRosters, TeamInfo, ValidateOptions, ValidationEngine,
    ValidatorContext, ValidatorRegistry,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{json, Map, Value};

const TEAM: &str = "Northern State";
const CONFERENCE: &str = "Lakes Conference";
const INSTITUTION: &str = "Northern State University";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    let year = if month >= 7 { 2024 } else { 2025 };
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap()
}

fn game(id: &str, date_time: NaiveDateTime, home: &str, away: &str, conference: bool) -> Game {
    Game {
        id: id.to_string(),
        date_time,
        home_team: home.to_string(),
        away_team: away.to_string(),
        venue: None,
        event_type: None,
        conference_game: conference,
    }
}

fn schedule(sport: &str, games: Vec<Game>) -> Schedule {
    Schedule {
        id: "sched-2024".to_string(),
        sport: sport.to_string(),
        season: "2024-25".to_string(),
        team: TeamInfo {
            id: "ns".to_string(),
            name: TEAM.to_string(),
            conference: Some(CONFERENCE.to_string()),
            institution: Some(INSTITUTION.to_string()),
        },
        games,
    }
}

fn rule(id: &str, category: &str, sports: &[&str], parameters: Value) -> Rule {
    Rule {
        id: id.to_string(),
        title: id.replace('_', " "),
        description: String::new(),
        category: RuleCategory::parse(category),
        applicable_sports: sports.iter().map(|s| s.to_string()).collect(),
        parameters: match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

fn context() -> ValidatorContext {
    let calendars = StaticAcademicCalendars::default().with_calendar(
        INSTITUTION,
        AcademicCalendar {
            finals_start: NaiveDate::from_ymd_opt(2024, 12, 9).unwrap(),
            finals_end: NaiveDate::from_ymd_opt(2024, 12, 13).unwrap(),
        },
    );
    let rosters = StaticConferenceRosters::default().with_roster(
        CONFERENCE,
        vec![
            RosterTeam::new("ns", TEAM),
            RosterTeam::new("es", "Eastern State"),
            RosterTeam::new("wt", "Western Tech"),
        ],
    );
    ValidatorContext::default()
        .with_calendars(Arc::new(calendars))
        .with_rosters(Arc::new(rosters))
}

fn engine() -> ValidationEngine {
    ValidationEngine::new(ValidatorRegistry::new(context()))
}

fn state() -> RuleEngineState {
    let governing = RuleSet::from_iter([
        rule(
            "hoops_game_count",
            "game_count",
            &["basketball_men"],
            json!({"maxGames": 29, "exemptEvents": ["multi_team_event"]}),
        ),
        rule("football_game_count", "game_count", &["football"], json!({"maxGames": 12})),
        rule("spacing", "game_spacing", &["all"], json!({"minHoursBetweenGames": 20})),
        rule("off_days", "off_days", &["all"], json!({"daysOffPerWeek": 1})),
    ]);
    let mut conferences = BTreeMap::new();
    conferences.insert(
        CONFERENCE.to_string(),
        RuleSet::from_iter([
            rule(
                "round_robin",
                "conference_play",
                &["basketball_men"],
                json!({"playEachTeamTwice": true, "homeAndAway": true}),
            ),
            rule(
                "balance",
                "schedule_balance",
                &["all"],
                json!({"maxConsecutiveConferenceGames": 3}),
            ),
        ]),
    );
    let mut institutions = BTreeMap::new();
    institutions.insert(
        INSTITUTION.to_string(),
        RuleSet::from_iter([rule(
            "finals",
            "academic_calendar",
            &["all"],
            json!({"noGamesBeforeFinals": 1, "noGamesDuringFinals": true}),
        )]),
    );
    RuleEngineState::new(governing, conferences, institutions)
}

/// A basketball season with a mix of clean and problematic stretches.
fn season() -> Schedule {
    let mut games: Vec<Game> = (0..12)
        .map(|i| {
            let day = 2 + i * 2;
            game(&format!("nc{i:02}"), at(11, day, 19), TEAM, "Visitor", false)
        })
        .collect();
    games.extend([
        game("es1", at(1, 4, 19), TEAM, "Eastern State", true),
        game("wt1", at(1, 8, 19), "Western Tech", TEAM, true),
        game("es2", at(1, 11, 19), "Eastern State", TEAM, true),
        game("wt2", at(1, 15, 19), TEAM, "Western Tech", true),
        game("es3", at(1, 16, 12), TEAM, "Eastern State", true),
        game("dec", at(12, 8, 19), TEAM, "Visitor", false),
    ]);
    schedule("basketball_men", games)
}

// ---------------------------------------------------------------------------
// Determinism and invariants
// ---------------------------------------------------------------------------

#[test]
fn repeated_runs_produce_identical_results() {
    let (state, s, engine) = (state(), season(), engine());
    let first = engine.evaluate(&state, &s);
    let second = engine.evaluate(&state, &s);

    assert_eq!(first.results, second.results);
    assert_eq!(first.violation_count, second.violation_count);
    assert_ne!(first.report_id, second.report_id);
}

#[test]
fn aggregation_invariants_hold() {
    let report = engine().evaluate(&state(), &season());

    let failed = report.results.iter().filter(|r| !r.compliant).count();
    assert_eq!(report.violation_count, failed);
    assert_eq!(report.violations.len(), failed);
    assert_eq!(report.compliant, report.results.iter().all(|r| r.compliant));
    for r in &report.results {
        assert_eq!(r.compliant, r.violations.is_empty() && !r.error, "{}", r.rule_id);
    }
}

#[test]
fn report_has_expected_violations() {
    let report = engine().evaluate(&state(), &season());
    let failed: Vec<&str> = report
        .results
        .iter()
        .filter(|r| !r.compliant)
        .map(|r| r.rule_id.as_str())
        .collect();

    // wt2 and es3 are 17 hours apart; es3 is a third game against Eastern
    // State; January is five straight conference games; the December 8
    // game is the day before finals.
    assert_eq!(failed, ["spacing", "round_robin", "balance", "finals"]);
    assert!(!report.compliant);
}

#[test]
fn football_rule_never_applies_to_basketball() {
    let report = engine().evaluate(&state(), &season());
    assert!(report.results.iter().all(|r| r.rule_id != "football_game_count"));
    assert!(report.results.iter().any(|r| r.rule_id == "spacing"));

    let football = engine().evaluate(&state(), &schedule("football", vec![]));
    let ids: Vec<&str> = football.results.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(ids, ["football_game_count", "spacing", "off_days", "balance", "finals"]);
}

#[test]
fn shuffling_games_does_not_change_order_independent_results() {
    let (state, engine) = (state(), engine());
    let baseline = engine.evaluate(&state, &season());
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..8 {
        let mut shuffled = season();
        shuffled.games.shuffle(&mut rng);
        let report = engine.evaluate(&state, &shuffled);

        for id in ["hoops_game_count", "spacing", "off_days", "balance"] {
            let a = baseline.results.iter().find(|r| r.rule_id == id).unwrap();
            let b = report.results.iter().find(|r| r.rule_id == id).unwrap();
            assert_eq!(a, b, "{id} changed after shuffle");
        }
        assert_eq!(report.violation_count, baseline.violation_count);
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn exempt_multi_team_events_keep_count_under_limit() {
    let games: Vec<Game> = (0..31)
        .map(|i| {
            let kickoff = at(11, 1, 12) + chrono::Duration::days(i * 3);
            let mut g = game(&format!("g{i:02}"), kickoff, TEAM, "Visitor", false);
            if i < 2 {
                g.event_type = Some("multi_team_event".to_string());
            }
            g
        })
        .collect();
    let state = RuleEngineState::new(
        RuleSet::from_iter([rule(
            "count",
            "game_count",
            &["basketball_men"],
            json!({"maxGames": 29, "exemptEvents": ["multi_team_event"]}),
        )]),
        BTreeMap::new(),
        BTreeMap::new(),
    );

    let report = engine().evaluate(&state, &schedule("basketball_men", games));

    assert!(report.compliant, "{:?}", report.results[0].details);
}

#[test]
fn games_six_hours_apart_violate_spacing() {
    let state = RuleEngineState::new(
        RuleSet::from_iter([rule(
            "spacing",
            "game_spacing",
            &["all"],
            json!({"minHoursBetweenGames": 20}),
        )]),
        BTreeMap::new(),
        BTreeMap::new(),
    );
    let s = schedule(
        "volleyball",
        vec![
            game("late", at(9, 6, 19), TEAM, "Visitor", false),
            game("early", at(9, 6, 13), TEAM, "Visitor", false),
        ],
    );

    let report = engine().evaluate(&state, &s);

    let result = &report.results[0];
    assert_eq!(result.violations.len(), 1);
    let v = &result.violations[0];
    assert_eq!(v.fact("hours_between"), Some(&json!(6.0)));
    assert_eq!(v.fact("required"), Some(&json!(20.0)));
    assert_eq!(v.game_ids, ["early", "late"]);
}

#[test]
fn game_day_before_finals_is_zero_days_before() {
    let state = RuleEngineState::new(
        RuleSet::new(),
        BTreeMap::new(),
        BTreeMap::from([(
            INSTITUTION.to_string(),
            RuleSet::from_iter([rule(
                "finals",
                "academic_calendar",
                &["all"],
                json!({"noGamesBeforeFinals": 1}),
            )]),
        )]),
    );
    let s = schedule("basketball_men", vec![game("g1", at(12, 8, 19), TEAM, "Visitor", false)]);

    let report = engine().evaluate(&state, &s);

    let v = &report.results[0].violations;
    assert_eq!(v.len(), 1);
    assert!(v[0].issue.contains("0 day(s) before finals"), "{}", v[0].issue);
}

#[test]
fn three_home_games_against_one_opponent() {
    let state = RuleEngineState::new(
        RuleSet::new(),
        BTreeMap::from([(
            CONFERENCE.to_string(),
            RuleSet::from_iter([rule(
                "round_robin",
                "conference_play",
                &["all"],
                json!({"playEachTeamTwice": true, "homeAndAway": true}),
            )]),
        )]),
        BTreeMap::new(),
    );
    let s = schedule(
        "basketball_men",
        vec![
            game("es1", at(1, 4, 19), TEAM, "Eastern State", true),
            game("es2", at(1, 18, 19), TEAM, "Eastern State", true),
            game("es3", at(2, 1, 19), TEAM, "Eastern State", true),
            game("wt1", at(1, 11, 19), TEAM, "Western Tech", true),
            game("wt2", at(1, 25, 19), "Western Tech", TEAM, true),
        ],
    );

    let report = engine().evaluate(&state, &s);

    let violations = &report.results[0].violations;
    assert_eq!(violations.len(), 2);
    assert!(violations[0].issue.contains("3 time(s)"));
    assert!(violations[1].issue.contains("No away game against Eastern State"));
}

#[test]
fn unknown_category_is_always_compliant() {
    let state = RuleEngineState::new(
        RuleSet::from_iter([rule("mystery", "custom_xyz", &["all"], json!({"threshold": 0}))]),
        BTreeMap::new(),
        BTreeMap::new(),
    );
    let report = engine().evaluate(&state, &season());
    assert!(report.compliant);
    assert_eq!(report.results[0].category.as_str(), "custom_xyz");
}

#[tokio::test]
async fn compliant_season_is_certified() {
    let mut clean = season();
    clean.games.retain(|g| g.id.starts_with("nc"));
    let state = RuleEngineState::new(
        RuleSet::from_iter([
            rule("spacing", "game_spacing", &["all"], json!({})),
            rule("off_days", "off_days", &["all"], json!({})),
        ]),
        BTreeMap::new(),
        BTreeMap::new(),
    );

    let report = engine()
        .validate(&state, &clean, ValidateOptions::certified())
        .await;

    assert!(report.compliant);
    let cert = report.certificate.unwrap();
    assert_eq!(cert.team, TEAM);
    assert_eq!(cert.validated_rules.len(), 2);
    assert!(cert.verify());
}
