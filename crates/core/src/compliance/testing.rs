//! Fixture builders shared by the unit tests in this crate.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::types::LocalDateTime;

use super::rules::{Rule, RuleCategory};
use super::schedule::{Game, Schedule, TeamInfo};

pub const TEAM_NAME: &str = "State";
pub const CONFERENCE: &str = "Big Conference";
pub const INSTITUTION: &str = "State University";

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> LocalDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid fixture date")
}

/// A non-conference home game against "Opponent".
pub fn game(id: &str, date_time: LocalDateTime) -> Game {
    Game {
        id: id.to_string(),
        date_time,
        home_team: TEAM_NAME.to_string(),
        away_team: "Opponent".to_string(),
        venue: None,
        event_type: None,
        conference_game: false,
    }
}

/// A conference game between `home` and `away`.
pub fn conference_game(id: &str, date_time: LocalDateTime, home: &str, away: &str) -> Game {
    Game {
        id: id.to_string(),
        date_time,
        home_team: home.to_string(),
        away_team: away.to_string(),
        venue: None,
        event_type: None,
        conference_game: true,
    }
}

pub fn schedule(sport: &str, games: Vec<Game>) -> Schedule {
    Schedule {
        id: "sched-1".to_string(),
        sport: sport.to_string(),
        season: "2024-25".to_string(),
        team: TeamInfo {
            id: "team-1".to_string(),
            name: TEAM_NAME.to_string(),
            conference: Some(CONFERENCE.to_string()),
            institution: Some(INSTITUTION.to_string()),
        },
        games,
    }
}

pub fn rule(category: &str, parameters: Value) -> Rule {
    Rule {
        id: format!("test_{category}"),
        title: format!("Test {category}"),
        description: String::new(),
        category: RuleCategory::parse(category),
        applicable_sports: vec!["all".to_string()],
        parameters: match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}
