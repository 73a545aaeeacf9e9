//! Schedule and game types supplied by the caller.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::LocalDateTime;

/// The team whose schedule is being validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
}

impl TeamInfo {
    /// Whether `team` (a name or id as it appears on a game) is this team.
    pub fn is(&self, team: &str) -> bool {
        let team = team.trim();
        team == self.id || team.eq_ignore_ascii_case(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub date_time: LocalDateTime,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub conference_game: bool,
}

impl Game {
    /// Calendar day of the game (time of day truncated).
    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }
}

/// A team's season schedule. Game order is not guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub sport: String,
    pub season: String,
    pub team: TeamInfo,
    #[serde(default)]
    pub games: Vec<Game>,
}

impl Schedule {
    /// Games ordered by start time, ties broken by game id so the order
    /// never depends on how the caller listed them.
    pub fn games_by_date(&self) -> Vec<&Game> {
        let mut games: Vec<&Game> = self.games.iter().collect();
        games.sort_by(|a, b| a.date_time.cmp(&b.date_time).then_with(|| a.id.cmp(&b.id)));
        games
    }

    /// Whether the schedule's team is the home side of `game`.
    pub fn is_home(&self, game: &Game) -> bool {
        self.team.is(&game.home_team)
    }

    /// Whether the schedule's team is the away side of `game`.
    pub fn is_away(&self, game: &Game) -> bool {
        self.team.is(&game.away_team)
    }

    /// The other side of `game` from this team's point of view.
    pub fn opponent<'a>(&self, game: &'a Game) -> &'a str {
        if self.is_home(game) {
            &game.away_team
        } else {
            &game.home_team
        }
    }

    /// Reject schedules the engine cannot reason about.
    pub fn check_shape(&self) -> Result<(), EngineError> {
        if self.sport.trim().is_empty() {
            return Err(EngineError::MalformedSchedule("sport is empty".into()));
        }
        if self.team.name.trim().is_empty() {
            return Err(EngineError::MalformedSchedule("team name is empty".into()));
        }

        let mut seen = HashSet::with_capacity(self.games.len());
        for game in &self.games {
            if game.id.trim().is_empty() {
                return Err(EngineError::MalformedSchedule(format!(
                    "game on {} has an empty id",
                    game.date_time
                )));
            }
            if !seen.insert(game.id.as_str()) {
                return Err(EngineError::MalformedSchedule(format!(
                    "duplicate game id '{}'",
                    game.id
                )));
            }
        }
        Ok(())
    }
}
