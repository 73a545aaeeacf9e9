//! Conference scheduling validators.
//!
//! Opponents are identified against the conference roster supplied by
//! [`ConferenceRosterService`](crate::compliance::services::ConferenceRosterService).
//! Games against teams missing from the roster are ignored.

use std::collections::BTreeSet;

use crate::compliance::params::Params;
use crate::compliance::registry::{Outcome, ValidatorContext};
use crate::compliance::report::ViolationDetail;
use crate::compliance::rules::Rule;
use crate::compliance::schedule::{Game, Schedule};
use crate::compliance::services::RosterTeam;
use crate::error::ValidatorError;

/// Default minimum length of a run against one opponent to count as a series.
pub const DEFAULT_SERIES_MIN_GAMES: u64 = 1;

/// Conference members other than the schedule's own team.
fn conference_opponents(ctx: &ValidatorContext, schedule: &Schedule, conference: &str) -> Vec<RosterTeam> {
    ctx.rosters
        .teams_in(conference)
        .into_iter()
        .filter(|t| !schedule.team.is(&t.id) && !schedule.team.is(&t.name))
        .collect()
}

fn involves(team: &RosterTeam, game: &Game) -> bool {
    team.matches(&game.home_team) || team.matches(&game.away_team)
}

// ---------------------------------------------------------------------------
// conference_play
// ---------------------------------------------------------------------------

pub fn conference_play(
    ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let params = Params::of(rule);
    let play_twice = params.bool_or("playEachTeamTwice", false)?;
    let home_and_away = params.bool_or("homeAndAway", false)?;

    let Some(conference) = schedule.team.conference.as_deref() else {
        return Ok(Outcome::compliant(
            "Team has no conference; conference play not checked",
        ));
    };

    let conference_games: Vec<&Game> = schedule
        .games_by_date()
        .into_iter()
        .filter(|g| g.conference_game)
        .collect();

    let mut violations = Vec::new();
    for opponent in conference_opponents(ctx, schedule, conference) {
        let games: Vec<&Game> = conference_games
            .iter()
            .copied()
            .filter(|g| involves(&opponent, g))
            .collect();
        let played = games.len();
        let ids = || games.iter().map(|g| g.id.as_str());

        if play_twice && played != 2 {
            violations.push(
                ViolationDetail::new(format!(
                    "Played {} {played} time(s); exactly 2 required",
                    opponent.name
                ))
                .with_games(ids())
                .with_fact("opponent", opponent.name.as_str())
                .with_fact("games_played", played)
                .with_fact("required", 2),
            );
        } else if !play_twice && played == 0 {
            violations.push(
                ViolationDetail::new(format!("Did not play conference opponent {}", opponent.name))
                    .with_fact("opponent", opponent.name.as_str())
                    .with_fact("games_played", 0)
                    .with_fact("required", 1),
            );
        }

        if home_and_away && played > 0 {
            let home = games.iter().filter(|g| schedule.is_home(g)).count();
            let away = games.iter().filter(|g| schedule.is_away(g)).count();
            if home == 0 {
                violations.push(
                    ViolationDetail::new(format!("No home game against {}", opponent.name))
                        .with_games(ids())
                        .with_fact("opponent", opponent.name.as_str())
                        .with_fact("home_games", home),
                );
            }
            if away == 0 {
                violations.push(
                    ViolationDetail::new(format!("No away game against {}", opponent.name))
                        .with_games(ids())
                        .with_fact("opponent", opponent.name.as_str())
                        .with_fact("away_games", away),
                );
            }
        }
    }

    Ok(Outcome::from_violations(
        violations,
        format!("{conference} round-robin requirements met"),
        |n| format!("{n} {conference} round-robin violation(s)"),
    ))
}

// ---------------------------------------------------------------------------
// schedule_balance
// ---------------------------------------------------------------------------

pub fn schedule_balance(
    _ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let params = Params::of(rule);
    let max_consecutive = params.u64_opt("maxConsecutiveConferenceGames")?;
    let min_gap = params.u64_opt("minGapBetweenConferenceSeries")?;
    let series_min = params.u64_or("seriesMinGames", DEFAULT_SERIES_MIN_GAMES)?;

    if max_consecutive.is_none() && min_gap.is_none() {
        return Ok(Outcome::compliant("No schedule balance limits configured"));
    }

    let games = schedule.games_by_date();
    let mut violations = Vec::new();

    if let Some(max) = max_consecutive {
        for streak in conference_streaks(&games) {
            if streak.len() as u64 > max {
                violations.push(
                    ViolationDetail::new(format!(
                        "{} consecutive conference games; maximum is {max}",
                        streak.len()
                    ))
                    .with_games(streak.iter().map(|g| g.id.as_str()))
                    .with_fact("consecutive_games", streak.len())
                    .with_fact("max_consecutive", max),
                );
            }
        }
    }

    if let Some(min_gap) = min_gap {
        let series: Vec<Vec<&Game>> = conference_series(schedule, &games)
            .into_iter()
            .filter(|s| s.len() as u64 >= series_min)
            .collect();
        for pair in series.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let (Some(prev_last), Some(next_first)) = (prev.last(), next.first()) else {
                continue;
            };
            let gap = (next_first.date() - prev_last.date()).num_days();
            if gap < min_gap as i64 {
                violations.push(
                    ViolationDetail::new(format!(
                        "Only {gap} day(s) between series against {} and {}; {min_gap} required",
                        schedule.opponent(prev_last),
                        schedule.opponent(next_first)
                    ))
                    .with_games([prev_last.id.as_str(), next_first.id.as_str()])
                    .with_fact("gap_days", gap)
                    .with_fact("required", min_gap),
                );
            }
        }
    }

    Ok(Outcome::from_violations(
        violations,
        "Conference schedule is balanced",
        |n| format!("{n} schedule balance violation(s)"),
    ))
}

/// Maximal runs of conference games; any non-conference game ends a run.
fn conference_streaks<'a>(games: &[&'a Game]) -> Vec<Vec<&'a Game>> {
    let mut streaks = Vec::new();
    let mut current: Vec<&'a Game> = Vec::new();
    for &g in games {
        if g.conference_game {
            current.push(g);
        } else if !current.is_empty() {
            streaks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        streaks.push(current);
    }
    streaks
}

/// Consecutive conference games against the same opponent.
fn conference_series<'a>(schedule: &Schedule, games: &[&'a Game]) -> Vec<Vec<&'a Game>> {
    let mut series: Vec<Vec<&'a Game>> = Vec::new();
    let mut current: Vec<&'a Game> = Vec::new();
    for &g in games {
        if !g.conference_game {
            if !current.is_empty() {
                series.push(std::mem::take(&mut current));
            }
            continue;
        }
        let same_opponent = current
            .last()
            .is_some_and(|prev| schedule.opponent(prev).eq_ignore_ascii_case(schedule.opponent(g)));
        if !same_opponent && !current.is_empty() {
            series.push(std::mem::take(&mut current));
        }
        current.push(g);
    }
    if !current.is_empty() {
        series.push(current);
    }
    series
}

// ---------------------------------------------------------------------------
// tournament_eligibility
// ---------------------------------------------------------------------------

pub fn tournament_eligibility(
    ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let require_complete = Params::of(rule).bool_or("requireCompleteSchedule", true)?;
    if !require_complete {
        return Ok(Outcome::compliant(
            "Complete conference schedule not required for tournament eligibility",
        ));
    }

    let Some(conference) = schedule.team.conference.as_deref() else {
        return Ok(Outcome::compliant(
            "Team has no conference; tournament eligibility not checked",
        ));
    };

    let opponents = conference_opponents(ctx, schedule, conference);
    if opponents.is_empty() {
        return Ok(Outcome::compliant(format!(
            "No {conference} roster available; eligibility vacuously satisfied"
        )));
    }

    let conference_games: Vec<&Game> = schedule.games.iter().filter(|g| g.conference_game).collect();
    let missing: BTreeSet<&str> = opponents
        .iter()
        .filter(|t| !conference_games.iter().any(|g| involves(t, g)))
        .map(|t| t.name.as_str())
        .collect();
    let required = opponents.len();
    let played = required - missing.len();

    if missing.is_empty() {
        return Ok(Outcome::compliant(format!(
            "Played all {required} {conference} opponents"
        )));
    }

    let detail = ViolationDetail::new(format!(
        "Played {played} of {required} {conference} opponents"
    ))
    .with_fact("opponents_played", played)
    .with_fact("opponents_required", required)
    .with_fact(
        "missing_opponents",
        missing.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
    );

    Ok(Outcome {
        details: format!("Incomplete {conference} schedule; ineligible for the conference tournament"),
        violations: vec![detail],
    })
}
