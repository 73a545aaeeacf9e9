//! Date- and time-based validators.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde_json::Value;

use crate::compliance::params::{parse_date, Params};
use crate::compliance::registry::{Outcome, ValidatorContext};
use crate::compliance::report::ViolationDetail;
use crate::compliance::rules::Rule;
use crate::compliance::schedule::{Game, Schedule};
use crate::error::ValidatorError;

/// Default countable-game limit (basketball regular season).
pub const DEFAULT_MAX_GAMES: u64 = 29;

/// Default minimum rest between consecutive games, in hours.
pub const DEFAULT_MIN_HOURS_BETWEEN_GAMES: f64 = 20.0;

/// Default required days without a game in each Sunday-based week.
pub const DEFAULT_DAYS_OFF_PER_WEEK: u64 = 1;

/// Month from which a month-day season bound falls in the season's first year.
const SEASON_ROLLOVER_MONTH: u32 = 7;

// ---------------------------------------------------------------------------
// game_count
// ---------------------------------------------------------------------------

pub fn game_count(
    _ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let params = Params::of(rule);
    let max_games = params.u64_or("maxGames", DEFAULT_MAX_GAMES)?;
    let exempt_events = params.string_list("exemptEvents")?;

    let exempt = schedule
        .games
        .iter()
        .filter(|g| {
            g.event_type
                .as_deref()
                .is_some_and(|e| exempt_events.iter().any(|x| x == e))
        })
        .count();
    let countable = schedule.games.len() - exempt;

    if countable as u64 <= max_games {
        return Ok(Outcome::compliant(format!(
            "{countable} countable game(s), limit {max_games} ({exempt} exempt)"
        )));
    }

    let detail = ViolationDetail::new(format!(
        "{countable} countable games exceeds the limit of {max_games}"
    ))
    .with_fact("countable_games", countable)
    .with_fact("max_games", max_games)
    .with_fact("exempt_games", exempt);

    Ok(Outcome {
        details: format!("Schedule has {countable} countable games; maximum is {max_games}"),
        violations: vec![detail],
    })
}

// ---------------------------------------------------------------------------
// game_spacing
// ---------------------------------------------------------------------------

pub fn game_spacing(
    _ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let required =
        Params::of(rule).f64_or("minHoursBetweenGames", DEFAULT_MIN_HOURS_BETWEEN_GAMES)?;

    let games = schedule.games_by_date();
    let violations: Vec<ViolationDetail> = games
        .windows(2)
        .filter_map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            let exact = hours_between(prev, next);
            (exact < required).then(|| {
                let hours = (exact * 10.0).round() / 10.0;
                ViolationDetail::new(format!(
                    "Only {hours} hour(s) between {} and {}; {required} required",
                    prev.id, next.id
                ))
                .with_games([prev.id.as_str(), next.id.as_str()])
                .with_fact("hours_between", hours)
                .with_fact("required", required)
            })
        })
        .collect();

    Ok(Outcome::from_violations(
        violations,
        format!("All games at least {required} hours apart"),
        |n| format!("{n} pair(s) of games closer than {required} hours"),
    ))
}

/// Exact hours from the start of `a` to the start of `b`.
fn hours_between(a: &Game, b: &Game) -> f64 {
    (b.date_time - a.date_time).num_seconds() as f64 / 3600.0
}

// ---------------------------------------------------------------------------
// playing_season
// ---------------------------------------------------------------------------

/// Inclusive first and last day of a playing season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SeasonWindow {
    start: NaiveDate,
    end: NaiveDate,
}

pub fn playing_season(
    _ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let window = season_window(schedule, &Params::of(rule))?;

    let violations: Vec<ViolationDetail> = schedule
        .games_by_date()
        .into_iter()
        .filter_map(|g| {
            let day = g.date();
            let issue = if day < window.start {
                format!("Game on {day} is before the season start {}", window.start)
            } else if day > window.end {
                format!("Game on {day} is after the season end {}", window.end)
            } else {
                return None;
            };
            Some(
                ViolationDetail::new(issue)
                    .with_games([g.id.as_str()])
                    .with_fact("game_date", day.to_string())
                    .with_fact("season_start", window.start.to_string())
                    .with_fact("season_end", window.end.to_string()),
            )
        })
        .collect();

    Ok(Outcome::from_violations(
        violations,
        format!(
            "All games within the {} season ({} to {})",
            schedule.sport, window.start, window.end
        ),
        |n| format!("{n} game(s) outside the playing season"),
    ))
}

/// Resolve the window from `seasons[sport]`, then `defaultSeason`, then
/// the schedule's season year (August 1 to June 30).
fn season_window(schedule: &Schedule, params: &Params<'_>) -> Result<SeasonWindow, ValidatorError> {
    if let Some(seasons) = params.object_opt("seasons")? {
        let entry = seasons
            .iter()
            .find(|(sport, _)| sport.eq_ignore_ascii_case(schedule.sport.trim()))
            .map(|(_, v)| v);
        if let Some(entry) = entry {
            return parse_window("seasons", entry, &schedule.season);
        }
    }

    if let Some(entry) = params.get("defaultSeason") {
        return parse_window("defaultSeason", entry, &schedule.season);
    }

    let year = season_start_year(&schedule.season).ok_or_else(|| {
        ValidatorError::MissingData(format!(
            "no season window configured and season '{}' has no start year",
            schedule.season
        ))
    })?;
    match (
        NaiveDate::from_ymd_opt(year, 8, 1),
        NaiveDate::from_ymd_opt(year + 1, 6, 30),
    ) {
        (Some(start), Some(end)) => Ok(SeasonWindow { start, end }),
        _ => Err(ValidatorError::Internal(format!(
            "season year {year} out of range"
        ))),
    }
}

fn parse_window(name: &str, entry: &Value, season: &str) -> Result<SeasonWindow, ValidatorError> {
    let bound = |key: &str| -> Result<NaiveDate, ValidatorError> {
        let raw = entry.get(key).and_then(Value::as_str).ok_or_else(|| {
            ValidatorError::invalid_parameter(name, format!("window is missing '{key}'"))
        })?;
        parse_bound(name, raw, season)
    };
    let window = SeasonWindow {
        start: bound("start")?,
        end: bound("end")?,
    };
    if window.end < window.start {
        return Err(ValidatorError::invalid_parameter(
            name,
            format!("window ends ({}) before it starts ({})", window.end, window.start),
        ));
    }
    Ok(window)
}

/// A full `YYYY-MM-DD` date, or an `MM-DD` day placed in the season's
/// first year (July onwards) or second year (before July).
fn parse_bound(name: &str, raw: &str, season: &str) -> Result<NaiveDate, ValidatorError> {
    let raw = raw.trim();
    if raw.len() != 5 {
        return parse_date(name, raw);
    }

    let year = season_start_year(season).ok_or_else(|| {
        ValidatorError::MissingData(format!(
            "month-day bound '{raw}' needs a season with a start year, got '{season}'"
        ))
    })?;
    let (month, day) = raw
        .split_once('-')
        .and_then(|(m, d)| Some((m.parse::<u32>().ok()?, d.parse::<u32>().ok()?)))
        .ok_or_else(|| ValidatorError::invalid_parameter(name, format!("bad month-day '{raw}'")))?;
    let year = if month >= SEASON_ROLLOVER_MONTH {
        year
    } else {
        year + 1
    };
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ValidatorError::invalid_parameter(name, format!("bad month-day '{raw}'")))
}

/// Leading four-digit year of a season label such as `2024-25`.
fn season_start_year(season: &str) -> Option<i32> {
    let digits: String = season.trim().chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// off_days
// ---------------------------------------------------------------------------

pub fn off_days(
    _ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let required = Params::of(rule).u64_or("daysOffPerWeek", DEFAULT_DAYS_OFF_PER_WEEK)?;

    // week start (Sunday) -> game days, game ids
    let mut weeks: BTreeMap<NaiveDate, (BTreeSet<NaiveDate>, BTreeSet<&str>)> = BTreeMap::new();
    for g in &schedule.games {
        let day = g.date();
        let week = week_start(day).ok_or_else(|| {
            ValidatorError::Internal(format!("Week start of {day} is out of range"))
        })?;
        let entry = weeks.entry(week).or_default();
        entry.0.insert(day);
        entry.1.insert(g.id.as_str());
    }

    let violations: Vec<ViolationDetail> = weeks
        .into_iter()
        .filter_map(|(week, (days, ids))| {
            let days_off = 7 - days.len() as u64;
            (days_off < required).then(|| {
                ViolationDetail::new(format!(
                    "Week of {week} has {days_off} day(s) off; {required} required"
                ))
                .with_games(ids)
                .with_fact("week_start", week.to_string())
                .with_fact("game_days", days.len())
                .with_fact("days_off", days_off)
                .with_fact("required", required)
            })
        })
        .collect();

    Ok(Outcome::from_violations(
        violations,
        format!("Every week has at least {required} day(s) off"),
        |n| format!("{n} week(s) without enough days off"),
    ))
}

/// Sunday on or before `day`, or `None` if that falls before `NaiveDate::MIN`.
fn week_start(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_signed(Duration::days(i64::from(day.weekday().num_days_from_sunday())))
}

// ---------------------------------------------------------------------------
// academic_calendar
// ---------------------------------------------------------------------------

/// Finals buffers around the institution's exam window.
///
/// The before, during and after checks are independent; a game can
/// trip more than one of them.
pub fn academic_calendar(
    ctx: &ValidatorContext,
    schedule: &Schedule,
    rule: &Rule,
) -> Result<Outcome, ValidatorError> {
    let params = Params::of(rule);
    let before_buffer = params.u64_opt("noGamesBeforeFinals")?;
    let during_ban = params.bool_or("noGamesDuringFinals", false)?;
    let after_buffer = params.u64_opt("noGamesAfterFinals")?;

    let Some(institution) = schedule.team.institution.as_deref() else {
        return Ok(Outcome::compliant(
            "Team has no institution; academic calendar not checked",
        ));
    };
    let Some(calendar) = ctx.calendars.for_institution(institution) else {
        return Ok(Outcome::compliant(format!(
            "No academic calendar available for {institution}"
        )));
    };
    if calendar.finals_end < calendar.finals_start {
        return Err(ValidatorError::MissingData(format!(
            "academic calendar for {institution} ends finals before they start"
        )));
    }

    let mut violations = Vec::new();
    for g in schedule.games_by_date() {
        let day = g.date();

        if let Some(buffer) = before_buffer {
            // Whole days strictly between the game and the first finals day.
            let days_before = (calendar.finals_start - day).num_days() - 1;
            if days_before >= 0 && (days_before as u64) < buffer {
                violations.push(
                    ViolationDetail::new(format!(
                        "Game scheduled {days_before} day(s) before finals; {buffer} required"
                    ))
                    .with_games([g.id.as_str()])
                    .with_fact("days_before_finals", days_before)
                    .with_fact("required", buffer),
                );
            }
        }

        if during_ban && day >= calendar.finals_start && day <= calendar.finals_end {
            violations.push(
                ViolationDetail::new(format!(
                    "Game scheduled during finals ({} to {})",
                    calendar.finals_start, calendar.finals_end
                ))
                .with_games([g.id.as_str()])
                .with_fact("game_date", day.to_string()),
            );
        }

        if let Some(buffer) = after_buffer {
            let days_after = (day - calendar.finals_end).num_days() - 1;
            if days_after >= 0 && (days_after as u64) < buffer {
                violations.push(
                    ViolationDetail::new(format!(
                        "Game scheduled {days_after} day(s) after finals; {buffer} required"
                    ))
                    .with_games([g.id.as_str()])
                    .with_fact("days_after_finals", days_after)
                    .with_fact("required", buffer),
                );
            }
        }
    }

    Ok(Outcome::from_violations(
        violations,
        format!(
            "No conflicts with {institution} finals ({} to {})",
            calendar.finals_start, calendar.finals_end
        ),
        |n| format!("{n} academic calendar conflict(s) with {institution} finals"),
    ))
}
