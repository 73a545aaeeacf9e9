//! Selects the rules that apply to a schedule.

use super::rules::{Rule, RuleEngineState, RuleSet, RuleTier, GOVERNING_BODY_NAME};
use super::schedule::Schedule;

/// A rule joined to the tier it was loaded from, for one validation run.
#[derive(Debug, Clone, Copy)]
pub struct RuleApplication<'a> {
    pub rule_id: &'a str,
    pub tier: RuleTier,
    pub tier_name: &'a str,
    pub rule: &'a Rule,
}

/// Applicable rules in report order: governing body, then the team's
/// conference, then its institution, each in rule-set insertion order.
pub fn applicable_rules<'a>(
    state: &'a RuleEngineState,
    schedule: &Schedule,
) -> Vec<RuleApplication<'a>> {
    let mut tiers: Vec<(RuleTier, &'a str, &'a RuleSet)> = vec![(
        RuleTier::GoverningBody,
        GOVERNING_BODY_NAME,
        &state.governing_body,
    )];

    if let Some((name, set)) = schedule
        .team
        .conference
        .as_deref()
        .and_then(|c| state.conferences.get_key_value(c))
    {
        tiers.push((RuleTier::Conference, name.as_str(), set));
    }

    if let Some((name, set)) = schedule
        .team
        .institution
        .as_deref()
        .and_then(|i| state.institutions.get_key_value(i))
    {
        tiers.push((RuleTier::Institution, name.as_str(), set));
    }

    let sport = schedule.sport.as_str();
    tiers
        .into_iter()
        .flat_map(move |(tier, tier_name, set)| {
            set.iter()
                .filter(move |rule| rule.applies_to(sport))
                .map(move |rule| RuleApplication {
                    rule_id: &rule.id,
                    tier,
                    tier_name,
                    rule,
                })
        })
        .collect()
}
