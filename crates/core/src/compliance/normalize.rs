//! Turn raw rule documents of varying shape into canonical [`Rule`]s.
//!
//! Accepted document shapes:
//! - `{"rules": [ {...}, ... ]}`
//! - a bare array of rule objects
//! - an object keyed by rule id: `{"rule_id": {...}, ...}`
//!
//! A `rules` key that is not an array is rejected rather than read as a
//! keyed rule. Entries that are not objects or have no id are skipped with
//! a warning.

use serde_json::{Map, Value};

use crate::error::NormalizeError;

use super::rules::{Rule, RuleCategory, ALL_SPORTS};

const SPORTS_KEYS: [&str; 3] = ["sports", "applicableSports", "applicable_sports"];

/// Normalize a whole rule document.
pub fn normalize_document(document: &Value) -> Result<Vec<Rule>, NormalizeError> {
    match document {
        Value::Array(items) => Ok(normalize_list(items)),
        Value::Object(map) => match map.get("rules") {
            Some(Value::Array(items)) => Ok(normalize_list(items)),
            Some(other) => Err(NormalizeError::UnsupportedShape(json_type(other))),
            None => Ok(normalize_keyed(map)),
        },
        other => Err(NormalizeError::UnsupportedShape(json_type(other))),
    }
}

/// Normalize one raw rule object. `fallback_id` is used when the object
/// carries no `id` of its own.
pub fn normalize_rule(raw: &Value, fallback_id: Option<&str>) -> Option<Rule> {
    let Some(obj) = raw.as_object() else {
        tracing::warn!(
            rule_id = fallback_id.unwrap_or("<unknown>"),
            kind = json_type(raw),
            "Skipping rule entry that is not an object",
        );
        return None;
    };

    let id = str_field(obj, &["id"])
        .or(fallback_id)
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let Some(id) = id else {
        tracing::warn!("Skipping rule entry without an id");
        return None;
    };

    let title = str_field(obj, &["title", "name"]).unwrap_or(id);
    let category = str_field(obj, &["category", "type"]).unwrap_or_default();

    Some(Rule {
        id: id.to_string(),
        title: title.to_string(),
        description: str_field(obj, &["description"]).unwrap_or_default().to_string(),
        category: RuleCategory::parse(category),
        applicable_sports: sports(obj),
        parameters: parameters(obj),
    })
}

fn normalize_list(items: &[Value]) -> Vec<Rule> {
    items
        .iter()
        .filter_map(|item| normalize_rule(item, None))
        .collect()
}

fn normalize_keyed(map: &Map<String, Value>) -> Vec<Rule> {
    map.iter()
        .filter_map(|(key, item)| normalize_rule(item, Some(key)))
        .collect()
}

fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_str))
}

fn sports(obj: &Map<String, Value>) -> Vec<String> {
    let raw = SPORTS_KEYS
        .iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()));
    match raw {
        None => vec![ALL_SPORTS.to_string()],
        Some(Value::String(s)) => vec![s.trim().to_string()],
        Some(Value::Array(items)) => {
            let mut sports: Vec<String> = Vec::with_capacity(items.len());
            for s in items.iter().filter_map(Value::as_str).map(str::trim) {
                if !sports.iter().any(|existing| existing.eq_ignore_ascii_case(s)) {
                    sports.push(s.to_string());
                }
            }
            sports
        }
        Some(other) => {
            tracing::warn!(kind = json_type(other), "Ignoring non-list sports field");
            Vec::new()
        }
    }
}

fn parameters(obj: &Map<String, Value>) -> Map<String, Value> {
    ["parameters", "params"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_object))
        .cloned()
        .unwrap_or_default()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
