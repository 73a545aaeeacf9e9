//! Typed access to a rule's free-form `parameters` map.
//!
//! A parameter that is absent falls back to the caller's default; a
//! parameter that is present with the wrong JSON type is a
//! [`ValidatorError::InvalidParameter`].

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::ValidatorError;

use super::rules::Rule;

pub struct Params<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Params<'a> {
    pub fn of(rule: &'a Rule) -> Self {
        Self {
            map: &rule.parameters,
        }
    }

    /// The raw value, treating JSON `null` as absent.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    pub fn u64_opt(&self, name: &str) -> Result<Option<u64>, ValidatorError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .or_else(|| v.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
                .map(Some)
                .ok_or_else(|| {
                    ValidatorError::invalid_parameter(name, "expected a non-negative integer")
                }),
        }
    }

    pub fn u64_or(&self, name: &str, default: u64) -> Result<u64, ValidatorError> {
        Ok(self.u64_opt(name)?.unwrap_or(default))
    }

    pub fn f64_opt(&self, name: &str) -> Result<Option<f64>, ValidatorError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| ValidatorError::invalid_parameter(name, "expected a number")),
        }
    }

    pub fn f64_or(&self, name: &str, default: f64) -> Result<f64, ValidatorError> {
        Ok(self.f64_opt(name)?.unwrap_or(default))
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, ValidatorError> {
        match self.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_bool()
                .ok_or_else(|| ValidatorError::invalid_parameter(name, "expected a boolean")),
        }
    }

    /// A list of strings. A single string is accepted as a one-item list.
    pub fn string_list(&self, name: &str) -> Result<Vec<String>, ValidatorError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ValidatorError::invalid_parameter(name, "expected a list of strings")
                    })
                })
                .collect(),
            Some(_) => Err(ValidatorError::invalid_parameter(
                name,
                "expected a list of strings",
            )),
        }
    }

    pub fn object_opt(&self, name: &str) -> Result<Option<&'a Map<String, Value>>, ValidatorError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_object()
                .map(Some)
                .ok_or_else(|| ValidatorError::invalid_parameter(name, "expected an object")),
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date held in parameter `name`.
pub fn parse_date(name: &str, raw: &str) -> Result<NaiveDate, ValidatorError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ValidatorError::invalid_parameter(name, format!("bad date '{raw}': {e}")))
}
