//! Field validation.
//!
//! Request types run their rules through a [`Validator`], which collects every
//! failed rule instead of stopping at the first one. Failed fields yield a
//! placeholder value; callers must check [`Validator::finish`] before using them.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ApiError, ApiResult};
use crate::query::dates::parse_timestamp;

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.error(message);
        }
    }

    /// Trimmed value of a mandatory text field; records `missing` when absent or blank.
    pub fn required(&mut self, value: Option<String>, missing: &str) -> String {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.error(missing);
                String::new()
            }
        }
    }

    /// Records `message` unless `value` has between `min` and `max` characters.
    pub fn length(&mut self, value: &str, min: usize, max: usize, message: &str) {
        let len = value.chars().count();
        self.check((min..=max).contains(&len), message);
    }

    /// Mandatory text with length bounds.
    pub fn required_len(
        &mut self,
        value: Option<String>,
        missing: &str,
        (min, max): (usize, usize),
        message: &str,
    ) -> String {
        let value = self.required(value, missing);
        if !value.is_empty() {
            self.length(&value, min, max, message);
        }
        value
    }

    /// Optional text with length bounds; trimmed when present.
    pub fn optional_len(
        &mut self,
        value: Option<String>,
        (min, max): (usize, usize),
        message: &str,
    ) -> Option<String> {
        let value = value.map(|v| v.trim().to_string())?;
        self.length(&value, min, max, message);
        Some(value)
    }

    /// Optional text that must not be blank when present.
    pub fn optional_non_blank(&mut self, value: Option<String>, message: &str) -> Option<String> {
        let value = value.map(|v| v.trim().to_string())?;
        self.check(!value.is_empty(), message);
        Some(value)
    }

    /// Non-empty list of non-blank entries, each trimmed.
    pub fn list(&mut self, value: Option<Vec<String>>, list_msg: &str, item_msg: &str) -> Vec<String> {
        match value {
            Some(items) if !items.is_empty() => {
                let items: Vec<String> = items.iter().map(|i| i.trim().to_string()).collect();
                if items.iter().any(String::is_empty) {
                    self.error(item_msg);
                }
                items
            }
            _ => {
                self.error(list_msg);
                Vec::new()
            }
        }
    }

    pub fn present<T: Default>(&mut self, value: Option<T>, message: &str) -> T {
        match value {
            Some(v) => v,
            None => {
                self.error(message);
                T::default()
            }
        }
    }

    /// Trimmed ISO-8601 date; records `message` when it does not parse.
    pub fn iso_date(&mut self, value: &str, message: &str) {
        self.check(parse_timestamp(value).is_some(), message);
    }

    /// Parses an optional query-string integer constrained to `range`.
    pub fn query_int(
        &mut self,
        raw: Option<&str>,
        range: std::ops::RangeInclusive<i64>,
        message: &str,
    ) -> Option<i64> {
        let raw = raw?.trim();
        match raw.parse::<i64>() {
            Ok(n) if range.contains(&n) => Some(n),
            _ => {
                self.error(message);
                None
            }
        }
    }

    /// Parses an optional query-string number that must be non-negative.
    pub fn query_non_negative(&mut self, raw: Option<&str>, message: &str) -> Option<f64> {
        let raw = raw?.trim();
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
            _ => {
                self.error(message);
                None
            }
        }
    }

    pub fn finish(self) -> ApiResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

static ISBN_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:ISBN(?:-1[03])?:? )?(.*)$").expect("static regex"));
static ISBN_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:97[89][- ]?)?[0-9]{1,5}[- ]?[0-9]+[- ]?[0-9]+[- ]?[0-9X]$")
        .expect("static regex")
});
static THREE_GROUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+[- ]){3}").expect("static regex"));
static FOUR_GROUPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+[- ]){4}").expect("static regex"));

/// ISBN-10 or ISBN-13, bare or with hyphen/space separators and an optional
/// `ISBN`, `ISBN-10` or `ISBN-13` label.
pub fn is_valid_isbn(raw: &str) -> bool {
    let Some(body) = ISBN_PREFIX
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return false;
    };

    let only = |allowed: &str| body.chars().all(|c| allowed.contains(c));
    let len = body.chars().count();

    let plain_isbn10 = len == 10 && only("0123456789X");
    let separated_isbn10 = len == 13 && only("- 0123456789X") && THREE_GROUPS.is_match(body);
    let plain_isbn13 = len == 13
        && (body.starts_with("978") || body.starts_with("979"))
        && only("0123456789");
    let separated_isbn13 = len == 17 && only("- 0123456789") && FOUR_GROUPS.is_match(body);

    (plain_isbn10 || separated_isbn10 || plain_isbn13 || separated_isbn13)
        && ISBN_SHAPE.is_match(body)
}
