//! Partial-match predicate used by `JsonDatabase::select`.
//!
//! For every field in the filter:
//! - `null` filter values are wildcards
//! - a string filter value against a string field matches as a
//!   case-insensitive substring
//! - anything else must be exactly equal
//!
//! All fields must match (logical AND).

use crate::core::Record;
use serde_json::Value;

pub struct PartialMatch<'a> {
    filter: &'a Record,
}

impl<'a> PartialMatch<'a> {
    pub fn new(filter: &'a Record) -> Self {
        Self { filter }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filter
            .iter()
            .all(|(field, expected)| field_matches(record.get(field), expected))
    }
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> bool {
    match (expected, actual) {
        (Value::Null, _) => true,
        (Value::String(needle), Some(Value::String(haystack))) => contains_ignore_case(haystack, needle),
        (_, Some(actual)) => actual == expected,
        (_, None) => false,
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
