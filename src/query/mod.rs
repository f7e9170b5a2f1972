//! Stateless filter -> sort -> paginate pipeline over a snapshot of records.
//!
//! Everything here works on anything implementing [`Queryable`]: raw store
//! records as well as typed `Task` entities.

pub mod criteria;
pub mod engine;
pub mod pagination;
pub mod sort;

pub use criteria::{TaskSearchCriteria, filter_by_criteria};
pub use engine::{QueryEngine, TaskQuery};
pub use pagination::{
    DEFAULT_LIMIT, DEFAULT_PAGE, PaginatedResult, PaginationOptions, build_paginated_result,
    paginate,
};
pub use sort::{SortDirection, SortField, SortOptions, sort_by};

use crate::core::Record;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Field accessors the query pipeline needs.
pub trait Queryable {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn completed(&self) -> Option<bool>;
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

impl Queryable for Record {
    fn title(&self) -> &str {
        self.get("title").and_then(Value::as_str).unwrap_or("")
    }

    fn description(&self) -> &str {
        self.get("description").and_then(Value::as_str).unwrap_or("")
    }

    fn completed(&self) -> Option<bool> {
        self.get("completed").and_then(Value::as_bool)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get("createdAt").and_then(Value::as_str).and_then(parse_instant)
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.get("updatedAt").and_then(Value::as_str).and_then(parse_instant)
    }
}

/// Parses an ISO-8601 / RFC 3339 timestamp into a UTC instant.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}
