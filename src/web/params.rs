//! Lenient parsing of `GET /tasks` query parameters.
//!
//! Nothing here rejects a request: out-of-range or unparseable values fall
//! back to their defaults or are dropped.

use serde::Deserialize;

use crate::query::{
    DEFAULT_LIMIT, DEFAULT_PAGE, SortDirection, SortField, SortOptions, TaskQuery,
    TaskSearchCriteria, parse_instant,
};

const MAX_PAGE: u32 = 1000;
const MAX_LIMIT: u32 = 100;

/// Raw query string values, exactly as sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub completed: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
}

impl ListTasksQuery {
    pub fn into_task_query(self) -> TaskQuery {
        let page = number_in_range(self.page.as_deref(), 1, MAX_PAGE).unwrap_or(DEFAULT_PAGE);
        let limit = number_in_range(self.limit.as_deref(), 1, MAX_LIMIT).unwrap_or(DEFAULT_LIMIT);

        let mut criteria = TaskSearchCriteria::new().created_between(
            self.created_after.as_deref().and_then(|raw| parse_instant(raw.trim())),
            self.created_before.as_deref().and_then(|raw| parse_instant(raw.trim())),
        );
        if let Some(search) = non_blank(self.search.as_deref()) {
            criteria = criteria.with_search(search);
        }
        if let Some(completed) = self.completed.as_deref().and_then(parse_flag) {
            criteria = criteria.with_completed(completed);
        }

        let mut query = TaskQuery::new().with_criteria(criteria).page(page, limit);
        if let Some(field) = non_blank(self.sort.as_deref()) {
            let field: SortField = field.parse().unwrap_or(SortField::Unsupported);
            let direction = self
                .order
                .as_deref()
                .and_then(|raw| raw.trim().parse::<SortDirection>().ok())
                .unwrap_or_default();
            query = query.sorted(SortOptions::new(field, direction));
        }
        query
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

fn number_in_range(raw: Option<&str>, min: u32, max: u32) -> Option<u32> {
    raw?.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| (i64::from(min)..=i64::from(max)).contains(n))
        .and_then(|n| u32::try_from(n).ok())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> TaskQuery {
        let object: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        serde_json::from_value::<ListTasksQuery>(serde_json::Value::Object(object))
            .unwrap()
            .into_task_query()
    }

    #[test]
    fn defaults_when_absent() {
        let parsed = query(&[]);
        assert_eq!(parsed.pagination.page(), 1);
        assert_eq!(parsed.pagination.limit(), 10);
        assert!(parsed.criteria.is_empty());
        assert!(parsed.sort.is_none());
    }

    #[test]
    fn out_of_range_numbers_fall_back() {
        let parsed = query(&[("page", "0"), ("limit", "101")]);
        assert_eq!((parsed.pagination.page(), parsed.pagination.limit()), (1, 10));

        let parsed = query(&[("page", "-3"), ("limit", "abc")]);
        assert_eq!((parsed.pagination.page(), parsed.pagination.limit()), (1, 10));

        let parsed = query(&[("page", "1000"), ("limit", "100")]);
        assert_eq!((parsed.pagination.page(), parsed.pagination.limit()), (1000, 100));
    }

    #[test]
    fn completed_flag_spellings() {
        assert_eq!(query(&[("completed", "TRUE")]).criteria.completed, Some(true));
        assert_eq!(query(&[("completed", "0")]).criteria.completed, Some(false));
        assert_eq!(query(&[("completed", "yes")]).criteria.completed, None);
    }

    #[test]
    fn search_is_trimmed_and_blank_dropped() {
        assert_eq!(query(&[("search", "  milk ")]).criteria.search.as_deref(), Some("milk"));
        assert_eq!(query(&[("search", "   ")]).criteria.search, None);
    }

    #[test]
    fn sort_and_order() {
        let parsed = query(&[("sort", "title"), ("order", "DESC")]);
        assert_eq!(parsed.sort, Some(SortOptions::desc(SortField::Title)));

        let parsed = query(&[("sort", "priority"), ("order", "sideways")]);
        assert_eq!(parsed.sort, Some(SortOptions::asc(SortField::Unsupported)));

        assert!(query(&[("order", "desc")]).sort.is_none());
    }

    #[test]
    fn invalid_dates_are_ignored() {
        let parsed = query(&[
            ("createdAfter", "2024-01-01T00:00:00Z"),
            ("createdBefore", "yesterday"),
        ]);
        assert!(parsed.criteria.created_after.is_some());
        assert!(parsed.criteria.created_before.is_none());
    }
}
