use super::Queryable;
use crate::storage::filter::contains_ignore_case;
use chrono::{DateTime, Utc};

/// Optional predicates for task listing; every supplied one must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSearchCriteria {
    pub completed: Option<bool>,
    /// Case-insensitive substring over title OR description.
    pub search: Option<String>,
    /// Inclusive lower bound on `createdAt`.
    pub created_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `createdAt`.
    pub created_before: Option<DateTime<Utc>>,
}

impl TaskSearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn created_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_after = after;
        self.created_before = before;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_none()
            && self.search_term().is_none()
            && self.created_after.is_none()
            && self.created_before.is_none()
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|term| !term.is_empty())
    }

    pub fn matches<T: Queryable>(&self, item: &T) -> bool {
        if let Some(completed) = self.completed
            && item.completed() != Some(completed)
        {
            return false;
        }

        if let Some(term) = self.search_term()
            && !contains_ignore_case(item.title(), term)
            && !contains_ignore_case(item.description(), term)
        {
            return false;
        }

        if self.created_after.is_some() || self.created_before.is_some() {
            let Some(created_at) = item.created_at() else {
                return false;
            };
            if self.created_after.is_some_and(|after| created_at < after) {
                return false;
            }
            if self.created_before.is_some_and(|before| created_at > before) {
                return false;
            }
        }

        true
    }
}

pub fn filter_by_criteria<T: Queryable>(mut items: Vec<T>, criteria: &TaskSearchCriteria) -> Vec<T> {
    if !criteria.is_empty() {
        items.retain(|item| criteria.matches(item));
    }
    items
}
