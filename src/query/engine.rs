// ============================================================================
// src/query/engine.rs - Composes filtering, sorting and pagination
// ============================================================================
//
// Order is fixed: filter, then sort, then paginate. `total` counts the
// filtered set, before the page slice is taken.
//
// ============================================================================

use super::criteria::{TaskSearchCriteria, filter_by_criteria};
use super::pagination::{PaginatedResult, PaginationOptions, build_paginated_result, paginate};
use super::sort::{SortOptions, sort_by};
use super::Queryable;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub criteria: TaskSearchCriteria,
    pub sort: Option<SortOptions>,
    pub pagination: PaginationOptions,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(mut self, criteria: TaskSearchCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn sorted(mut self, sort: SortOptions) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.pagination = PaginationOptions::new(page, limit);
        self
    }
}

/// Stateless; operates on whatever snapshot it is handed.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine;

impl QueryEngine {
    pub fn execute<T: Queryable>(&self, items: Vec<T>, query: &TaskQuery) -> PaginatedResult<T> {
        let mut matched = filter_by_criteria(items, &query.criteria);

        if let Some(sort) = &query.sort {
            sort_by(&mut matched, sort);
        }

        let total = matched.len() as u64;
        let page = query.pagination.page();
        let limit = query.pagination.limit();

        build_paginated_result(paginate(matched, page, limit), total, page, limit)
    }
}
