use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// 1-indexed page selection. Missing values fall back to the defaults and
/// zero is clamped to 1, so a page never divides by zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PaginationOptions {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).max(1)
    }
}

/// The `{ items, total, page, limit, totalPages }` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Returns the `page`-th slice of `limit` items. A page past the end is
/// empty, not an error.
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Vec<T> {
    let page = page.max(1) as usize;
    let limit = limit.max(1) as usize;
    let start = (page - 1).saturating_mul(limit);

    items.into_iter().skip(start).take(limit).collect()
}

pub fn build_paginated_result<T>(items: Vec<T>, total: u64, page: u32, limit: u32) -> PaginatedResult<T> {
    let limit = limit.max(1);
    let total_pages = total.div_ceil(u64::from(limit));

    PaginatedResult {
        items,
        total,
        page: page.max(1),
        limit,
        total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let options = PaginationOptions::default();
        assert_eq!((options.page(), options.limit()), (DEFAULT_PAGE, DEFAULT_LIMIT));

        let zeroes = PaginationOptions::new(0, 0);
        assert_eq!((zeroes.page(), zeroes.limit()), (1, 1));
    }

    #[test]
    fn slices_pages() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(items.clone(), 1, 10), (1..=10).collect::<Vec<_>>());
        assert_eq!(paginate(items.clone(), 3, 10), vec![21, 22, 23, 24, 25]);
        assert!(paginate(items.clone(), 4, 10).is_empty());
        assert!(paginate(items, u32::MAX, u32::MAX).is_empty());
    }

    #[test]
    fn zero_limit_is_clamped_to_one() {
        assert_eq!(paginate(vec!['a', 'b', 'c'], 2, 0), vec!['b']);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(build_paginated_result(Vec::<u8>::new(), 25, 1, 10).total_pages, 3);
        assert_eq!(build_paginated_result(Vec::<u8>::new(), 20, 1, 10).total_pages, 2);
        assert_eq!(build_paginated_result(Vec::<u8>::new(), 0, 1, 10).total_pages, 0);
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let result = build_paginated_result(vec![1], 1, 1, 10);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"items": [1], "total": 1, "page": 1, "limit": 10, "totalPages": 1})
        );
    }
}
