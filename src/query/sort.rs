// ============================================================================
// src/query/sort.rs - Field sorting for task listings
// ============================================================================
//
// - title is compared case-insensitively
// - createdAt / updatedAt are compared as instants (missing values first)
// - any other field is a no-op and leaves the input order untouched
//
// slice::sort_by is stable, and DESC reverses the comparator rather than the
// output, so items with equal keys keep their input order in both directions.
//
// ============================================================================

use super::Queryable;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    CreatedAt,
    UpdatedAt,
    /// Anything else, e.g. `priority` or `dueDate`. Sorting by it is a no-op.
    Unsupported,
}

impl FromStr for SortField {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "title" => Self::Title,
            "createdAt" => Self::CreatedAt,
            "updatedAt" => Self::UpdatedAt,
            _ => Self::Unsupported,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOptions {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

pub fn sort_by<T: Queryable>(items: &mut [T], options: &SortOptions) {
    let compare: fn(&T, &T) -> Ordering = match options.field {
        SortField::Title => |a: &T, b: &T| compare_ignore_case(a.title(), b.title()),
        SortField::CreatedAt => |a: &T, b: &T| a.created_at().cmp(&b.created_at()),
        SortField::UpdatedAt => |a: &T, b: &T| a.updated_at().cmp(&b.updated_at()),
        SortField::Unsupported => return,
    };

    match options.direction {
        SortDirection::Asc => items.sort_by(compare),
        SortDirection::Desc => items.sort_by(|a, b| compare(a, b).reverse()),
    }
}

fn compare_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}
