use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 50;
pub const MAX_PER_PAGE: u32 = 500;

/// A 1-based page request. Page 0 is treated as the first page.
///
/// `new` clamps `per_page` to `1..=MAX_PER_PAGE`. A deserialized page is not
/// clamped, so `offset` saturates instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(number: u32, per_page: u32) -> Self {
        Self {
            number,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page.max(1))
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number.max(1) - 1).saturating_mul(self.limit())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PER_PAGE)
    }
}

/// A paginated result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: Page,
}
