//! Page/limit pagination helpers.
//!
//! Listing endpoints take 1-based `page` and `limit` query parameters; the
//! repository layer works with SQL `LIMIT`/`OFFSET`.

/// Default page size when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 10;

/// Upper bound on page size.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a requested page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// SQL `OFFSET` for a 1-based page.
pub fn offset_for(page: i64, limit: i64) -> i64 {
    (page - 1).saturating_mul(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_page(None), 1);
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
        assert_eq!(clamp_page(Some(-3)), 1);
    }

    #[test]
    fn offset_from_page() {
        assert_eq!(offset_for(1, 10), 0);
        assert_eq!(offset_for(3, 25), 50);
    }
}
