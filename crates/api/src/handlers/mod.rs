pub mod ads;
pub mod checklist;
pub mod customer;
pub mod metrics;
pub mod notification;
pub mod progress;

/// Maximum page size for list endpoints.
pub(crate) const MAX_LIMIT: i64 = 100;

/// Default page size for list endpoints.
pub(crate) const DEFAULT_LIMIT: i64 = 50;

/// Clamp optional `limit` / `offset` query values.
pub(crate) fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_are_clamped() {
        assert_eq!(page_bounds(None, None), (DEFAULT_LIMIT, 0));
        assert_eq!(page_bounds(Some(1000), Some(-5)), (MAX_LIMIT, 0));
        assert_eq!(page_bounds(Some(0), Some(20)), (1, 20));
    }
}
