// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Read-side query functions. Each takes the shared pool, binds its
//! filters as parameters, and hands back typed rows; errors propagate
//! as `sqlx::Error` for the handlers to report.

pub mod boundary;
pub mod fleet;
pub mod gtfs;
pub mod parking;
pub mod transport;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Clamps listing pagination to the documented bounds: a missing or
/// non-positive limit falls back to the default of 50, anything above
/// 200 caps at 200, and offsets below zero floor at 0.
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .min(MAX_PAGE_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limits_clamp_to_documented_bounds() {
        assert_eq!(clamp_page(None, None), (50, 0));
        assert_eq!(clamp_page(Some(500), Some(-5)), (200, 0));
        assert_eq!(clamp_page(Some(120), Some(10)), (120, 10));
    }

    #[test]
    fn zero_and_negative_limits_fall_back_to_the_default() {
        assert_eq!(clamp_page(Some(0), Some(30)), (50, 30));
        assert_eq!(clamp_page(Some(-3), None), (50, 0));
    }
}
