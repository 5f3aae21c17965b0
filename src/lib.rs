// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

#[macro_use]
extern crate serde;

pub mod gtfs_cache;
pub mod heatmap;
pub mod interpolate;
pub mod models;
pub mod pivot;
pub mod playback;
pub mod postgres_tools;
pub mod queries;
pub mod recommend;

use chrono::{DateTime, Timelike, Utc};

/// Fixed UTC+8 shift for the Hong Kong clock. The upstream feeds are all
/// HK-local and there is no DST, so a timezone database is deliberately
/// not involved.
pub const HK_UTC_OFFSET_HOURS: u32 = 8;

pub fn hk_hour_from(utc: DateTime<Utc>) -> u32 {
    (utc.hour() + HK_UTC_OFFSET_HOURS) % 24
}

/// Current hour-of-day on the Hong Kong clock, 0..=23.
pub fn hk_hour_now() -> u32 {
    hk_hour_from(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hk_hour_shifts_and_wraps() {
        let morning = Utc.with_ymd_and_hms(2025, 6, 1, 3, 15, 0).unwrap();
        assert_eq!(hk_hour_from(morning), 11);

        let late = Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap();
        assert_eq!(hk_hour_from(late), 4);
    }
}
