// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Linear position interpolation along a vehicle's recorded track.

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PositionSample {
    pub ts: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub speed: Option<f64>,
}

/// Interpolated position at `target` along a track sorted ascending by
/// timestamp. Targets before the first or after the last sample clamp to
/// that boundary sample rather than extrapolating. Between samples the
/// latitude and longitude are lerped independently in degree space, which
/// is fine at the distances 24 hours of telemetry covers; speed carries
/// over from the earlier bracketing sample.
pub fn position_at(track: &[PositionSample], target: DateTime<Utc>) -> Option<PositionSample> {
    let first = track.first()?;
    let last = track.last()?;

    if target <= first.ts {
        return Some(*first);
    }
    if target >= last.ts {
        return Some(*last);
    }

    for pair in track.windows(2) {
        let (before, after) = (&pair[0], &pair[1]);
        if target < before.ts || target > after.ts {
            continue;
        }

        let span = (after.ts - before.ts).num_milliseconds();
        if span <= 0 {
            return Some(*before);
        }
        let progress = (target - before.ts).num_milliseconds() as f64 / span as f64;

        return Some(PositionSample {
            ts: target,
            lat: before.lat + (after.lat - before.lat) * progress,
            lon: before.lon + (after.lon - before.lon) * progress,
            speed: before.speed,
        });
    }

    None
}

/// Maps a playback hour (0..=24 over the trailing day) to the wall-clock
/// instant it represents.
pub fn playback_instant(now: DateTime<Utc>, hour: f64) -> DateTime<Utc> {
    now - Duration::hours(24) + Duration::seconds((hour * 3600.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64, lat: f64, lon: f64) -> PositionSample {
        PositionSample {
            ts: Utc.timestamp_opt(seconds, 0).unwrap(),
            lat,
            lon,
            speed: Some(30.0),
        }
    }

    #[test]
    fn midpoint_lerps_both_axes() {
        let track = vec![at(0, 22.30, 114.10), at(10, 22.40, 114.20)];
        let mid = position_at(&track, Utc.timestamp_opt(5, 0).unwrap()).unwrap();

        assert!((mid.lat - 22.35).abs() < 1e-12);
        assert!((mid.lon - 114.15).abs() < 1e-12);
        assert_eq!(mid.ts, Utc.timestamp_opt(5, 0).unwrap());
        assert_eq!(mid.speed, Some(30.0));
    }

    #[test]
    fn targets_outside_the_track_clamp_to_boundary_samples() {
        let track = vec![at(0, 22.30, 114.10), at(10, 22.40, 114.20)];

        let before = position_at(&track, Utc.timestamp_opt(-5, 0).unwrap()).unwrap();
        assert_eq!(before, track[0]);

        let after = position_at(&track, Utc.timestamp_opt(15, 0).unwrap()).unwrap();
        assert_eq!(after, track[1]);
    }

    #[test]
    fn empty_track_yields_nothing() {
        assert!(position_at(&[], Utc::now()).is_none());
    }

    #[test]
    fn playback_hour_zero_is_24h_ago_and_24_is_now() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(playback_instant(now, 0.0), now - Duration::hours(24));
        assert_eq!(playback_instant(now, 24.0), now);
        assert_eq!(
            playback_instant(now, 1.5),
            now - Duration::hours(24) + Duration::seconds(5400)
        );
    }
}
