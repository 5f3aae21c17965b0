// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Vehicle telemetry reads over the trailing-day materialized views.

use crate::models::{DwellEvent, DwellHotspot, HourlyActivityRow, MovementSample, VehicleStateSummary};
use crate::postgres_tools::HkmovePostgresPool;

pub async fn state_summary(
    pool: &HkmovePostgresPool,
) -> Result<Vec<VehicleStateSummary>, sqlx::Error> {
    sqlx::query_as::<_, VehicleStateSummary>(
        "SELECT state, count(*) AS count, sum(duration_sec) AS total_duration_sec
         FROM vehicle_state_segments_mv
         GROUP BY state
         ORDER BY total_duration_sec DESC",
    )
    .fetch_all(pool)
    .await
}

pub async fn dwell_events(
    pool: &HkmovePostgresPool,
    limit: i64,
) -> Result<Vec<DwellEvent>, sqlx::Error> {
    sqlx::query_as::<_, DwellEvent>(
        "SELECT vin, district, lat, lon, start_ts, end_ts, duration_sec, radius_m
         FROM vehicle_dwell_events_mv
         ORDER BY start_ts DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn dwell_hotspots(
    pool: &HkmovePostgresPool,
    limit: i64,
) -> Result<Vec<DwellHotspot>, sqlx::Error> {
    sqlx::query_as::<_, DwellHotspot>(
        "SELECT district, events, dwell_minutes
         FROM vehicle_dwell_districts_mv
         ORDER BY dwell_minutes DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn hourly_activity(
    pool: &HkmovePostgresPool,
) -> Result<Vec<HourlyActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, HourlyActivityRow>(
        "SELECT vin, hour, duration_min
         FROM vehicle_hourly_activity_mv
         ORDER BY vin ASC, hour ASC",
    )
    .fetch_all(pool)
    .await
}

/// Trailing-day position samples, ordered for direct interpolation:
/// within a vin the samples are ascending by timestamp.
pub async fn movement_samples(
    pool: &HkmovePostgresPool,
) -> Result<Vec<MovementSample>, sqlx::Error> {
    sqlx::query_as::<_, MovementSample>(
        "SELECT vin, ts, lat, lon, speed
         FROM vehicle_movements_24h_mv
         ORDER BY vin ASC, ts ASC",
    )
    .fetch_all(pool)
    .await
}
