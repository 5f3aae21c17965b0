// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Parking vacancy reads: the government carpark feed ("parking") and the
//! on-street metered carpark feed ("metered").

use crate::models::{
    BusiestCarparkRow, BusiestDistrictMeteredRow, BusiestDistrictParkingRow, CarparkHourlyPoint,
    Metered5MinRow, MeteredCarparkInfo, MeteredHourlyPoint, MeteredHourlyRow, Parking5MinRow,
    ParkingHourlyRow,
};
use crate::postgres_tools::HkmovePostgresPool;

pub async fn metered_carparks(
    pool: &HkmovePostgresPool,
    district: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<MeteredCarparkInfo>, sqlx::Error> {
    sqlx::query_as::<_, MeteredCarparkInfo>(
        "SELECT carpark_id, name, district, latitude, longitude, total_spaces
         FROM metered_carpark_info
         WHERE ($1::text IS NULL OR district = $1)
         ORDER BY carpark_id ASC
         LIMIT $2 OFFSET $3",
    )
    .bind(district)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn parking_5min_trend(
    pool: &HkmovePostgresPool,
) -> Result<Vec<Parking5MinRow>, sqlx::Error> {
    sqlx::query_as::<_, Parking5MinRow>(
        "SELECT time_bucket, district, avg_vacancy
         FROM agg_parking_5min_trend
         ORDER BY time_bucket ASC, district ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn parking_hourly_pattern(
    pool: &HkmovePostgresPool,
) -> Result<Vec<ParkingHourlyRow>, sqlx::Error> {
    sqlx::query_as::<_, ParkingHourlyRow>(
        "SELECT hour_of_day, district, avg_vacancy
         FROM agg_parking_hourly_pattern
         ORDER BY hour_of_day ASC, district ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn metered_5min_trend(
    pool: &HkmovePostgresPool,
) -> Result<Vec<Metered5MinRow>, sqlx::Error> {
    sqlx::query_as::<_, Metered5MinRow>(
        "SELECT time_bucket, hour_of_day, district, vehicle_type,
                total_spaces, vacant_count, vacancy_rate
         FROM agg_metered_5min_trend
         ORDER BY time_bucket ASC, district ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn metered_hourly_pattern(
    pool: &HkmovePostgresPool,
) -> Result<Vec<MeteredHourlyRow>, sqlx::Error> {
    sqlx::query_as::<_, MeteredHourlyRow>(
        "SELECT hour_of_day, district, avg_vacancy_rate
         FROM agg_metered_hourly_pattern
         ORDER BY hour_of_day ASC, district ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn busiest_districts_parking(
    pool: &HkmovePostgresPool,
) -> Result<Vec<BusiestDistrictParkingRow>, sqlx::Error> {
    sqlx::query_as::<_, BusiestDistrictParkingRow>(
        "SELECT district, avg_vacancy, min_vacancy, max_vacancy, stddev_vacancy
         FROM agg_busiest_districts_parking
         ORDER BY stddev_vacancy DESC NULLS LAST",
    )
    .fetch_all(pool)
    .await
}

pub async fn busiest_districts_metered(
    pool: &HkmovePostgresPool,
) -> Result<Vec<BusiestDistrictMeteredRow>, sqlx::Error> {
    sqlx::query_as::<_, BusiestDistrictMeteredRow>(
        "SELECT district, avg_vacancy_rate, min_vacancy_rate, max_vacancy_rate,
                stddev_vacancy_rate
         FROM agg_busiest_districts_metered
         ORDER BY stddev_vacancy_rate DESC NULLS LAST",
    )
    .fetch_all(pool)
    .await
}

pub async fn busiest_carparks(
    pool: &HkmovePostgresPool,
    limit: i64,
) -> Result<Vec<BusiestCarparkRow>, sqlx::Error> {
    sqlx::query_as::<_, BusiestCarparkRow>(
        "SELECT park_id, park_name, district, avg_vacancy, min_vacancy, max_vacancy,
                stddev_vacancy
         FROM agg_busiest_carparks
         ORDER BY stddev_vacancy DESC NULLS LAST
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Per-carpark hourly records with coordinates, for the heat layer.
pub async fn carpark_hourly_points(
    pool: &HkmovePostgresPool,
    limit: i64,
) -> Result<Vec<CarparkHourlyPoint>, sqlx::Error> {
    sqlx::query_as::<_, CarparkHourlyPoint>(
        "SELECT park_id, park_name, district, lat, lon, hour,
                avg_vacancy, stddev_vacancy, min_vacancy, max_vacancy,
                sample_count, occupancy_rate
         FROM carpark_hourly_mv
         WHERE park_id IN (
             SELECT park_id FROM carpark_hourly_mv
             GROUP BY park_id
             ORDER BY max(stddev_vacancy) DESC NULLS LAST
             LIMIT $1)
         ORDER BY park_id ASC, hour ASC",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn metered_hourly_points(
    pool: &HkmovePostgresPool,
    limit: i64,
) -> Result<Vec<MeteredHourlyPoint>, sqlx::Error> {
    sqlx::query_as::<_, MeteredHourlyPoint>(
        "SELECT carpark_id, carpark_name, district, lat, lon, hour,
                avg_vacancy_rate, stddev_vacancy_rate, min_vacancy_rate,
                max_vacancy_rate, sample_count, occupancy_rate
         FROM metered_carpark_hourly_mv
         WHERE carpark_id IN (
             SELECT carpark_id FROM metered_carpark_hourly_mv
             GROUP BY carpark_id
             ORDER BY max(stddev_vacancy_rate) DESC NULLS LAST
             LIMIT $1)
         ORDER BY carpark_id ASC, hour ASC",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
