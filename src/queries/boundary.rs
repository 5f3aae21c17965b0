// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Cross-boundary passenger traffic reads over the immigration
//! control-point aggregation views.

use crate::models::{DailyHeadline, MonthlyCorridorRow, PatternCorridorRow, TopDayRow};
use crate::postgres_tools::HkmovePostgresPool;
use chrono::NaiveDate;

pub async fn daily_headline(
    pool: &HkmovePostgresPool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<DailyHeadline>, sqlx::Error> {
    sqlx::query_as::<_, DailyHeadline>(
        "SELECT date, total_passengers, rolling_7d_avg
         FROM agg_daily_headline
         WHERE ($1::date IS NULL OR date >= $1)
           AND ($2::date IS NULL OR date <= $2)
         ORDER BY date ASC",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn top_days(pool: &HkmovePostgresPool, limit: i64) -> Result<Vec<TopDayRow>, sqlx::Error> {
    sqlx::query_as::<_, TopDayRow>(
        "SELECT date, total_passengers, top_control_point_id, top_control_point_name,
                top_control_point_share, holiday_period
         FROM agg_daily_headline
         ORDER BY total_passengers DESC
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Monthly corridor rows between the optional year bounds. `year_month`
/// is `year * 100 + month`, so a year bound covers `y*100+1 ..= y*100+12`.
pub async fn monthly_corridors(
    pool: &HkmovePostgresPool,
    start_year: Option<i32>,
    end_year: Option<i32>,
    corridors: &[String],
) -> Result<Vec<MonthlyCorridorRow>, sqlx::Error> {
    sqlx::query_as::<_, MonthlyCorridorRow>(
        "SELECT year_month, corridor, total_passengers, total_arrivals, total_departures,
                hk_residents, mainland_visitors, other_visitors,
                hk_share, mainland_share, visitor_share, yoy_growth
         FROM agg_monthly_corridor
         WHERE ($1::int IS NULL OR year_month >= $1 * 100 + 1)
           AND ($2::int IS NULL OR year_month <= $2 * 100 + 12)
           AND (cardinality($3::text[]) = 0 OR corridor = ANY($3))
         ORDER BY year_month ASC, corridor ASC",
    )
    .bind(start_year)
    .bind(end_year)
    .bind(corridors)
    .fetch_all(pool)
    .await
}

pub async fn corridor_patterns(
    pool: &HkmovePostgresPool,
    corridors: &[String],
) -> Result<Vec<PatternCorridorRow>, sqlx::Error> {
    sqlx::query_as::<_, PatternCorridorRow>(
        "SELECT corridor, pattern_type, avg_passengers, weekend_index, holiday_uplift,
                hk_share, mainland_share, other_share
         FROM agg_pattern_corridor
         WHERE cardinality($1::text[]) = 0 OR corridor = ANY($1)
         ORDER BY corridor ASC, pattern_type ASC",
    )
    .bind(corridors)
    .fetch_all(pool)
    .await
}

pub async fn corridor_names(pool: &HkmovePostgresPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT corridor FROM dim_control_point ORDER BY corridor ASC",
    )
    .fetch_all(pool)
    .await
}
