// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Public transport patronage reads.

use crate::models::{AnnualPtpRow, LatestModeRow, MonthlyModeRow, OperatorTrendRow};
use crate::postgres_tools::HkmovePostgresPool;

pub async fn monthly_modes(
    pool: &HkmovePostgresPool,
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<Vec<MonthlyModeRow>, sqlx::Error> {
    sqlx::query_as::<_, MonthlyModeRow>(
        "SELECT year_month, mode, avg_daily_pax
         FROM agg_monthly_transport_mode
         WHERE ($1::int IS NULL OR year_month >= $1 * 100 + 1)
           AND ($2::int IS NULL OR year_month <= $2 * 100 + 12)
         ORDER BY year_month ASC, mode ASC",
    )
    .bind(start_year)
    .bind(end_year)
    .fetch_all(pool)
    .await
}

pub async fn latest_modes(pool: &HkmovePostgresPool) -> Result<Vec<LatestModeRow>, sqlx::Error> {
    sqlx::query_as::<_, LatestModeRow>(
        "SELECT year_month, mode, operator_code, rail_line, avg_daily_pax
         FROM agg_latest_transport_mode
         ORDER BY avg_daily_pax DESC NULLS LAST",
    )
    .fetch_all(pool)
    .await
}

pub async fn annual_ptp(pool: &HkmovePostgresPool) -> Result<Vec<AnnualPtpRow>, sqlx::Error> {
    sqlx::query_as::<_, AnnualPtpRow>(
        "SELECT year, avg_daily_ptp, yoy_growth
         FROM agg_annual_ptp
         ORDER BY year ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn operator_codes(
    pool: &HkmovePostgresPool,
    mode: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT operator_code
         FROM fact_monthly_transport
         WHERE mode = $1 AND operator_code IS NOT NULL
         ORDER BY operator_code ASC",
    )
    .bind(mode)
    .fetch_all(pool)
    .await
}

pub async fn operator_trend(
    pool: &HkmovePostgresPool,
    mode: &str,
    operators: &[String],
    start_year: Option<i32>,
    end_year: Option<i32>,
) -> Result<Vec<OperatorTrendRow>, sqlx::Error> {
    sqlx::query_as::<_, OperatorTrendRow>(
        "SELECT year_month, operator_code, rail_line, avg_daily_pax
         FROM fact_monthly_transport
         WHERE mode = $1
           AND (cardinality($2::text[]) = 0 OR operator_code = ANY($2))
           AND ($3::int IS NULL OR year_month >= $3 * 100 + 1)
           AND ($4::int IS NULL OR year_month <= $4 * 100 + 12)
         ORDER BY year_month ASC, operator_code ASC",
    )
    .bind(mode)
    .bind(operators)
    .bind(start_year)
    .bind(end_year)
    .fetch_all(pool)
    .await
}

/// Ranking snapshot for one mode: the requested month, or the latest
/// month present for that mode when none is given.
pub async fn operator_latest_ranking(
    pool: &HkmovePostgresPool,
    mode: &str,
    year_month: Option<i32>,
) -> Result<Vec<OperatorTrendRow>, sqlx::Error> {
    sqlx::query_as::<_, OperatorTrendRow>(
        "SELECT year_month, operator_code, rail_line, avg_daily_pax
         FROM fact_monthly_transport
         WHERE mode = $1
           AND year_month = COALESCE(
                 $2,
                 (SELECT max(year_month) FROM fact_monthly_transport WHERE mode = $1))
         ORDER BY avg_daily_pax DESC NULLS LAST",
    )
    .bind(mode)
    .bind(year_month)
    .fetch_all(pool)
    .await
}
