// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Public transport patronage endpoints.

use actix_web::{HttpResponse, Responder, web};
use hkmove::models::OperatorTrendRow;
use hkmove::pivot::{self, Accumulate};
use hkmove::postgres_tools::HkmovePostgresPool;
use hkmove::queries;
use serde::Deserialize;
use std::sync::Arc;

fn parse_i32(raw: &Option<String>) -> Option<i32> {
    raw.as_deref().and_then(|value| value.parse::<i32>().ok())
}

fn split_csv(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Operator plus rail line when present, e.g. "MTR / Island Line".
fn operator_label(row: &OperatorTrendRow) -> String {
    match (row.operator_code.as_deref(), row.rail_line.as_deref()) {
        (Some(operator), Some(line)) => format!("{operator} / {line}"),
        (Some(operator), None) => operator.to_string(),
        (None, Some(line)) => line.to_string(),
        (None, None) => String::from("Unknown"),
    }
}

#[derive(Deserialize)]
pub struct YearRangeQuery {
    start_year: Option<String>,
    end_year: Option<String>,
}

#[actix_web::get("/transport/mode_stack")]
pub async fn mode_stack(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<YearRangeQuery>,
) -> impl Responder {
    let result = queries::transport::monthly_modes(
        &pool,
        parse_i32(&query.start_year),
        parse_i32(&query.end_year),
    )
    .await;

    match result {
        Ok(rows) => {
            let table = pivot::pivot_monthly(
                rows.into_iter()
                    .map(|row| (row.year_month, row.mode, row.avg_daily_pax.unwrap_or(0.0))),
                Accumulate::Replace,
            );
            HttpResponse::Ok().json(table)
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/transport/latest")]
pub async fn latest(pool: web::Data<Arc<HkmovePostgresPool>>) -> impl Responder {
    match queries::transport::latest_modes(&pool).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/transport/annual")]
pub async fn annual(pool: web::Data<Arc<HkmovePostgresPool>>) -> impl Responder {
    match queries::transport::annual_ptp(&pool).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct OperatorListQuery {
    mode: Option<String>,
}

#[actix_web::get("/transport/operators")]
pub async fn operators(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<OperatorListQuery>,
) -> impl Responder {
    let Some(mode) = query.mode.as_deref() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "mode parameter is required"
        }));
    };

    match queries::transport::operator_codes(&pool, mode).await {
        Ok(codes) => HttpResponse::Ok().json(codes),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct OperatorTrendQuery {
    mode: Option<String>,
    operators: Option<String>,
    start_year: Option<String>,
    end_year: Option<String>,
}

/// Monthly pivot per operator label. Several rail lines of one operator
/// can share a label, so duplicate cells accumulate. The share table
/// normalizes each month against its column total.
#[actix_web::get("/transport/operator_trend")]
pub async fn operator_trend(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<OperatorTrendQuery>,
) -> impl Responder {
    let Some(mode) = query.mode.as_deref() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "mode parameter is required"
        }));
    };
    let wanted = split_csv(&query.operators);

    let result = queries::transport::operator_trend(
        &pool,
        mode,
        &wanted,
        parse_i32(&query.start_year),
        parse_i32(&query.end_year),
    )
    .await;

    match result {
        Ok(rows) => {
            let table = pivot::pivot_monthly(
                rows.iter().map(|row| {
                    (
                        row.year_month,
                        operator_label(row),
                        row.avg_daily_pax.unwrap_or(0.0),
                    )
                }),
                Accumulate::Sum,
            );
            let shares = pivot::share_rows(&table);
            HttpResponse::Ok().json(serde_json::json!({
                "keys": table.keys,
                "rows": table.rows,
                "shares": shares,
            }))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct RankingQuery {
    mode: Option<String>,
    year_month: Option<String>,
}

#[actix_web::get("/transport/ranking")]
pub async fn ranking(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<RankingQuery>,
) -> impl Responder {
    let Some(mode) = query.mode.as_deref() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "mode parameter is required"
        }));
    };
    let year_month = parse_i32(&query.year_month);

    match queries::transport::operator_latest_ranking(&pool, mode, year_month).await {
        Ok(rows) => {
            let ranked: Vec<serde_json::Value> = rows
                .iter()
                .map(|row| {
                    serde_json::json!({
                        "year_month": row.year_month,
                        "label": pivot::format_year_month(row.year_month),
                        "name": operator_label(row),
                        "avg_daily_pax": row.avg_daily_pax,
                    })
                })
                .collect();
            HttpResponse::Ok().json(ranked)
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend_row(operator: Option<&str>, line: Option<&str>) -> OperatorTrendRow {
        OperatorTrendRow {
            year_month: 202401,
            operator_code: operator.map(str::to_string),
            rail_line: line.map(str::to_string),
            avg_daily_pax: Some(1000.0),
        }
    }

    // the filter list is bound as a local next to the generated route
    // types for `operators`; the binding name must not shadow them
    #[test]
    fn operator_filter_splits_and_trims() {
        let raw = Some(String::from("MTR, KMB ,"));
        assert_eq!(split_csv(&raw), vec!["MTR", "KMB"]);
        assert!(split_csv(&None).is_empty());
    }

    #[test]
    fn operator_label_joins_operator_and_line() {
        assert_eq!(
            operator_label(&trend_row(Some("MTR"), Some("Island Line"))),
            "MTR / Island Line"
        );
        assert_eq!(operator_label(&trend_row(Some("KMB"), None)), "KMB");
        assert_eq!(operator_label(&trend_row(None, None)), "Unknown");
    }
}
