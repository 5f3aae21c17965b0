// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Cross-boundary passenger traffic endpoints: daily headline series,
//! record days, and the monthly corridor breakdowns the stacked charts
//! consume.

use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use hkmove::pivot::{self, Accumulate};
use hkmove::postgres_tools::HkmovePostgresPool;
use hkmove::queries;
use serde::Deserialize;
use std::sync::Arc;

fn parse_i32(raw: &Option<String>) -> Option<i32> {
    raw.as_deref().and_then(|value| value.parse::<i32>().ok())
}

fn parse_date(raw: &Option<String>) -> Option<NaiveDate> {
    raw.as_deref()
        .and_then(|value| value.parse::<NaiveDate>().ok())
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

#[derive(Deserialize)]
pub struct HeadlineQuery {
    start: Option<String>,
    end: Option<String>,
}

#[actix_web::get("/boundary/headline")]
pub async fn headline(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<HeadlineQuery>,
) -> impl Responder {
    let start = parse_date(&query.start);
    let end = parse_date(&query.end);

    match queries::boundary::daily_headline(&pool, start, end).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct TopDaysQuery {
    limit: Option<String>,
}

#[actix_web::get("/boundary/top_days")]
pub async fn top_days(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<TopDaysQuery>,
) -> impl Responder {
    let limit = query
        .limit
        .as_deref()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(10)
        .min(100);

    match queries::boundary::top_days(&pool, limit).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct CorridorQuery {
    start_year: Option<String>,
    end_year: Option<String>,
    corridors: Option<String>,
}

/// Monthly passenger totals pivoted wide, one column per corridor.
#[actix_web::get("/boundary/corridor_stack")]
pub async fn corridor_stack(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<CorridorQuery>,
) -> impl Responder {
    let wanted = split_csv(&query.corridors);
    let result = queries::boundary::monthly_corridors(
        &pool,
        parse_i32(&query.start_year),
        parse_i32(&query.end_year),
        &wanted,
    )
    .await;

    match result {
        Ok(rows) => {
            let table = pivot::pivot_monthly(
                rows.into_iter().map(|row| {
                    (
                        row.year_month,
                        row.corridor,
                        row.total_passengers.unwrap_or(0) as f64,
                    )
                }),
                Accumulate::Replace,
            );
            HttpResponse::Ok().json(table)
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/boundary/residency_mix")]
pub async fn residency_mix(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<CorridorQuery>,
) -> impl Responder {
    let wanted = split_csv(&query.corridors);
    let result = queries::boundary::monthly_corridors(
        &pool,
        parse_i32(&query.start_year),
        parse_i32(&query.end_year),
        &wanted,
    )
    .await;

    match result {
        Ok(rows) => HttpResponse::Ok().json(pivot::residency_mix(&rows)),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct PatternQuery {
    corridors: Option<String>,
}

#[actix_web::get("/boundary/patterns")]
pub async fn patterns(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<PatternQuery>,
) -> impl Responder {
    let wanted = split_csv(&query.corridors);

    match queries::boundary::corridor_patterns(&pool, &wanted).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/boundary/corridors")]
pub async fn corridors(pool: web::Data<Arc<HkmovePostgresPool>>) -> impl Responder {
    match queries::boundary::corridor_names(&pool).await {
        Ok(names) => HttpResponse::Ok().json(names),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // split_csv results are bound as locals next to the generated route
    // types for `corridors`; the binding names must not shadow them
    #[test]
    fn corridor_filter_splits_and_trims() {
        let raw = Some(String::from("Lo Wu, Lok Ma Chau ,,"));
        assert_eq!(split_csv(&raw), vec!["Lo Wu", "Lok Ma Chau"]);
        assert!(split_csv(&None).is_empty());
        assert!(split_csv(&Some(String::from(" , "))).is_empty());
    }
}
