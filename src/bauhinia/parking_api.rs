// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Parking vacancy endpoints: government carpark feed under `/parking`,
//! on-street metered carparks under `/metered`.

use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use hkmove::postgres_tools::HkmovePostgresPool;
use hkmove::queries::{self, clamp_page};
use hkmove::{pivot, recommend};
use serde::Deserialize;
use std::sync::Arc;

fn parse_i64(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|value| value.parse::<i64>().ok())
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
pub struct CarparkListQuery {
    district: Option<String>,
    vehicle_type: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

#[actix_web::get("/metered/carparks")]
pub async fn metered_carparks(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<CarparkListQuery>,
) -> impl Responder {
    if query.vehicle_type.is_some() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "vehicle_type filter is not supported at carpark level yet"
        }));
    }

    let (limit, offset) = clamp_page(parse_i64(&query.limit), parse_i64(&query.offset));

    match queries::parking::metered_carparks(&pool, query.district.as_deref(), limit, offset).await
    {
        Ok(rows) => {
            let returned = rows.len();
            HttpResponse::Ok().json(serde_json::json!({
                "data": rows,
                "pagination": {
                    "limit": limit,
                    "offset": offset,
                    "returned": returned,
                }
            }))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct TrendQuery {
    district: Option<String>,
    vehicle_type: Option<String>,
}

/// Metered 5-minute vacancy trend over the trailing day, filtered in the
/// handler so one cached view read serves every filter combination.
#[actix_web::get("/metered/trends")]
pub async fn metered_trends(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<TrendQuery>,
) -> impl Responder {
    match queries::parking::metered_5min_trend(&pool).await {
        Ok(rows) => {
            let data: Vec<serde_json::Value> = rows
                .into_iter()
                .filter(|row| match query.district.as_deref() {
                    Some(district) => row.district.as_deref() == Some(district),
                    None => true,
                })
                .filter(|row| match query.vehicle_type.as_deref() {
                    Some(vehicle_type) => row.vehicle_type.as_deref() == Some(vehicle_type),
                    None => true,
                })
                .map(|row| {
                    serde_json::json!({
                        "time_bucket": row.time_bucket,
                        "hour_of_day": row.hour_of_day,
                        "district": row.district,
                        "vehicle_type": row.vehicle_type,
                        "total_spaces": row.total_spaces,
                        "vacant_spaces": row.vacant_count,
                        "vacancy_rate": row.vacancy_rate,
                    })
                })
                .collect();

            HttpResponse::Ok().json(serde_json::json!({
                "generated_at": Utc::now().to_rfc3339(),
                "window": "last_24h",
                "data": data,
            }))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct RecommendationQuery {
    district: Option<String>,
    limit: Option<String>,
}

#[actix_web::get("/metered/recommendations")]
pub async fn metered_recommendations(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<RecommendationQuery>,
) -> impl Responder {
    let limit = parse_i64(&query.limit)
        .filter(|value| *value > 0)
        .map(|value| value as usize)
        .unwrap_or(recommend::DEFAULT_LIMIT)
        .min(recommend::MAX_LIMIT);
    let hk_hour = hkmove::hk_hour_now();

    // generous oversample: the hour and district filters run app-side
    let fetch = (limit * 3).max(60) as i64;

    match queries::parking::metered_hourly_points(&pool, fetch).await {
        Ok(rows) => {
            let ranked =
                recommend::rank_for_hour(rows, hk_hour, query.district.as_deref(), limit);
            HttpResponse::Ok().json(serde_json::json!({
                "generated_at": Utc::now().to_rfc3339(),
                "hour_of_day_hk": hk_hour,
                "data": ranked,
            }))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/metered/districts/busiest")]
pub async fn metered_busiest_districts(
    pool: web::Data<Arc<HkmovePostgresPool>>,
) -> impl Responder {
    match queries::parking::busiest_districts_metered(&pool).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/parking/districts/busiest")]
pub async fn parking_busiest_districts(
    pool: web::Data<Arc<HkmovePostgresPool>>,
) -> impl Responder {
    match queries::parking::busiest_districts_parking(&pool).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct BusiestCarparksQuery {
    limit: Option<String>,
}

#[actix_web::get("/parking/carparks/busiest")]
pub async fn parking_busiest_carparks(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<BusiestCarparksQuery>,
) -> impl Responder {
    let limit = parse_i64(&query.limit)
        .filter(|value| *value > 0)
        .unwrap_or(10)
        .min(100);

    match queries::parking::busiest_carparks(&pool, limit).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/parking/trends")]
pub async fn parking_trends(pool: web::Data<Arc<HkmovePostgresPool>>) -> impl Responder {
    match queries::parking::parking_5min_trend(&pool).await {
        Ok(rows) => HttpResponse::Ok().json(serde_json::json!({
            "generated_at": Utc::now().to_rfc3339(),
            "window": "last_24h",
            "data": rows,
        })),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct HourlyPatternQuery {
    districts: Option<String>,
}

/// Hour-of-day vacancy pattern per district, as a 24-row wide pivot.
#[actix_web::get("/parking/hourly_pattern")]
pub async fn parking_hourly_pattern(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<HourlyPatternQuery>,
) -> impl Responder {
    let wanted = split_csv(&query.districts);

    match queries::parking::parking_hourly_pattern(&pool).await {
        Ok(rows) => {
            let table = pivot::pivot_hourly(rows.into_iter().filter_map(|row| {
                let district = row.district?;
                if !wanted.is_empty() && !wanted.contains(&district) {
                    return None;
                }
                Some((row.hour_of_day, district, row.avg_vacancy?))
            }));
            HttpResponse::Ok().json(table)
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/metered/hourly_pattern")]
pub async fn metered_hourly_pattern(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<HourlyPatternQuery>,
) -> impl Responder {
    let wanted = split_csv(&query.districts);

    match queries::parking::metered_hourly_pattern(&pool).await {
        Ok(rows) => {
            let table = pivot::pivot_hourly(rows.into_iter().filter_map(|row| {
                let district = row.district?;
                if !wanted.is_empty() && !wanted.contains(&district) {
                    return None;
                }
                Some((row.hour_of_day, district, row.avg_vacancy_rate?))
            }));
            HttpResponse::Ok().json(table)
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
