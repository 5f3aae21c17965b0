// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Fleet telemetry endpoints over the trailing-day views, including the
//! interpolated position frames the replay map scrubs through.

use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use hkmove::heatmap::{self, HeatMetric, HeatSource};
use hkmove::interpolate::{self, PositionSample};
use hkmove::postgres_tools::HkmovePostgresPool;
use hkmove::queries;
use itertools::Itertools;
use serde::Deserialize;
use std::sync::Arc;

fn parse_i64(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|value| value.parse::<i64>().ok())
}

fn parse_f64(raw: &Option<String>) -> Option<f64> {
    raw.as_deref().and_then(|value| value.parse::<f64>().ok())
}

#[actix_web::get("/fleet/summary")]
pub async fn summary(pool: web::Data<Arc<HkmovePostgresPool>>) -> impl Responder {
    match queries::fleet::state_summary(&pool).await {
        Ok(rows) => {
            let total_hours: f64 = rows.iter().map(|row| row.total_duration_sec).sum::<f64>()
                / 3600.0;
            HttpResponse::Ok().json(serde_json::json!({
                "states": rows,
                "total_hours": total_hours,
            }))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct LimitQuery {
    limit: Option<String>,
}

#[actix_web::get("/fleet/dwells")]
pub async fn dwells(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<LimitQuery>,
) -> impl Responder {
    let limit = parse_i64(&query.limit)
        .filter(|value| *value > 0)
        .unwrap_or(100)
        .min(500);

    match queries::fleet::dwell_events(&pool, limit).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/fleet/hotspots")]
pub async fn hotspots(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<LimitQuery>,
) -> impl Responder {
    let limit = parse_i64(&query.limit)
        .filter(|value| *value > 0)
        .unwrap_or(10)
        .min(100);

    match queries::fleet::dwell_hotspots(&pool, limit).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/fleet/activity")]
pub async fn activity(pool: web::Data<Arc<HkmovePostgresPool>>) -> impl Responder {
    match queries::fleet::hourly_activity(&pool).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct PositionsQuery {
    hour: Option<String>,
}

/// Interpolated position of every vehicle at a playback hour over the
/// trailing 24 h window ending now. Hour 24 (the default) is "now".
#[actix_web::get("/fleet/positions")]
pub async fn positions(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<PositionsQuery>,
) -> impl Responder {
    let hour = parse_f64(&query.hour).unwrap_or(24.0).clamp(0.0, 24.0);
    let now = Utc::now();
    let target = interpolate::playback_instant(now, hour);

    match queries::fleet::movement_samples(&pool).await {
        Ok(samples) => {
            let frames: Vec<serde_json::Value> = samples
                .into_iter()
                .chunk_by(|sample| sample.vin.clone())
                .into_iter()
                .filter_map(|(vin, group)| {
                    let track: Vec<PositionSample> = group
                        .map(|sample| PositionSample {
                            ts: sample.ts,
                            lat: sample.lat,
                            lon: sample.lon,
                            speed: sample.speed,
                        })
                        .collect();
                    let at = interpolate::position_at(&track, target)?;
                    Some(serde_json::json!({
                        "vin": vin,
                        "ts": at.ts,
                        "lat": at.lat,
                        "lon": at.lon,
                        "speed": at.speed,
                    }))
                })
                .collect();

            HttpResponse::Ok().json(serde_json::json!({
                "generated_at": now.to_rfc3339(),
                "hour": hour,
                "positions": frames,
            }))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[derive(Deserialize)]
pub struct HeatQuery {
    kind: Option<String>,
    metric: Option<String>,
    hour: Option<String>,
}

/// Normalized heat frame for the map overlay, from either carpark feed.
#[actix_web::get("/fleet/heat")]
pub async fn heat(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    query: web::Query<HeatQuery>,
) -> impl Responder {
    let metric = match query.metric.as_deref() {
        Some("occupancy") => HeatMetric::Occupancy,
        _ => HeatMetric::Volatility,
    };
    let cutoff_hour = parse_f64(&query.hour)
        .map(|hour| hour.floor() as i32)
        .unwrap_or_else(|| hkmove::hk_hour_now() as i32)
        .clamp(0, 23);
    let kind = query.kind.as_deref().unwrap_or("parking");

    let sources = match kind {
        "metered" => queries::parking::metered_hourly_points(&pool, 400)
            .await
            .map(|rows| {
                rows.into_iter()
                    .filter_map(|row| {
                        Some(HeatSource {
                            id: row.carpark_id,
                            lat: row.lat?,
                            lon: row.lon?,
                            hour: row.hour,
                            volatility: row.stddev_vacancy_rate.unwrap_or(0.0),
                            occupancy: row.occupancy_rate.unwrap_or(0.0),
                        })
                    })
                    .collect::<Vec<HeatSource>>()
            }),
        _ => queries::parking::carpark_hourly_points(&pool, 400)
            .await
            .map(|rows| {
                rows.into_iter()
                    .filter_map(|row| {
                        Some(HeatSource {
                            id: row.park_id,
                            lat: row.lat?,
                            lon: row.lon?,
                            hour: row.hour,
                            volatility: row.stddev_vacancy.unwrap_or(0.0),
                            occupancy: row.occupancy_rate.unwrap_or(0.0),
                        })
                    })
                    .collect::<Vec<HeatSource>>()
            }),
    };

    match sources {
        Ok(sources) => {
            let frame = heatmap::heat_frame(&sources, cutoff_hour, metric);
            HttpResponse::Ok().json(serde_json::json!({
                "generated_at": Utc::now().to_rfc3339(),
                "kind": kind,
                "metric": metric,
                "hour": cutoff_hour,
                "points": frame,
            }))
        }
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
