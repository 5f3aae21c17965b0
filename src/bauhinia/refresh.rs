// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Scheduler-triggered materialized-view refresh. The platform cron hits
//! these endpoints with a bearer token; the view lists run in a fixed
//! order on a dedicated non-pooled connection so a long refresh never
//! starves the read pool.

use actix_web::{HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use sqlx::Connection;
use sqlx::postgres::PgConnection;
use std::time::Instant;
use thiserror::Error;

/// (view, refresh concurrently). Order matters: the base vacancy snapshot
/// refreshes before the aggregations reading from it.
const PARKING_VIEWS: [(&str, bool); 8] = [
    ("latest_parking_vacancy", true),
    ("agg_parking_5min_trend", false),
    ("agg_parking_hourly_pattern", false),
    ("agg_metered_5min_trend", false),
    ("agg_metered_hourly_pattern", false),
    ("agg_busiest_districts_parking", false),
    ("agg_busiest_districts_metered", false),
    ("agg_busiest_carparks", false),
];

const ISMART_VIEWS: [(&str, bool); 3] = [
    ("vehicle_state_segments_mv", true),
    ("vehicle_dwell_events_mv", true),
    ("vehicle_dwell_districts_mv", true),
];

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("REFRESH_DATABASE_URL or DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
}

/// When no secret is configured the endpoint stays open, matching how the
/// deployment behaves before the secret is provisioned.
pub fn bearer_authorized(secret: Option<&str>, auth_header: Option<&str>) -> bool {
    match secret {
        None => true,
        Some(secret) => auth_header == Some(format!("Bearer {secret}").as_str()),
    }
}

async fn run_refresh(views: &[(&str, bool)]) -> Result<(), RefreshError> {
    let url = std::env::var("REFRESH_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| RefreshError::MissingDatabaseUrl)?;

    let mut conn = PgConnection::connect(url.as_str()).await?;

    for (view, concurrently) in views {
        let statement = if *concurrently {
            format!("REFRESH MATERIALIZED VIEW CONCURRENTLY {view};")
        } else {
            format!("REFRESH MATERIALIZED VIEW {view};")
        };
        sqlx::query(statement.as_str()).execute(&mut conn).await?;
        tracing::info!("refreshed {}", view);
    }

    conn.close().await?;
    Ok(())
}

async fn refresh_endpoint(
    req: HttpRequest,
    views: &[(&str, bool)],
    what: &str,
) -> HttpResponse {
    let secret = std::env::var("CRON_SECRET").ok();
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok());

    if !bearer_authorized(secret.as_deref(), auth_header) {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Unauthorized"
        }));
    }

    tracing::info!("starting {} views refresh", what);
    let started = Instant::now();

    match run_refresh(views).await {
        Ok(()) => {
            let duration = started.elapsed().as_millis();
            tracing::info!("{} views refreshed in {}ms", what, duration);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": format!("{what} views refreshed successfully"),
                "duration": format!("{duration}ms"),
                "timestamp": Utc::now().to_rfc3339(),
                "views": views.iter().map(|(view, _)| *view).collect::<Vec<&str>>(),
            }))
        }
        Err(err) => {
            tracing::error!("error refreshing {} views: {}", what, err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": err.to_string(),
                "timestamp": Utc::now().to_rfc3339(),
            }))
        }
    }
}

#[actix_web::get("/cron/refresh_parking")]
pub async fn refresh_parking(req: HttpRequest) -> impl Responder {
    refresh_endpoint(req, &PARKING_VIEWS, "parking").await
}

#[actix_web::get("/cron/refresh_ismart")]
pub async fn refresh_ismart(req: HttpRequest) -> impl Responder {
    refresh_endpoint(req, &ISMART_VIEWS, "iSmart").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_leaves_the_endpoint_open() {
        assert!(bearer_authorized(None, None));
        assert!(bearer_authorized(None, Some("Bearer anything")));
    }

    #[test]
    fn configured_secret_requires_exact_bearer_header() {
        assert!(bearer_authorized(Some("s3cret"), Some("Bearer s3cret")));
        assert!(!bearer_authorized(Some("s3cret"), Some("Bearer wrong")));
        assert!(!bearer_authorized(Some("s3cret"), Some("s3cret")));
        assert!(!bearer_authorized(Some("s3cret"), None));
    }
}
