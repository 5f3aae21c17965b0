// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! GTFS reference endpoints. The route catalog is memoized for the
//! process lifetime; the detail lookup is always live.

use actix_web::{HttpResponse, Responder, web};
use hkmove::postgres_tools::HkmovePostgresPool;
use hkmove::{gtfs_cache, queries};
use std::sync::Arc;

#[actix_web::get("/gtfs/routes")]
pub async fn routes(pool: web::Data<Arc<HkmovePostgresPool>>) -> impl Responder {
    match gtfs_cache::route_summaries_cached(&pool).await {
        Ok(summaries) => HttpResponse::Ok().json(summaries),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

#[actix_web::get("/gtfs/route/{route_id}")]
pub async fn route_detail(
    pool: web::Data<Arc<HkmovePostgresPool>>,
    path: web::Path<String>,
) -> impl Responder {
    let route_id = path.into_inner();

    match queries::gtfs::route_detail(&pool, route_id.as_str()).await {
        Ok(Some(detail)) => HttpResponse::Ok().json(detail),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("route {route_id} not found")
        })),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
