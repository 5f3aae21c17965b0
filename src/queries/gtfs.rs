// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! GTFS reference reads. Both entry points are stored procedures the
//! ingestion pipeline owns; the detail call hands back one JSON document
//! that gets decoded into typed structs here.

use crate::models::{RouteDetail, RouteSummary};
use crate::postgres_tools::HkmovePostgresPool;
use serde_json::Value;

pub async fn route_summaries(
    pool: &HkmovePostgresPool,
) -> Result<Vec<RouteSummary>, sqlx::Error> {
    sqlx::query_as::<_, RouteSummary>(
        "SELECT route_id, agency_id, route_short_name, route_long_name, route_type, route_url
         FROM gtfs_routes_full()
         ORDER BY route_id ASC",
    )
    .fetch_all(pool)
    .await
}

/// `None` when the procedure answers SQL NULL for an unknown route id.
pub async fn route_detail(
    pool: &HkmovePostgresPool,
    route_id: &str,
) -> Result<Option<RouteDetail>, sqlx::Error> {
    let document = sqlx::query_scalar::<_, Option<Value>>("SELECT gtfs_route_detail($1)")
        .bind(route_id)
        .fetch_one(pool)
        .await?;

    Ok(document.map(|doc| RouteDetail::from_document(&doc)))
}
