// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

//! Process-wide memo of the GTFS route catalog. The catalog only changes
//! on pipeline reloads, so the first request pays for the fetch and every
//! later request reads the cached slice. Concurrent first requests share
//! a single in-flight fetch.

use crate::models::RouteSummary;
use crate::postgres_tools::HkmovePostgresPool;
use tokio::sync::OnceCell;

static ROUTE_SUMMARIES: OnceCell<Vec<RouteSummary>> = OnceCell::const_new();

pub async fn route_summaries_cached(
    pool: &HkmovePostgresPool,
) -> Result<&'static Vec<RouteSummary>, sqlx::Error> {
    ROUTE_SUMMARIES
        .get_or_try_init(|| crate::queries::gtfs::route_summaries(pool))
        .await
}
