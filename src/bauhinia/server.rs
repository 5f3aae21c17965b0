// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref,
    clippy::useless_vec
)]

mod boundary_api;
mod fleet_api;
mod gtfs_api;
mod parking_api;
mod refresh;
mod transport_api;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Responder, middleware, web};
use hkmove::postgres_tools::make_async_pool;
use std::sync::Arc;

async fn index(_req: HttpRequest) -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/plain"))
        .body("Hello World from the Bauhinia HTTP endpoint!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let pool = Arc::new(
        make_async_pool()
            .await
            .expect("could not connect to postgres"),
    );

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| String::from("127.0.0.1:17420"));

    tracing::info!("bauhinia listening on {}", bind_addr);

    let builder = HttpServer::new(move || {
        App::new()
            .wrap(DefaultHeaders::new().add(("Server", "Bauhinia")))
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(Arc::clone(&pool)))
            .route("/", web::get().to(index))
            .service(parking_api::metered_carparks)
            .service(parking_api::metered_trends)
            .service(parking_api::metered_recommendations)
            .service(parking_api::metered_busiest_districts)
            .service(parking_api::metered_hourly_pattern)
            .service(parking_api::parking_trends)
            .service(parking_api::parking_hourly_pattern)
            .service(parking_api::parking_busiest_districts)
            .service(parking_api::parking_busiest_carparks)
            .service(boundary_api::headline)
            .service(boundary_api::top_days)
            .service(boundary_api::corridor_stack)
            .service(boundary_api::residency_mix)
            .service(boundary_api::patterns)
            .service(boundary_api::corridors)
            .service(transport_api::mode_stack)
            .service(transport_api::latest)
            .service(transport_api::annual)
            .service(transport_api::operators)
            .service(transport_api::operator_trend)
            .service(transport_api::ranking)
            .service(gtfs_api::routes)
            .service(gtfs_api::route_detail)
            .service(fleet_api::summary)
            .service(fleet_api::dwells)
            .service(fleet_api::hotspots)
            .service(fleet_api::activity)
            .service(fleet_api::positions)
            .service(fleet_api::heat)
            .service(refresh::refresh_parking)
            .service(refresh::refresh_ismart)
    })
    .workers(8);

    builder.bind(bind_addr.as_str())?.run().await
}
