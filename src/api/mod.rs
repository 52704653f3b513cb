pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use rand::rngs::StdRng;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{advisor::IrrigationAdvisor, price_feed::PriceFeed, telemetry::TelemetrySimulator};
use handlers::ApiDoc;

/// Everything the handlers share. The generator is the only mutable piece;
/// the components themselves are stateless apart from the feed's cache.
#[derive(Clone)]
pub struct AppState {
    pub simulator: TelemetrySimulator,
    pub advisor: IrrigationAdvisor,
    pub prices: PriceFeed,
    pub rng: Arc<Mutex<StdRng>>,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/regions", get(handlers::list_regions))
        .route("/crops", get(handlers::list_crops))
        .route("/telemetry/{region}/{crop}", get(handlers::get_telemetry))
        .route("/advisory", post(handlers::post_advisory))
        .route("/weather/{region}", get(handlers::get_field_conditions))
        .route("/prices", get(handlers::get_prices))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
