use std::{collections::BTreeMap, sync::PoisonError};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::OpenApi;

use super::{
    dto::{CropDto, FieldConditionsDto, PriceQuoteDto, RegionDto, TelemetryDto},
    errors::AppError,
    AppState,
};
use crate::{
    advisor::{AdvisoryRequest, AdvisorySnapshot, Decision},
    catalog::{Crop, CropGroup, CropProfile, Region, WaterPriority},
    error::AdvisoryError,
    price_feed::TrendDirection,
    telemetry::{Reading, TelemetryWindow},
    weather::{self, WeatherSnapshot},
};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TelemetryParams {
    pub window: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FieldParams {
    pub crop: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceParams {
    /// Comma-separated crop names.
    pub crops: Option<String>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// List the regions the dashboard can select, with their weather city.
#[utoipa::path(
    get,
    path = "/regions",
    responses((status = 200, description = "Region catalog", body = Vec<RegionDto>)),
    tag = "catalog"
)]
pub async fn list_regions() -> Json<Vec<RegionDto>> {
    Json(Region::ALL.into_iter().map(Into::into).collect())
}

/// List the crop catalog with each crop's water profile.
#[utoipa::path(
    get,
    path = "/crops",
    responses((status = 200, description = "Crop catalog", body = Vec<CropDto>)),
    tag = "catalog"
)]
pub async fn list_crops() -> Json<Vec<CropDto>> {
    Json(Crop::ALL.into_iter().map(Into::into).collect())
}

// ---------------------------------------------------------------------------
// Telemetry & advisory
// ---------------------------------------------------------------------------

/// Simulated soil-moisture series for a region and crop.
#[utoipa::path(
    get,
    path = "/telemetry/{region}/{crop}",
    params(
        ("region" = String, Path, description = "Region name, e.g. `Punjab`"),
        ("crop"   = String, Path, description = "Crop name, e.g. `Wheat`"),
        ("window" = Option<String>, Query, description = "`24h` (default) or `7d`"),
    ),
    responses(
        (status = 200, description = "Moisture readings", body = TelemetryDto),
        (status = 400, description = "Unknown region, crop or window"),
    ),
    tag = "telemetry"
)]
pub async fn get_telemetry(
    State(state): State<AppState>,
    Path((region, crop)): Path<(String, String)>,
    Query(params): Query<TelemetryParams>,
) -> Result<Json<TelemetryDto>, AppError> {
    let region: Region = region.parse()?;
    let crop: Crop = crop.parse()?;
    let window: TelemetryWindow = match params.window.as_deref() {
        Some(raw) => raw.parse()?,
        None => TelemetryWindow::default(),
    };

    let readings = {
        let mut rng = state.rng.lock().unwrap_or_else(PoisonError::into_inner);
        state.simulator.readings(region, crop, window, &mut *rng)
    };

    Ok(Json(TelemetryDto {
        region,
        crop,
        window,
        readings,
    }))
}

/// Evaluate an irrigation advisory from explicit measurements.
#[utoipa::path(
    post,
    path = "/advisory",
    request_body = AdvisoryRequest,
    responses(
        (status = 200, description = "Advisory", body = AdvisorySnapshot),
        (status = 400, description = "Unknown selection or value out of range"),
    ),
    tag = "advisory"
)]
pub async fn post_advisory(
    State(state): State<AppState>,
    Json(req): Json<AdvisoryRequest>,
) -> Result<Json<AdvisorySnapshot>, AppError> {
    Ok(Json(state.advisor.evaluate(&req)?))
}

/// Current simulated conditions for a region: weather, latest soil
/// moisture and the advisory they produce. The crop defaults to `Rice`.
#[utoipa::path(
    get,
    path = "/weather/{region}",
    params(
        ("region" = String, Path, description = "Region name or its weather city, e.g. `Ludhiana`"),
        ("crop" = Option<String>, Query, description = "Crop name (default `Rice`)"),
    ),
    responses(
        (status = 200, description = "Field conditions", body = FieldConditionsDto),
        (status = 400, description = "Unknown region or crop; the body lists the valid names"),
    ),
    tag = "advisory"
)]
pub async fn get_field_conditions(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(params): Query<FieldParams>,
) -> Result<Json<FieldConditionsDto>, AppError> {
    let region = Region::for_location(&location)?;
    let crop: Crop = params.crop.as_deref().unwrap_or("Rice").parse()?;

    let (weather, series) = {
        let mut rng = state.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let weather = weather::simulate(region, &mut *rng);
        let series = state
            .simulator
            .readings(region, crop, TelemetryWindow::Day, &mut *rng);
        (weather, series)
    };
    let latest = series
        .last()
        .ok_or_else(|| anyhow::anyhow!("simulator returned an empty series"))?;

    let advisory = state.advisor.evaluate(&AdvisoryRequest {
        region: region.name().to_owned(),
        crop: crop.name().to_owned(),
        current_moisture: latest.moisture_level,
        threshold: latest.threshold,
        weather: weather.clone(),
        observed_at: Utc::now().time(),
    })?;

    Ok(Json(FieldConditionsDto {
        region,
        city: region.weather_city().to_owned(),
        crop,
        weather,
        current_moisture: latest.moisture_level,
        threshold: latest.threshold,
        advisory,
    }))
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Latest mandi quote per crop, keyed by crop name. All catalog crops when
/// `crops` is omitted.
#[utoipa::path(
    get,
    path = "/prices",
    params(
        ("crops" = Option<String>, Query, description = "Comma-separated crop names"),
    ),
    responses(
        (status = 200, description = "Quotes by crop", body = BTreeMap<String, PriceQuoteDto>),
        (status = 400, description = "Empty or rejected crop list"),
    ),
    tag = "prices"
)]
pub async fn get_prices(
    State(state): State<AppState>,
    Query(params): Query<PriceParams>,
) -> Result<Json<BTreeMap<String, PriceQuoteDto>>, AppError> {
    let requested: Vec<String> = match params.crops {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        None => Crop::ALL.iter().map(|c| c.name().to_owned()).collect(),
    };
    if requested.is_empty() {
        return Err(AdvisoryError::invalid("crops", "").into());
    }

    let quotes = state.prices.fetch_quotes(requested.as_slice())?;
    Ok(Json(
        quotes
            .into_iter()
            .map(|(crop, quote)| (crop.name().to_owned(), quote.into()))
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        list_regions,
        list_crops,
        get_telemetry,
        post_advisory,
        get_field_conditions,
        get_prices,
        health
    ),
    components(schemas(
        RegionDto,
        CropDto,
        TelemetryDto,
        FieldConditionsDto,
        PriceQuoteDto,
        Region,
        Crop,
        CropGroup,
        CropProfile,
        WaterPriority,
        Reading,
        TelemetryWindow,
        AdvisoryRequest,
        AdvisorySnapshot,
        Decision,
        WeatherSnapshot,
        TrendDirection,
    )),
    tags(
        (name = "catalog",   description = "Region and crop catalogs"),
        (name = "telemetry", description = "Simulated soil-moisture telemetry"),
        (name = "advisory",  description = "Irrigation recommendations"),
        (name = "prices",    description = "Mandi price ticker"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "Precision Irrigation API",
        version = "0.1.0",
        description = "Simulated soil telemetry, irrigation advisories and mandi prices"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::{json, Value};

    use crate::{
        advisor::IrrigationAdvisor,
        api::{router, AppState},
        price_feed::{PriceFeed, PriceFeedConfig},
        telemetry::TelemetrySimulator,
    };

    fn test_server() -> TestServer {
        let state = AppState {
            simulator: TelemetrySimulator::default(),
            advisor: IrrigationAdvisor::default(),
            prices: PriceFeed::new(PriceFeedConfig::default(), chrono::Utc::now()),
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(1))),
        };
        TestServer::new(router(state)).unwrap()
    }

    fn advisory_body(moisture: f64) -> Value {
        json!({
            "region": "Punjab",
            "crop": "Wheat",
            "current_moisture": moisture,
            "threshold": 40.0,
            "weather": { "temperature_c": 28.0, "humidity": 65.0, "rain_probability": 15.0 },
            "observed_at": "12:00:00"
        })
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn regions_lists_the_full_catalog() {
        let resp = test_server().get("/regions").await;
        resp.assert_status_ok();
        let body: Vec<Value> = resp.json();
        assert_eq!(body.len(), 10);
        assert_eq!(body[0]["name"], "Punjab");
        assert_eq!(body[0]["weather_city"], "Ludhiana");
    }

    #[tokio::test]
    async fn crops_include_moisture_floors() {
        let resp = test_server().get("/crops").await;
        resp.assert_status_ok();
        let body: Vec<Value> = resp.json();
        assert_eq!(body.len(), 8);
        let rice = body.iter().find(|c| c["name"] == "Rice").unwrap();
        assert_eq!(rice["profile"]["moisture_floor"], 60.0);
        assert_eq!(rice["profile"]["priority"], "High");
    }

    // -----------------------------------------------------------------------
    // GET /telemetry/{region}/{crop}
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn telemetry_defaults_to_day_window() {
        let resp = test_server().get("/telemetry/Punjab/Wheat").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["window"], "24h");
        let readings = body["readings"].as_array().unwrap();
        assert_eq!(readings.len(), 7);
        assert_eq!(readings[0]["timestamp"], "00:00");
        assert_eq!(readings[6]["timestamp"], "23:59");
    }

    #[tokio::test]
    async fn telemetry_week_window() {
        let resp = test_server().get("/telemetry/Tamil%20Nadu/Rice?window=7d").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["region"], "Tamil Nadu");
        assert_eq!(body["readings"][0]["timestamp"], "Mon");
    }

    #[tokio::test]
    async fn telemetry_unknown_region_is_bad_request() {
        let resp = test_server().get("/telemetry/Atlantis/Wheat").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert!(body["error"].as_str().unwrap().contains("region"));
    }

    #[tokio::test]
    async fn telemetry_unknown_window_is_bad_request() {
        let resp = test_server().get("/telemetry/Punjab/Wheat?window=30d").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    // -----------------------------------------------------------------------
    // POST /advisory
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn advisory_irrigates_dry_wheat() {
        let resp = test_server().post("/advisory").json(&advisory_body(38.0)).await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["decision"], "IRRIGATE");
        assert!(body["recommended_volume_liters"].as_u64().unwrap() > 0);
        assert_eq!(body["next_check_time"], "14:00");
    }

    #[tokio::test]
    async fn advisory_skips_moist_wheat() {
        let resp = test_server().post("/advisory").json(&advisory_body(55.0)).await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["decision"], "SKIP");
        assert_eq!(body["recommended_volume_liters"], 0);
    }

    #[tokio::test]
    async fn advisory_out_of_range_moisture_is_bad_request() {
        let resp = test_server().post("/advisory").json(&advisory_body(180.0)).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    // -----------------------------------------------------------------------
    // GET /weather/{region}
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn field_conditions_default_to_rice() {
        let resp = test_server().get("/weather/Punjab").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["crop"], "Rice");
        assert_eq!(body["city"], "Ludhiana");
        assert_eq!(body["weather"]["source"], "Simulated");
        // The 23:59 slot tops out at 51%, under rice's 60% floor.
        assert_eq!(body["advisory"]["decision"], "IRRIGATE");
    }

    #[tokio::test]
    async fn field_conditions_accept_the_weather_city() {
        let resp = test_server().get("/weather/Chennai?crop=Wheat").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["region"], "Tamil Nadu");
        assert_eq!(body["crop"], "Wheat");
    }

    #[tokio::test]
    async fn field_conditions_unknown_location_lists_regions() {
        let resp = test_server().get("/weather/Atlantis").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        let available = body["available"].as_array().unwrap();
        assert_eq!(available.len(), 10);
        assert!(available.contains(&Value::from("Punjab")));
    }

    #[tokio::test]
    async fn field_conditions_unknown_crop_is_bad_request() {
        let resp = test_server().get("/weather/Punjab?crop=Quinoa").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = resp.json();
        assert_eq!(body["available"].as_array().unwrap().len(), 8);
    }

    // -----------------------------------------------------------------------
    // GET /prices
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn prices_for_wheat_and_rice() {
        let resp = test_server().get("/prices?crops=Wheat,Rice").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        let quotes = body.as_object().unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(body["Wheat"]["price"], "₹2,125/qtl");
        assert_eq!(body["Wheat"]["trend"], "+1.2%");
        assert_eq!(body["Rice"]["trend_direction"], "DOWN");
    }

    #[tokio::test]
    async fn prices_default_to_every_crop() {
        let resp = test_server().get("/prices").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body.as_object().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn prices_skip_unknown_crops() {
        let resp = test_server().get("/prices?crops=Wheat,Quinoa").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn prices_empty_list_is_bad_request() {
        let resp = test_server().get("/prices?crops=").await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    // -----------------------------------------------------------------------
    // System
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_returns_ok() {
        let resp = test_server().get("/health").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let resp = test_server().get("/api-docs/openapi.json").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["info"]["title"], "Precision Irrigation API");
    }
}
