use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    advisor::AdvisorySnapshot,
    catalog::{Crop, CropGroup, CropProfile, Region},
    price_feed::{PriceQuote, TrendDirection},
    telemetry::{Reading, TelemetryWindow},
    weather::WeatherSnapshot,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegionDto {
    pub name: Region,
    pub weather_city: String,
}

impl From<Region> for RegionDto {
    fn from(r: Region) -> Self {
        Self {
            name: r,
            weather_city: r.weather_city().to_owned(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CropDto {
    pub name: Crop,
    pub group: CropGroup,
    pub profile: CropProfile,
}

impl From<Crop> for CropDto {
    fn from(c: Crop) -> Self {
        Self {
            name: c,
            group: c.group(),
            profile: c.profile(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TelemetryDto {
    pub region: Region,
    pub crop: Crop,
    pub window: TelemetryWindow,
    /// Chronological readings.
    pub readings: Vec<Reading>,
}

/// Response for `GET /weather/{region}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldConditionsDto {
    pub region: Region,
    pub city: String,
    pub crop: Crop,
    pub weather: WeatherSnapshot,
    /// Latest simulated soil moisture, percent.
    pub current_moisture: f64,
    pub threshold: f64,
    pub advisory: AdvisorySnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceQuoteDto {
    pub crop: Crop,
    /// Display form, e.g. `₹2,125/qtl`.
    pub price: String,
    pub amount: u32,
    /// Display form, e.g. `+1.2%`.
    pub trend: String,
    pub trend_percent: f64,
    pub trend_direction: TrendDirection,
    pub as_of: DateTime<Utc>,
    pub stale: bool,
}

impl From<PriceQuote> for PriceQuoteDto {
    fn from(q: PriceQuote) -> Self {
        Self {
            crop: q.crop,
            price: q.price.to_string(),
            amount: q.price.amount,
            trend: q.trend_label(),
            trend_percent: q.trend_percent,
            trend_direction: q.trend_direction,
            as_of: q.as_of,
            stale: q.stale,
        }
    }
}
