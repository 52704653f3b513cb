use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    catalog::Region,
    error::{check_percent, AdvisoryError, Result},
};

/// Weather conditions the advisor weighs a decision against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherSnapshot {
    /// Degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Chance of rain in the next few hours, percent
    pub rain_probability: f64,
    /// Rain over the last hour, millimetres
    #[serde(default)]
    pub rainfall_mm: f64,
    /// Metres per second
    #[serde(default)]
    pub wind_speed: f64,
    /// Hectopascals
    #[serde(default = "default_pressure")]
    pub pressure_hpa: f64,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_pressure() -> f64 {
    1012.0
}

fn default_condition() -> String {
    "Clear".to_owned()
}

fn default_source() -> String {
    "Manual".to_owned()
}

impl WeatherSnapshot {
    /// Snapshot with just the three fields every decision needs.
    pub fn new(temperature_c: f64, humidity: f64, rain_probability: f64) -> Self {
        Self {
            temperature_c,
            humidity,
            rain_probability,
            rainfall_mm: 0.0,
            wind_speed: 0.0,
            pressure_hpa: default_pressure(),
            condition: default_condition(),
            source: default_source(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.temperature_c.is_finite() || !(-60.0..=60.0).contains(&self.temperature_c) {
            return Err(AdvisoryError::invalid("temperature", self.temperature_c));
        }
        check_percent("humidity", self.humidity)?;
        check_percent("rain probability", self.rain_probability)?;
        if !self.rainfall_mm.is_finite() || self.rainfall_mm < 0.0 {
            return Err(AdvisoryError::invalid("rainfall", self.rainfall_mm));
        }
        Ok(())
    }
}

/// Stand-in for a live weather feed: plausible seasonal conditions drawn
/// from the caller's generator.
pub fn simulate<R: Rng + ?Sized>(region: Region, rng: &mut R) -> WeatherSnapshot {
    let rainfall_mm = round1(rng.gen_range(0.0..3.5));
    let snapshot = WeatherSnapshot {
        temperature_c: round1(26.0 + rng.gen_range(-2.0..3.0)),
        humidity: f64::from(rng.gen_range(55u8..=80)),
        rain_probability: f64::from(rng.gen_range(0u8..=40)),
        rainfall_mm,
        wind_speed: round1(rng.gen_range(5.0..15.0)),
        pressure_hpa: default_pressure(),
        condition: if rainfall_mm > 2.0 { "Rain" } else { "Clear" }.to_owned(),
        source: "Simulated".to_owned(),
    };
    debug!(region = %region, city = region.weather_city(), ?snapshot, "Simulated weather");
    snapshot
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
