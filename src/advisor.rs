use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    catalog::{Crop, CropProfile, Region, WaterPriority},
    error::{check_percent, Result},
    weather::WeatherSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Irrigate,
    Skip,
}

/// Inputs for one evaluation. Region and crop are catalog names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdvisoryRequest {
    pub region: String,
    pub crop: String,
    /// Measured soil moisture, percent.
    pub current_moisture: f64,
    /// Field threshold, percent.
    pub threshold: f64,
    pub weather: WeatherSnapshot,
    /// Time of the moisture measurement.
    #[schema(value_type = String, example = "06:00:00")]
    pub observed_at: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdvisorySnapshot {
    pub decision: Decision,
    /// Litres per acre; zero exactly when the decision is `SKIP`.
    pub recommended_volume_liters: u32,
    /// `HH:MM`
    pub next_check_time: String,
    pub explanation: String,
    pub water_priority: WaterPriority,
    pub moisture_floor: f64,
    /// Weather stress score, 0-100. Informational only.
    pub irrigation_score: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct AdvisorConfig {
    pub recheck_after_irrigate: TimeDelta,
    pub recheck_after_skip: TimeDelta,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            recheck_after_irrigate: TimeDelta::hours(2),
            recheck_after_skip: TimeDelta::hours(6),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IrrigationAdvisor {
    config: AdvisorConfig,
}

impl IrrigationAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    /// Decide whether the field needs water.
    ///
    /// The crop's moisture floor always applies: a reading below it means
    /// `IRRIGATE` even when the field threshold is lower. Volume scales with
    /// the deficit against whichever requirement is higher, and grows when
    /// the temperature exceeds the crop's heat limit.
    pub fn evaluate(&self, req: &AdvisoryRequest) -> Result<AdvisorySnapshot> {
        let region: Region = req.region.parse()?;
        let crop: Crop = req.crop.parse()?;
        let moisture = check_percent("current moisture", req.current_moisture)?;
        let threshold = check_percent("threshold", req.threshold)?;
        req.weather.validate()?;

        let profile = crop.profile();
        let floor = profile.moisture_floor;
        let required = threshold.max(floor);

        let decision = if moisture < threshold || moisture < floor {
            Decision::Irrigate
        } else {
            Decision::Skip
        };

        let (volume, recheck) = match decision {
            Decision::Irrigate => (
                volume_liters(required - moisture, &profile, &req.weather),
                self.config.recheck_after_irrigate,
            ),
            Decision::Skip => (0, self.config.recheck_after_skip),
        };
        let next_check_time = req
            .observed_at
            .overflowing_add_signed(recheck)
            .0
            .format("%H:%M")
            .to_string();

        let requirement = if floor >= threshold {
            format!("the {floor:.0}% moisture floor for {crop}")
        } else {
            format!("the {threshold:.0}% field threshold set for {crop}")
        };
        let action = match decision {
            Decision::Irrigate => format!(
                "Soil moisture in {region} is {moisture:.1}%, below {requirement}. \
                 Apply {volume} L/acre now; next check at {next_check_time}."
            ),
            Decision::Skip => format!(
                "Soil moisture in {region} is {moisture:.1}%, at or above {requirement}. \
                 Skip irrigation; next check at {next_check_time}."
            ),
        };
        let w = &req.weather;
        let explanation = format!(
            "{action} Weather: {:.1}°C, {:.0}% humidity, {:.0}% chance of rain.",
            w.temperature_c, w.humidity, w.rain_probability
        );

        debug!(
            region = %region,
            crop = %crop,
            moisture,
            threshold,
            floor,
            ?decision,
            volume,
            "Evaluated irrigation advisory"
        );

        Ok(AdvisorySnapshot {
            decision,
            recommended_volume_liters: volume,
            next_check_time,
            explanation,
            water_priority: profile.priority,
            moisture_floor: floor,
            irrigation_score: irrigation_score(&profile, w),
        })
    }
}

/// Litres per acre for a positive moisture deficit; never below one.
fn volume_liters(deficit: f64, profile: &CropProfile, weather: &WeatherSnapshot) -> u32 {
    let heat_factor = 1.0 + 0.02 * (weather.temperature_c - profile.temp_max).max(0.0);
    let liters = (deficit * profile.liters_per_point * heat_factor).ceil();
    (liters as u32).max(1)
}

/// Weather-driven need score: high floors and dry air raise it, real rain
/// and heat beyond the crop's limit lower it.
fn irrigation_score(profile: &CropProfile, weather: &WeatherSnapshot) -> u8 {
    let moisture_need = 50.0 + (profile.moisture_floor - 40.0) * 0.8;
    let temp_penalty = ((weather.temperature_c - profile.temp_max) * 2.0).max(0.0);
    let humidity_penalty = ((profile.humidity_min - weather.humidity) * 1.5).max(0.0);
    let rain_bonus = if weather.rainfall_mm > 2.0 {
        weather.rainfall_mm * 10.0
    } else {
        0.0
    };
    let score = moisture_need + humidity_penalty - rain_bonus - temp_penalty;
    score.clamp(0.0, 100.0).round() as u8
}
