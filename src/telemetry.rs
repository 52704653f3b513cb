//! Simulated soil-moisture telemetry.
//!
//! Each window is a fixed set of time slots with a base moisture level per
//! slot. A reading is the slot base plus a bounded random offset drawn from
//! the caller's generator, so a seeded `StdRng` reproduces a series exactly.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    catalog::{Crop, Region},
    error::{check_percent, AdvisoryError, Result},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    /// Time-of-day (`HH:MM`) or weekday label.
    pub timestamp: String,
    /// Soil moisture percentage.
    pub moisture_level: f64,
    /// Critical moisture percentage, constant across the window.
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum TelemetryWindow {
    /// Last 24 hours at 4-hour intervals.
    #[default]
    #[serde(rename = "24h")]
    Day,
    /// Last 7 days, one point per day.
    #[serde(rename = "7d")]
    Week,
}

const DAY_SLOTS: [(&str, f64); 7] = [
    ("00:00", 45.0),
    ("04:00", 42.0),
    ("08:00", 38.0),
    ("12:00", 55.0),
    ("16:00", 52.0),
    ("20:00", 48.0),
    ("23:59", 46.0),
];

const WEEK_SLOTS: [(&str, f64); 7] = [
    ("Mon", 47.0),
    ("Tue", 45.0),
    ("Wed", 43.0),
    ("Thu", 49.0),
    ("Fri", 48.0),
    ("Sat", 46.0),
    ("Sun", 45.0),
];

impl TelemetryWindow {
    pub fn label(self) -> &'static str {
        match self {
            TelemetryWindow::Day => "24h",
            TelemetryWindow::Week => "7d",
        }
    }

    fn slots(self) -> &'static [(&'static str, f64)] {
        match self {
            TelemetryWindow::Day => &DAY_SLOTS,
            TelemetryWindow::Week => &WEEK_SLOTS,
        }
    }
}

impl fmt::Display for TelemetryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TelemetryWindow {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "24h" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            other => Err(AdvisoryError::invalid("window", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Offset added to each slot's base moisture, drawn uniformly from
/// `[min, max)`. A zero-width range adds exactly `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterRange {
    pub min: f64,
    pub max: f64,
}

impl JitterRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Both bounds finite, ordered, and with a width the sampler can represent.
    fn validate(&self) -> Result<()> {
        let (min, max) = (self.min, self.max);
        if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
            return Err(AdvisoryError::invalid("jitter range", format!("{min}..{max}")));
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

impl Default for JitterRange {
    fn default() -> Self {
        Self { min: 0.0, max: 5.0 }
    }
}

/// Where the window's threshold line comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdPolicy {
    /// One critical value for every region and crop.
    Global(f64),
    /// The selected crop's moisture floor.
    CropFloor,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Global(40.0)
    }
}

impl ThresholdPolicy {
    pub fn threshold_for(&self, crop: Crop) -> f64 {
        match *self {
            ThresholdPolicy::Global(value) => value,
            ThresholdPolicy::CropFloor => crop.profile().moisture_floor,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TelemetrySimulator {
    jitter: JitterRange,
    threshold: ThresholdPolicy,
}

impl TelemetrySimulator {
    pub fn new(jitter: JitterRange, threshold: ThresholdPolicy) -> Result<Self> {
        if let ThresholdPolicy::Global(value) = threshold {
            check_percent("threshold", value)?;
        }
        jitter.validate()?;
        Ok(Self { jitter, threshold })
    }

    /// Produce the moisture series for a `(region, crop)` selection given by
    /// catalog name.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        region: &str,
        crop: &str,
        window: TelemetryWindow,
        rng: &mut R,
    ) -> Result<Vec<Reading>> {
        let region: Region = region.parse()?;
        let crop: Crop = crop.parse()?;
        Ok(self.readings(region, crop, window, rng))
    }

    /// Typed form of [`generate`](Self::generate) for already-validated selections.
    pub fn readings<R: Rng + ?Sized>(
        &self,
        region: Region,
        crop: Crop,
        window: TelemetryWindow,
        rng: &mut R,
    ) -> Vec<Reading> {
        let threshold = self.threshold.threshold_for(crop);

        let readings: Vec<Reading> = window
            .slots()
            .iter()
            .map(|&(label, base)| Reading {
                timestamp: label.to_owned(),
                moisture_level: round1((base + self.jitter.sample(rng)).clamp(0.0, 100.0)),
                threshold,
            })
            .collect();

        debug!(
            region = %region,
            crop = %crop,
            window = %window,
            points = readings.len(),
            "Generated simulated moisture series"
        );
        readings
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn every_catalog_pair_stays_in_range() {
        let sim = TelemetrySimulator::default();
        let mut rng = seeded(7);
        for region in Region::ALL {
            for crop in Crop::ALL {
                for window in [TelemetryWindow::Day, TelemetryWindow::Week] {
                    let series = sim
                        .generate(region.name(), crop.name(), window, &mut rng)
                        .unwrap();
                    assert_eq!(series.len(), 7);
                    for r in &series {
                        assert!((0.0..=100.0).contains(&r.moisture_level), "{r:?}");
                        assert!((0.0..=100.0).contains(&r.threshold), "{r:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn day_window_uses_four_hour_labels() {
        let sim = TelemetrySimulator::default();
        let series = sim
            .generate("Punjab", "Wheat", TelemetryWindow::Day, &mut seeded(1))
            .unwrap();
        let labels: Vec<&str> = series.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(
            labels,
            ["00:00", "04:00", "08:00", "12:00", "16:00", "20:00", "23:59"]
        );
    }

    #[test]
    fn same_seed_same_series() {
        let sim = TelemetrySimulator::default();
        let a = sim
            .generate("Gujarat", "Cotton", TelemetryWindow::Day, &mut seeded(42))
            .unwrap();
        let b = sim
            .generate("Gujarat", "Cotton", TelemetryWindow::Day, &mut seeded(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn values_stay_within_base_plus_jitter() {
        let sim = TelemetrySimulator::default();
        let series = sim
            .generate("Haryana", "Rice", TelemetryWindow::Day, &mut seeded(3))
            .unwrap();
        for (r, (_, base)) in series.iter().zip(DAY_SLOTS) {
            assert!(r.moisture_level >= base && r.moisture_level <= base + 5.0, "{r:?}");
            assert_eq!(r.threshold, 40.0);
        }
    }

    #[test]
    fn zero_width_jitter_reproduces_base_values() {
        let sim = TelemetrySimulator::new(
            JitterRange::new(0.0, 0.0).unwrap(),
            ThresholdPolicy::Global(40.0),
        )
        .unwrap();
        let series = sim
            .generate("Punjab", "Wheat", TelemetryWindow::Week, &mut seeded(0))
            .unwrap();
        let values: Vec<f64> = series.iter().map(|r| r.moisture_level).collect();
        assert_eq!(values, [47.0, 45.0, 43.0, 49.0, 48.0, 46.0, 45.0]);
    }

    #[test]
    fn large_jitter_is_clamped() {
        let sim = TelemetrySimulator::new(
            JitterRange::new(80.0, 90.0).unwrap(),
            ThresholdPolicy::default(),
        )
        .unwrap();
        let series = sim
            .generate("Punjab", "Wheat", TelemetryWindow::Day, &mut seeded(9))
            .unwrap();
        assert!(series.iter().all(|r| r.moisture_level == 100.0));
    }

    #[test]
    fn crop_floor_policy_uses_profile() {
        let sim = TelemetrySimulator::new(JitterRange::default(), ThresholdPolicy::CropFloor).unwrap();
        let series = sim
            .generate("Punjab", "Rice", TelemetryWindow::Day, &mut seeded(5))
            .unwrap();
        assert!(series.iter().all(|r| r.threshold == 60.0));
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let sim = TelemetrySimulator::default();
        let mut rng = seeded(0);
        assert_eq!(
            sim.generate("Atlantis", "Wheat", TelemetryWindow::Day, &mut rng),
            Err(AdvisoryError::invalid("region", "Atlantis"))
        );
        assert_eq!(
            sim.generate("Punjab", "Quinoa", TelemetryWindow::Day, &mut rng),
            Err(AdvisoryError::invalid("crop", "Quinoa"))
        );
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        assert!(JitterRange::new(5.0, 1.0).is_err());
        assert!(JitterRange::new(f64::NAN, 1.0).is_err());
        assert!(TelemetrySimulator::new(JitterRange::default(), ThresholdPolicy::Global(140.0)).is_err());
    }

    #[test]
    fn jitter_wider_than_f64_is_rejected() {
        assert!(matches!(
            JitterRange::new(-1e308, 1e308),
            Err(AdvisoryError::InvalidSelection { field: "jitter range", .. })
        ));

        // Public fields bypass `new`; the simulator checks again.
        let wide = JitterRange { min: -1e308, max: 1e308 };
        assert!(TelemetrySimulator::new(wide, ThresholdPolicy::default()).is_err());

        let near_limit = JitterRange::new(-1e307, 1e307).unwrap();
        let sim = TelemetrySimulator::new(near_limit, ThresholdPolicy::default()).unwrap();
        let readings = sim
            .generate("Punjab", "Wheat", TelemetryWindow::Day, &mut seeded(7))
            .unwrap();
        assert!(readings.iter().all(|r| (0.0..=100.0).contains(&r.moisture_level)));
    }

    #[test]
    fn window_parses_from_tab_labels() {
        assert_eq!("24h".parse::<TelemetryWindow>().unwrap(), TelemetryWindow::Day);
        assert_eq!("7d".parse::<TelemetryWindow>().unwrap(), TelemetryWindow::Week);
        assert!("30d".parse::<TelemetryWindow>().is_err());
    }
}
