use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::TimeDelta;

use crate::{
    price_feed::{PriceFeedConfig, UnknownCropPolicy},
    telemetry::{JitterRange, ThresholdPolicy},
};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Bounds of the random offset added to simulated moisture.
    pub jitter: JitterRange,
    /// `MOISTURE_THRESHOLD`: a percentage or `crop_floor`.
    pub threshold: ThresholdPolicy,
    pub price_feed: PriceFeedConfig,
    /// Price refresh interval in seconds; `0` disables the ticker.
    pub price_refresh_secs: u64,
    /// Fixed seed for the simulators; entropy when unset.
    pub simulator_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let jitter_min: f64 = parsed("JITTER_MIN", "0")?;
        let jitter_max: f64 = parsed("JITTER_MAX", "5")?;

        Ok(Self {
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: parsed("SERVER_PORT", "8080")?,
            jitter: JitterRange::new(jitter_min, jitter_max)
                .context("JITTER_MIN..JITTER_MAX must be a finite, ordered range")?,
            threshold: parse_threshold(&optional("MOISTURE_THRESHOLD", "40"))?,
            price_feed: PriceFeedConfig {
                stale_after: parse_stale_after(&optional("QUOTE_STALE_AFTER_MINS", "15"))?,
                unknown_crops: parsed("UNKNOWN_CROP_POLICY", "skip")?,
                ..Default::default()
            },
            price_refresh_secs: parsed("PRICE_REFRESH_SECS", "300")?,
            simulator_seed: std::env::var("SIMULATOR_SEED")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .context("SIMULATOR_SEED must be an unsigned integer")?,
        })
    }

    pub fn log_config(&self) {
        tracing::info!(
            addr = %format!("{}:{}", self.server_host, self.server_port),
            jitter = ?self.jitter,
            threshold = ?self.threshold,
            stale_after_mins = self.price_feed.stale_after.num_minutes(),
            unknown_crops = ?self.price_feed.unknown_crops,
            price_refresh_secs = self.price_refresh_secs,
            seeded = self.simulator_seed.is_some(),
            "Configuration loaded"
        );
    }
}

/// Parse `"crop_floor"` or a percentage in `[0, 100]`.
fn parse_threshold(raw: &str) -> Result<ThresholdPolicy> {
    if raw.trim() == "crop_floor" {
        return Ok(ThresholdPolicy::CropFloor);
    }
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("MOISTURE_THRESHOLD must be a percentage or 'crop_floor', got: {raw:?}"))?;
    if !(0.0..=100.0).contains(&value) {
        anyhow::bail!("MOISTURE_THRESHOLD must be within 0-100, got: {value}");
    }
    Ok(ThresholdPolicy::Global(value))
}

/// Parse a whole number of minutes into the quote staleness window.
fn parse_stale_after(raw: &str) -> Result<TimeDelta> {
    let minutes: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("QUOTE_STALE_AFTER_MINS must be a non-negative integer, got: {raw:?}"))?;
    TimeDelta::try_minutes(i64::from(minutes)).context("QUOTE_STALE_AFTER_MINS out of range")
}

fn parsed<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = optional(key, default);
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
