use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng};
use tokio::time;
use tracing::{error, info};

use crate::price_feed::PriceFeed;

/// Largest single-step price move, percent.
const MAX_STEP_PERCENT: f64 = 1.5;

/// Stand-in for a market-data poller: moves every cached price by a small
/// random step on each tick and republishes it through the feed.
pub struct PriceTicker {
    feed: PriceFeed,
    rng: StdRng,
    interval: Duration,
}

impl PriceTicker {
    pub fn new(feed: PriceFeed, rng: StdRng, interval_secs: u64) -> Self {
        Self {
            feed,
            rng,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Runs the refresh loop indefinitely.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Price ticker started");
        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; keep the seeded quotes for one period.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick_once(Utc::now()) {
                error!(error = %e, "Price refresh failed");
            }
        }
    }

    /// Republish every cached crop once. Returns how many quotes moved.
    pub fn tick_once(&mut self, at: DateTime<Utc>) -> anyhow::Result<usize> {
        let current = self.feed.cache().all();
        if current.is_empty() {
            info!("No quotes cached yet; skipping price refresh");
            return Ok(0);
        }

        for quote in &current {
            let step = self.rng.gen_range(-MAX_STEP_PERCENT..=MAX_STEP_PERCENT);
            let next = (f64::from(quote.price.amount) * (1.0 + step / 100.0)).round();
            self.feed.publish(quote.crop, (next as u32).max(1), at)?;
        }

        info!(quotes = current.len(), "Price refresh complete");
        Ok(current.len())
    }
}
