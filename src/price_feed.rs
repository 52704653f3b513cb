//! Crop price ticker backed by a bounded latest-quote cache.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    catalog::Crop,
    error::{AdvisoryError, Result},
    quote_cache::QuoteCache,
};

// ---------------------------------------------------------------------------
// Quote types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Whole-rupee price for a unit of produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Price {
    pub amount: u32,
    pub currency: String,
    pub unit: String,
}

impl Price {
    pub fn per_quintal(amount: u32) -> Self {
        Self {
            amount,
            currency: "₹".to_owned(),
            unit: "qtl".to_owned(),
        }
    }
}

/// Renders as `₹2,125/qtl`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.amount.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{}{}/{}", self.currency, grouped, self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PriceQuote {
    pub crop: Crop,
    pub price: Price,
    /// Change against the previous quote, percent.
    pub trend_percent: f64,
    pub trend_direction: TrendDirection,
    pub as_of: DateTime<Utc>,
    /// Older than the feed's staleness window at fetch time.
    pub stale: bool,
}

impl PriceQuote {
    /// Signed one-decimal label, e.g. `+1.2%`, `-0.5%`, `0.0%`.
    pub fn trend_label(&self) -> String {
        if self.trend_percent > 0.0 {
            format!("+{:.1}%", self.trend_percent)
        } else if self.trend_percent < 0.0 {
            format!("{:.1}%", self.trend_percent)
        } else {
            "0.0%".to_owned()
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What `fetch_quotes` does with a name outside the crop catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCropPolicy {
    #[default]
    Skip,
    Reject,
}

impl FromStr for UnknownCropPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "skip" => Ok(Self::Skip),
            "reject" => Ok(Self::Reject),
            other => Err(anyhow::anyhow!("unknown crop policy: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PriceFeedConfig {
    pub stale_after: TimeDelta,
    pub unknown_crops: UnknownCropPolicy,
    /// Absolute percent change still reported as `STABLE`.
    pub stable_band: f64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            stale_after: TimeDelta::minutes(15),
            unknown_crops: UnknownCropPolicy::Skip,
            stable_band: 0.05,
        }
    }
}

/// Opening mandi prices: `(crop, ₹ per quintal, trend percent)`.
const REFERENCE_PRICES: [(Crop, u32, f64); 8] = [
    (Crop::Wheat, 2125, 1.2),
    (Crop::Rice, 1940, -0.5),
    (Crop::Maize, 2090, 0.0),
    (Crop::Sugarcane, 340, 0.0),
    (Crop::Cotton, 6100, 0.0),
    (Crop::Soybean, 4600, 0.0),
    (Crop::Mustard, 5450, 2.4),
    (Crop::Jowar, 3180, 0.0),
];

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PriceFeed {
    cache: QuoteCache,
    config: PriceFeedConfig,
}

impl PriceFeed {
    /// Feed over a fresh cache seeded with reference prices stamped `as_of`.
    pub fn new(config: PriceFeedConfig, as_of: DateTime<Utc>) -> Self {
        let feed = Self::with_cache(QuoteCache::new(), config);
        for (crop, amount, trend_percent) in REFERENCE_PRICES {
            feed.cache.update(PriceQuote {
                crop,
                price: Price::per_quintal(amount),
                trend_percent,
                trend_direction: feed.direction(trend_percent),
                as_of,
                stale: false,
            });
        }
        info!(quotes = feed.cache.len(), "Price feed seeded with reference quotes");
        feed
    }

    pub fn with_cache(cache: QuoteCache, config: PriceFeedConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    pub fn fetch_quotes<S: AsRef<str>>(&self, crops: &[S]) -> Result<BTreeMap<Crop, PriceQuote>> {
        self.fetch_quotes_at(crops, Utc::now())
    }

    /// Latest quote for each requested crop, marked stale when older than
    /// the configured window at `now`. Duplicate names collapse into one
    /// entry; crops with no cached quote are left out.
    pub fn fetch_quotes_at<S: AsRef<str>>(
        &self,
        crops: &[S],
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<Crop, PriceQuote>> {
        if crops.is_empty() {
            return Err(AdvisoryError::invalid("crops", "[]"));
        }

        let mut quotes = BTreeMap::new();
        for name in crops {
            let name = name.as_ref();
            let crop = match (name.parse::<Crop>(), self.config.unknown_crops) {
                (Ok(crop), _) => crop,
                (Err(e), UnknownCropPolicy::Reject) => return Err(e),
                (Err(_), UnknownCropPolicy::Skip) => {
                    debug!(crop = %name, "Skipping unknown crop in price request");
                    continue;
                }
            };
            if let Some(mut quote) = self.cache.get(crop) {
                quote.stale = now - quote.as_of > self.config.stale_after;
                quotes.insert(crop, quote);
            }
        }
        Ok(quotes)
    }

    /// Record a new price for `crop`, deriving the trend from the previous
    /// cached quote.
    pub fn publish(&self, crop: Crop, amount: u32, at: DateTime<Utc>) -> Result<PriceQuote> {
        if amount == 0 {
            return Err(AdvisoryError::invalid("price", amount));
        }

        let trend_percent = match self.cache.get(crop) {
            Some(prev) if prev.price.amount > 0 => {
                let prev = f64::from(prev.price.amount);
                ((f64::from(amount) - prev) / prev * 1000.0).round() / 10.0
            }
            _ => 0.0,
        };

        let quote = PriceQuote {
            crop,
            price: Price::per_quintal(amount),
            trend_percent,
            trend_direction: self.direction(trend_percent),
            as_of: at,
            stale: false,
        };
        self.cache.update(quote.clone());
        debug!(crop = %crop, price = %quote.price, trend = %quote.trend_label(), "Published quote");
        Ok(quote)
    }

    fn direction(&self, trend_percent: f64) -> TrendDirection {
        if trend_percent.abs() < self.config.stable_band {
            TrendDirection::Stable
        } else if trend_percent > 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    }
}
