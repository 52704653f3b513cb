//! Simulated soil telemetry, irrigation advisories and a crop price ticker
//! for an irrigation-monitoring dashboard.
//!
//! The three components in [`telemetry`], [`advisor`] and [`price_feed`] are
//! independent and synchronous; [`api`] exposes them over HTTP.

pub mod advisor;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod price_feed;
pub mod price_ticker;
pub mod quote_cache;
pub mod telemetry;
pub mod weather;

pub use advisor::{AdvisoryRequest, AdvisorySnapshot, Decision, IrrigationAdvisor};
pub use catalog::{Crop, Region};
pub use error::AdvisoryError;
pub use price_feed::{PriceFeed, PriceQuote, TrendDirection};
pub use telemetry::{Reading, TelemetrySimulator, TelemetryWindow};
