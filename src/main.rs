use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use precision_irrigation::{
    advisor::IrrigationAdvisor,
    api::{self, AppState},
    config::Config,
    price_feed::PriceFeed,
    price_ticker::PriceTicker,
    telemetry::TelemetrySimulator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent; env vars may be set externally)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.log_config();

    let rng = || match config.simulator_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let prices = PriceFeed::new(config.price_feed, Utc::now());

    if config.price_refresh_secs > 0 {
        let ticker = PriceTicker::new(prices.clone(), rng(), config.price_refresh_secs);
        tokio::spawn(ticker.run());
    } else {
        info!("Price ticker disabled; serving reference quotes");
    }

    let state = AppState {
        simulator: TelemetrySimulator::new(config.jitter, config.threshold)?,
        advisor: IrrigationAdvisor::default(),
        prices,
        rng: Arc::new(Mutex::new(rng())),
    };

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
