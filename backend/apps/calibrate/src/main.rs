//! Work Factor Calibration Tool
//!
//! Times one hash per configured work factor on this machine and prints a
//! JSON report with the recommended default. Reads the same `CREDENTIAL_*`
//! variables as the services that embed the hasher.

use std::env;

use anyhow::Context;
use credential::{CredentialHasher, HasherConfig, LatencyBand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lower edge of the latency band in milliseconds
const ENV_MIN_MS: &str = "CALIBRATE_MIN_MS";
/// Upper edge of the latency band in milliseconds
const ENV_MAX_MS: &str = "CALIBRATE_MAX_MS";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calibrate=info,credential=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = HasherConfig::from_env().context("invalid credential configuration")?;
    let hasher = CredentialHasher::new(config)?;
    let band = latency_band_from_env()?;

    tracing::info!(
        algorithm = %hasher.config().algorithm,
        min_ms = band.min_ms,
        max_ms = band.max_ms,
        "Starting calibration"
    );

    let report = tokio::task::spawn_blocking(move || credential::calibrate(&hasher, band))
        .await
        .context("calibration task failed")??;

    for sample in &report.samples {
        tracing::info!(
            work_factor = sample.work_factor,
            elapsed_ms = sample.elapsed_ms,
            within_band = sample.within_band,
            "Sample"
        );
    }

    match report.recommended {
        Some(work_factor) if work_factor != report.configured_default => {
            tracing::warn!(
                configured = report.configured_default,
                recommended = work_factor,
                "Configured work factor differs from recommendation"
            );
        }
        Some(work_factor) => {
            tracing::info!(recommended = work_factor, "Configured work factor is optimal");
        }
        None => {
            tracing::warn!("No work factor in the configured range fits the latency band");
        }
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn latency_band_from_env() -> anyhow::Result<LatencyBand> {
    let default = LatencyBand::default();
    let band = LatencyBand {
        min_ms: read_ms(ENV_MIN_MS)?.unwrap_or(default.min_ms),
        max_ms: read_ms(ENV_MAX_MS)?.unwrap_or(default.max_ms),
    };
    anyhow::ensure!(
        band.min_ms <= band.max_ms,
        "{ENV_MIN_MS} ({}) must not exceed {ENV_MAX_MS} ({})",
        band.min_ms,
        band.max_ms
    );
    Ok(band)
}

fn read_ms(key: &str) -> anyhow::Result<Option<u64>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{key} must be a whole number of milliseconds")),
        Err(_) => Ok(None),
    }
}
