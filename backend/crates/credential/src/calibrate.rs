//! Work Factor Calibration
//!
//! Measures hashing latency across the configured work factor range on the
//! current machine and picks the costliest factor that still fits the
//! interactive latency band.

use std::time::Instant;

use serde::Serialize;

use crate::config::Algorithm;
use crate::error::CredentialResult;
use crate::hasher::CredentialHasher;

/// Throwaway credential hashed during calibration
const PROBE_CREDENTIAL: &str = "calibration-probe-credential";

/// Acceptable latency for one interactive hash, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyBand {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for LatencyBand {
    fn default() -> Self {
        Self {
            min_ms: 50,
            max_ms: 500,
        }
    }
}

impl LatencyBand {
    pub fn contains(&self, elapsed_ms: u64) -> bool {
        (self.min_ms..=self.max_ms).contains(&elapsed_ms)
    }
}

/// One timed hash
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationSample {
    pub work_factor: u32,
    pub elapsed_ms: u64,
    pub within_band: bool,
}

/// Result of a calibration run
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub algorithm: Algorithm,
    pub band: LatencyBand,
    pub configured_default: u32,
    pub samples: Vec<CalibrationSample>,
    /// Largest sampled work factor inside the band
    pub recommended: Option<u32>,
}

/// Time one hash per work factor, cheapest first
///
/// Stops after the first sample slower than the band, since every higher
/// factor is slower still.
pub fn calibrate(hasher: &CredentialHasher, band: LatencyBand) -> CredentialResult<CalibrationReport> {
    let config = hasher.config();
    let mut samples = Vec::new();

    for work_factor in config.range() {
        let start = Instant::now();
        hasher.hash(PROBE_CREDENTIAL, work_factor)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let sample = CalibrationSample {
            work_factor,
            elapsed_ms,
            within_band: band.contains(elapsed_ms),
        };
        tracing::debug!(
            algorithm = %config.algorithm,
            work_factor,
            elapsed_ms,
            within_band = sample.within_band,
            "Calibration sample"
        );
        samples.push(sample);

        if elapsed_ms > band.max_ms {
            break;
        }
    }

    let recommended = samples
        .iter()
        .filter(|s| s.within_band)
        .map(|s| s.work_factor)
        .max();

    Ok(CalibrationReport {
        algorithm: config.algorithm,
        band,
        configured_default: config.work_factor,
        samples,
        recommended,
    })
}
