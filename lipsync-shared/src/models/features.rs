// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};

/// One analyser snapshot: byte magnitudes per frequency bin, low to high.
pub type FrequencyFrame = Vec<u8>;

/// Scalar description of a single [`FrequencyFrame`].
///
/// Band averages are in byte units (0-255). Centroid, rolloff and
/// zero-crossing rate are normalised by the bin count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub total_energy: f64,
    pub very_low: f64,
    pub low: f64,
    pub low_mid: f64,
    pub mid: f64,
    pub mid_high: f64,
    pub high: f64,
    pub very_high: f64,
    pub spectral_centroid: f64,
    pub spectral_rolloff: f64,
    pub zero_crossing_rate: f64,
}

impl FeatureSet {
    /// The four coarse bands used by the fallback selector.
    #[must_use]
    pub fn coarse_bands(&self) -> CoarseBands {
        CoarseBands {
            very_low: self.very_low,
            low: self.low,
            mid: self.mid,
            high: self.high,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoarseBands {
    pub very_low: f64,
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}
