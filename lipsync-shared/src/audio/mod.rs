// SPDX-License-Identifier: GPL-3.0-only
pub mod calibration;
pub mod fallback;
pub mod features;
pub mod scoring;
pub mod smoothing;

#[cfg(feature = "analysis")]
pub mod analyser;

pub use calibration::{CalibrationThresholds, ThresholdCalibrator};
pub use fallback::FallbackSelector;
pub use features::extract_features;
pub use scoring::{ScoreTable, VisemeScorer};
pub use smoothing::{TemporalSmoother, TimingState};
