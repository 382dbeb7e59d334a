// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;

/// Energy levels (byte scale) that separate silence from voice for one clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationThresholds {
    pub silence_threshold: f64,
    pub voice_threshold: f64,
}

impl Default for CalibrationThresholds {
    /// Thresholds in effect before any clip has been calibrated.
    fn default() -> Self {
        Self {
            silence_threshold: 15.0,
            voice_threshold: 25.0,
        }
    }
}

/// One-shot analysis of a decoded clip into [`CalibrationThresholds`].
#[derive(Debug, Clone, Default)]
pub struct ThresholdCalibrator {
    config: CalibrationConfig,
}

impl ThresholdCalibrator {
    #[must_use]
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Derive thresholds from the first channel of a clip.
    ///
    /// Never fails: clips too short to hold a single window yield the floors.
    #[must_use]
    pub fn calibrate(&self, samples: &[f32], sample_rate: u32) -> CalibrationThresholds {
        let mut energies = self.window_energies(samples);
        let cfg = &self.config;

        let thresholds = if energies.is_empty() {
            CalibrationThresholds {
                silence_threshold: cfg.silence_floor,
                voice_threshold: cfg.voice_floor,
            }
        } else {
            energies.sort_by(f64::total_cmp);
            let low = percentile(&energies, cfg.silence_percentile);
            let high = percentile(&energies, cfg.voice_percentile);
            CalibrationThresholds {
                silence_threshold: cfg.silence_floor.max(low * cfg.silence_scale),
                voice_threshold: cfg.voice_floor.max(high * cfg.voice_scale),
            }
        };

        log::info!(
            "Calibrated thresholds from {} samples at {sample_rate}Hz ({} windows) - silence: {:.1}, voice: {:.1}",
            samples.len(),
            energies.len(),
            thresholds.silence_threshold,
            thresholds.voice_threshold
        );

        thresholds
    }

    /// Mean absolute amplitude (byte scale) of each sampled window.
    ///
    /// Windows start every `window_size * stride` samples, where the stride
    /// keeps the count near `max_windows`. A window is only taken while its
    /// start lies strictly before `len - window_size`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn window_energies(&self, samples: &[f32]) -> Vec<f64> {
        let window = self.config.window_size;
        if window == 0 {
            return Vec::new();
        }
        let stride = (samples.len() / (window * self.config.max_windows.max(1))).max(1);
        let step = window * stride;
        let Some(limit) = samples.len().checked_sub(window) else {
            return Vec::new();
        };

        (0..limit)
            .step_by(step)
            .map(|start| {
                let total: f64 = samples[start..start + window]
                    .iter()
                    .map(|&s| f64::from(s.abs()) * 255.0)
                    .sum();
                total / window as f64
            })
            .collect()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], rank: f64) -> f64 {
    let index = ((sorted.len() as f64 * rank).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}
