// SPDX-License-Identifier: GPL-3.0-only
use spectrum_analyzer::scaling::divide_by_N;
use spectrum_analyzer::windows::hann_window;
use spectrum_analyzer::{FrequencyLimit, samples_fft_to_spectrum};

use crate::config::AnalyserConfig;
use crate::models::features::FrequencyFrame;

/// Converts time-domain audio into byte frequency frames.
///
/// Each call looks at the most recent `fft_size` samples, windows them,
/// smooths the magnitudes against the previous call and maps decibels in
/// `[min_decibels, max_decibels]` onto `0..=255`. The smoothing memory makes
/// this stateful: use one analyser per playback and [`Self::reset`] on restart.
#[derive(Debug, Clone)]
pub struct FrequencyAnalyser {
    sample_rate: u32,
    config: AnalyserConfig,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    #[must_use]
    pub fn new(sample_rate: u32, config: AnalyserConfig) -> Self {
        let smoothed = vec![0.0; config.bin_count()];
        Self {
            sample_rate,
            config,
            smoothed,
        }
    }

    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Forget the smoothing memory.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Produce the frame for the audio that ends at the last element of `samples`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn analyse(&mut self, samples: &[f32]) -> FrequencyFrame {
        let fft_size = self.config.fft_size;
        let bin_count = self.bin_count();

        // Take the most recent samples, zero-padded in front when short
        let mut block = vec![0.0f32; fft_size];
        let tail = &samples[samples.len().saturating_sub(fft_size)..];
        block[fft_size - tail.len()..].copy_from_slice(tail);
        for sample in &mut block {
            if !sample.is_finite() {
                *sample = 0.0;
            }
        }

        // Apply Hann window to reduce spectral leakage
        let windowed = hann_window(&block);

        let magnitudes: Vec<f32> = match samples_fft_to_spectrum(
            &windowed,
            self.sample_rate,
            FrequencyLimit::All,
            Some(&divide_by_N),
        ) {
            Ok(spectrum) => {
                let data = spectrum.data();
                (0..bin_count)
                    .map(|i| data.get(i).map_or(0.0, |(_, amplitude)| amplitude.val()))
                    .collect()
            }
            Err(e) => {
                log::warn!("FFT analysis failed: {e}, returning a silent frame");
                vec![0.0; bin_count]
            }
        };

        let tau = self.config.smoothing_time_constant as f32;
        let min_db = self.config.min_decibels;
        let range_db = self.config.max_decibels - min_db;

        self.smoothed
            .iter_mut()
            .zip(magnitudes)
            .map(|(previous, magnitude)| {
                *previous = tau * *previous + (1.0 - tau) * magnitude.abs();
                let db = if *previous > 0.0 {
                    20.0 * f64::from(*previous).log10()
                } else {
                    f64::NEG_INFINITY
                };
                let scaled = 255.0 * (db - min_db) / range_db;
                scaled.clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}
