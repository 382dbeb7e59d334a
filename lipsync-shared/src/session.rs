// SPDX-License-Identifier: GPL-3.0-only

//! Per-clip classification session
//!
//! A session owns everything that changes while a clip plays: calibration
//! thresholds, the smoother's timing state and history, and the random
//! source used for ambiguous frames. The caller drives it once per tick.

use crate::audio::calibration::{CalibrationThresholds, ThresholdCalibrator};
use crate::audio::fallback::FallbackSelector;
use crate::audio::features::extract_features;
use crate::audio::scoring::{ScoreOutcome, VisemeScorer};
use crate::audio::smoothing::{TemporalSmoother, TickOutcome, TimingState};
use crate::config::LipSyncConfig;
use crate::error::Result;
use crate::models::features::FeatureSet;
use crate::models::history::HistoryBuffer;
use crate::models::viseme::Viseme;
use crate::utils::random::{EntropyRandom, RandomSource, SeededRandom};
use crate::validation::validate_frame_len;

/// Where a tick's raw label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    SilenceGate,
    Scored { score: u32 },
    Fallback,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub features: FeatureSet,
    pub raw: Viseme,
    pub source: LabelSource,
    pub outcome: TickOutcome,
    /// Label to render for this tick.
    pub viseme: Viseme,
}

pub struct LipSyncSession {
    config: LipSyncConfig,
    bin_count: usize,
    thresholds: CalibrationThresholds,
    calibrator: ThresholdCalibrator,
    scorer: VisemeScorer,
    fallback: FallbackSelector,
    smoother: TemporalSmoother,
    rng: Box<dyn RandomSource>,
}

impl std::fmt::Debug for LipSyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LipSyncSession")
            .field("bin_count", &self.bin_count)
            .field("thresholds", &self.thresholds)
            .field("timing", self.smoother.state())
            .field("history_len", &self.smoother.history().len())
            .finish_non_exhaustive()
    }
}

impl LipSyncSession {
    /// Session with an entropy-seeded random source.
    #[must_use]
    pub fn new(config: LipSyncConfig) -> Self {
        Self::with_random(config, Box::new(EntropyRandom::new()))
    }

    /// Session whose fallback choices replay exactly for a given seed.
    #[must_use]
    pub fn with_seed(config: LipSyncConfig, seed: u64) -> Self {
        Self::with_random(config, Box::new(SeededRandom::new(seed)))
    }

    #[must_use]
    pub fn with_random(config: LipSyncConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            bin_count: config.analyser.bin_count(),
            thresholds: CalibrationThresholds::default(),
            calibrator: ThresholdCalibrator::new(config.calibration.clone()),
            scorer: VisemeScorer::new(),
            fallback: FallbackSelector::new(),
            smoother: TemporalSmoother::new(config.smoother.clone()),
            config,
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &LipSyncConfig {
        &self.config
    }

    /// Fixed frame length for this session.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    #[must_use]
    pub fn thresholds(&self) -> CalibrationThresholds {
        self.thresholds
    }

    #[must_use]
    pub fn timing(&self) -> &TimingState {
        self.smoother.state()
    }

    #[must_use]
    pub fn history(&self) -> &HistoryBuffer {
        self.smoother.history()
    }

    /// Replace the thresholds with ones derived from a newly loaded clip.
    ///
    /// Must not be called while a playback is being driven.
    pub fn calibrate(&mut self, samples: &[f32], sample_rate: u32) -> CalibrationThresholds {
        self.thresholds = self.calibrator.calibrate(samples, sample_rate);
        self.thresholds
    }

    /// Playback (re)started: clear history and timing. Not for resuming a pause.
    pub fn start_playback(&mut self) {
        log::debug!("Playback started, resetting smoother state");
        self.smoother.reset();
    }

    /// Classify one frame and smooth the result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LipSyncError::BinCountMismatch`] when the frame length
    /// differs from [`Self::bin_count`]. The session state is left untouched.
    pub fn process_frame(&mut self, frame: &[u8], now: f64) -> Result<Viseme> {
        let delta = self.smoother.config().frame_delta;
        Ok(self.process_frame_detailed(frame, now, delta)?.viseme)
    }

    /// Like [`Self::process_frame`] with a measured tick duration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LipSyncError::BinCountMismatch`] on a wrong frame length.
    pub fn process_frame_with_delta(&mut self, frame: &[u8], now: f64, delta: f64) -> Result<Viseme> {
        Ok(self.process_frame_detailed(frame, now, delta)?.viseme)
    }

    /// Full per-tick pipeline with diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LipSyncError::BinCountMismatch`] on a wrong frame length.
    pub fn process_frame_detailed(
        &mut self,
        frame: &[u8],
        now: f64,
        delta: f64,
    ) -> Result<TickReport> {
        if let Err(e) = validate_frame_len(frame, self.bin_count) {
            log::warn!("Rejecting frame at {now:.3}s: {e}");
            return Err(e);
        }

        let features = extract_features(frame);
        let (raw, source) = self.raw_label(&features);
        let outcome = self.smoother.step(raw, now, delta);

        Ok(TickReport {
            features,
            raw,
            source,
            outcome,
            viseme: self.smoother.current(),
        })
    }

    fn raw_label(&mut self, features: &FeatureSet) -> (Viseme, LabelSource) {
        match self.scorer.classify(features, &self.thresholds) {
            ScoreOutcome::Silence => (Viseme::Silence, LabelSource::SilenceGate),
            ScoreOutcome::Confident { viseme, score } => (viseme, LabelSource::Scored { score }),
            ScoreOutcome::Ambiguous { .. } => {
                let viseme = self.fallback.select(
                    features.coarse_bands(),
                    self.smoother.history(),
                    self.rng.as_mut(),
                );
                (viseme, LabelSource::Fallback)
            }
        }
    }
}
