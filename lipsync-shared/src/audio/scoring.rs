// SPDX-License-Identifier: GPL-3.0-only
use crate::audio::calibration::CalibrationThresholds;
use crate::models::features::FeatureSet;
use crate::models::viseme::Viseme;

/// Scores below this are too weak to trust.
pub const MIN_CONFIDENT_SCORE: u32 = 2;

/// Per-category scores for one frame, in [`Viseme::SCORED`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTable {
    scores: [u32; 10],
}

impl ScoreTable {
    #[must_use]
    pub fn get(&self, viseme: Viseme) -> u32 {
        Viseme::SCORED
            .iter()
            .position(|&v| v == viseme)
            .map_or(0, |i| self.scores[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Viseme, u32)> + '_ {
        Viseme::SCORED.iter().copied().zip(self.scores.iter().copied())
    }

    /// Highest-scoring category; the earliest one wins ties.
    #[must_use]
    pub fn best(&self) -> (Viseme, u32) {
        self.iter()
            .fold((Viseme::SCORED[0], self.scores[0]), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            })
    }
}

/// Result of scoring a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// Energy below the silence threshold; scoring was skipped.
    Silence,
    Confident { viseme: Viseme, score: u32 },
    /// No category reached [`MIN_CONFIDENT_SCORE`].
    Ambiguous { best: Viseme, score: u32 },
}

/// Rule-based scorer over frame features.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisemeScorer;

impl VisemeScorer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn classify(
        &self,
        features: &FeatureSet,
        thresholds: &CalibrationThresholds,
    ) -> ScoreOutcome {
        if features.total_energy < thresholds.silence_threshold {
            return ScoreOutcome::Silence;
        }

        let (viseme, score) = self.score(features, thresholds).best();
        if score < MIN_CONFIDENT_SCORE {
            ScoreOutcome::Ambiguous {
                best: viseme,
                score,
            }
        } else {
            ScoreOutcome::Confident { viseme, score }
        }
    }

    #[must_use]
    pub fn score(&self, f: &FeatureSet, thresholds: &CalibrationThresholds) -> ScoreTable {
        ScoreTable {
            scores: [
                score_a(f, thresholds.voice_threshold),
                score_e(f),
                score_i(f),
                score_o(f),
                score_u(f),
                score_m(f),
                score_r(f),
                score_l(f),
                score_ch(f),
                score_q(f),
            ],
        }
    }
}

fn points(condition: bool, value: u32) -> u32 {
    if condition { value } else { 0 }
}

fn between(value: f64, low: f64, high: f64) -> bool {
    value > low && value < high
}

fn score_a(f: &FeatureSet, voice_threshold: f64) -> u32 {
    points(f.low > 35.0 && f.mid > 30.0, 3)
        + points(between(f.spectral_centroid, 0.3, 0.6), 2)
        + points(f.total_energy > voice_threshold, 1)
        + points(f.low / (f.mid + 1.0) > 0.8, 1)
}

fn score_e(f: &FeatureSet) -> u32 {
    points(f.mid > 35.0 && f.mid_high > 25.0, 3)
        + points(between(f.spectral_centroid, 0.4, 0.7), 2)
        + points(f.mid > f.low_mid * 1.2, 1)
}

fn score_i(f: &FeatureSet) -> u32 {
    points(f.high > 40.0, 3)
        + points(f.very_high > 30.0, 2)
        + points(f.spectral_centroid > 0.6, 2)
        + points(f.high > f.mid_high * 1.3, 1)
}

fn score_o(f: &FeatureSet) -> u32 {
    points(f.low > 45.0 && f.very_low > 25.0, 3)
        + points(f.spectral_rolloff < 0.4, 2)
        + points(f.low > f.mid * 1.5, 2)
}

fn score_u(f: &FeatureSet) -> u32 {
    points(f.very_low > 40.0 && f.low > 35.0, 3)
        + points(f.spectral_rolloff < 0.3, 3)
        + points(f.very_low > f.low * 0.9, 1)
}

fn score_m(f: &FeatureSet) -> u32 {
    points(f.very_low > 30.0 && f.low > 25.0, 2) + points(f.zero_crossing_rate < 0.3, 2)
}

fn score_r(f: &FeatureSet) -> u32 {
    points(f.low_mid > 30.0 && f.mid > 25.0, 2) + points(f.zero_crossing_rate > 0.4, 3)
}

fn score_l(f: &FeatureSet) -> u32 {
    points(f.mid > 30.0 && f.mid_high > 20.0, 2)
        + points(between(f.spectral_centroid, 0.35, 0.65), 2)
}

fn score_ch(f: &FeatureSet) -> u32 {
    points(f.high > 45.0 && f.very_high > 30.0, 3) + points(f.zero_crossing_rate > 0.6, 2)
}

fn score_q(f: &FeatureSet) -> u32 {
    points(f.mid > 35.0 && f.low_mid > 25.0 && f.high < 35.0, 2)
}
