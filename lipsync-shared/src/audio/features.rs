// SPDX-License-Identifier: GPL-3.0-only
use crate::models::features::FeatureSet;

/// Inclusive bin range of a named band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandRange {
    pub start: usize,
    pub end: usize,
}

pub const VERY_LOW_BAND: BandRange = BandRange { start: 0, end: 4 };
pub const LOW_BAND: BandRange = BandRange { start: 5, end: 12 };
pub const LOW_MID_BAND: BandRange = BandRange { start: 13, end: 25 };
pub const MID_BAND: BandRange = BandRange { start: 26, end: 50 };
pub const MID_HIGH_BAND: BandRange = BandRange { start: 51, end: 80 };
pub const HIGH_BAND: BandRange = BandRange { start: 81, end: 110 };
pub const VERY_HIGH_BAND: BandRange = BandRange {
    start: 111,
    end: 127,
};

pub const ROLLOFF_THRESHOLD: f64 = 0.85;

/// Compute the full feature set of one frame.
#[must_use]
pub fn extract_features(frame: &[u8]) -> FeatureSet {
    FeatureSet {
        total_energy: mean(frame),
        very_low: band_average(frame, VERY_LOW_BAND),
        low: band_average(frame, LOW_BAND),
        low_mid: band_average(frame, LOW_MID_BAND),
        mid: band_average(frame, MID_BAND),
        mid_high: band_average(frame, MID_HIGH_BAND),
        high: band_average(frame, HIGH_BAND),
        very_high: band_average(frame, VERY_HIGH_BAND),
        spectral_centroid: spectral_centroid(frame),
        spectral_rolloff: spectral_rolloff(frame, ROLLOFF_THRESHOLD),
        zero_crossing_rate: zero_crossing_rate(frame),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(frame: &[u8]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    sum(frame) / frame.len() as f64
}

fn sum(frame: &[u8]) -> f64 {
    frame.iter().map(|&m| f64::from(m)).sum()
}

/// Mean magnitude over `range`, clamped to the frame. Empty ranges average to 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn band_average(frame: &[u8], range: BandRange) -> f64 {
    let Some(last) = frame.len().checked_sub(1) else {
        return 0.0;
    };
    let end = range.end.min(last);
    if range.start > end {
        return 0.0;
    }
    let bins = &frame[range.start..=end];
    sum(bins) / bins.len() as f64
}

/// Energy-weighted mean bin index, normalised to `[0, 1)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn spectral_centroid(frame: &[u8]) -> f64 {
    let (numerator, denominator) = frame
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &m)| {
            let m = f64::from(m);
            (num + i as f64 * m, den + m)
        });

    if denominator > 0.0 {
        numerator / (denominator * frame.len() as f64)
    } else {
        0.0
    }
}

/// Normalised index at which the cumulative magnitude first reaches
/// `threshold` of the total. Frames with no energy roll off at 1.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn spectral_rolloff(frame: &[u8], threshold: f64) -> f64 {
    let total = sum(frame);
    if total <= 0.0 {
        return 1.0;
    }
    let target = total * threshold;

    let mut cumulative = 0.0;
    for (i, &m) in frame.iter().enumerate() {
        cumulative += f64::from(m);
        if cumulative >= target {
            return i as f64 / frame.len() as f64;
        }
    }

    1.0
}

/// Fraction of adjacent bins whose deviation from the frame mean flips sign.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn zero_crossing_rate(frame: &[u8]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let mean = mean(frame);

    let crossings = frame
        .windows(2)
        .filter(|pair| (f64::from(pair[1]) - mean) * (f64::from(pair[0]) - mean) < 0.0)
        .count();

    crossings as f64 / frame.len() as f64
}
