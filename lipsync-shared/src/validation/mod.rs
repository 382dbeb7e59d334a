// SPDX-License-Identifier: GPL-3.0-only
//! Input validation for frames, sample buffers and configuration values

use crate::error::{LipSyncError, Result};

/// Accepted input limits
pub mod limits {
    /// Maximum sample rate (Hz)
    pub const MAX_SAMPLE_RATE: u32 = 192_000;

    /// Minimum sample rate (Hz)
    pub const MIN_SAMPLE_RATE: u32 = 8_000;

    /// Slowest display tick rate (Hz)
    pub const MIN_TICK_RATE_HZ: f64 = 1.0;

    /// Fastest display tick rate (Hz)
    pub const MAX_TICK_RATE_HZ: f64 = 1_000.0;
}

/// Check that a frame matches the session's fixed bin count
///
/// # Errors
/// Returns [`LipSyncError::BinCountMismatch`] when the lengths differ.
pub fn validate_frame_len(frame: &[u8], expected: usize) -> Result<()> {
    if frame.len() != expected {
        return Err(LipSyncError::BinCountMismatch {
            expected,
            actual: frame.len(),
        });
    }
    Ok(())
}

/// Validate sample rate
///
/// # Errors
/// Returns [`LipSyncError::InvalidSampleRate`] when `rate` is outside the
/// supported range.
pub fn validate_sample_rate(rate: u32) -> Result<()> {
    if !(limits::MIN_SAMPLE_RATE..=limits::MAX_SAMPLE_RATE).contains(&rate) {
        return Err(LipSyncError::InvalidSampleRate {
            rate,
            min: limits::MIN_SAMPLE_RATE,
            max: limits::MAX_SAMPLE_RATE,
        });
    }
    Ok(())
}

pub(crate) fn validate_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(LipSyncError::InvalidConfig {
            field,
            reason: format!("{value} must be a positive number"),
        });
    }
    Ok(())
}

pub(crate) fn validate_nonzero(field: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(LipSyncError::InvalidConfig {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_fraction(field: &'static str, value: f64) -> Result<()> {
    if !(0.0..1.0).contains(&value) {
        return Err(LipSyncError::InvalidConfig {
            field,
            reason: format!("{value} is outside [0, 1)"),
        });
    }
    Ok(())
}
