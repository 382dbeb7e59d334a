// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;

/// Errors raised by the classification core.
///
/// Ambiguous or silent frames are not errors; they resolve to a label.
#[derive(Debug, thiserror::Error)]
pub enum LipSyncError {
    #[error("Frequency frame has {actual} bins, session expects {expected}")]
    BinCountMismatch { expected: usize, actual: usize },

    #[error("Invalid sample rate: {rate} (must be {min}-{max} Hz)")]
    InvalidSampleRate { rate: u32, min: u32, max: u32 },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Failed to access config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T, E = LipSyncError> = std::result::Result<T, E>;
