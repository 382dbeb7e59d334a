// SPDX-License-Identifier: GPL-3.0-only
pub mod audio;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod utils;
pub mod validation;

// Re-export commonly used types for convenience
pub use config::LipSyncConfig;
pub use error::LipSyncError;
pub use models::*;
pub use session::LipSyncSession;
pub use utils::random::{EntropyRandom, RandomSource, SeededRandom};

#[cfg(feature = "analysis")]
pub use audio::analyser::FrequencyAnalyser;
