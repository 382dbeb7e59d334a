// SPDX-License-Identifier: GPL-3.0-only
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LipSyncError, Result};
use crate::models::history::DEFAULT_HISTORY_CAPACITY;
use crate::validation::{limits, validate_fraction, validate_nonzero, validate_positive};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipSyncConfig {
    pub smoother: SmootherConfig,
    pub calibration: CalibrationConfig,
    pub analyser: AnalyserConfig,
}

/// Timing rules for the temporal smoother. All durations are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// A non-silence label must be held this long before another non-silence label replaces it.
    pub min_phoneme_duration: f64,
    /// Minimum gap between two accepted transitions.
    pub transition_cooldown: f64,
    /// Per-tick increment used when the caller supplies no delta.
    pub frame_delta: f64,
    pub history_capacity: usize,
    /// Transitions leaving a label held for less than this go through the remap table.
    pub remap_window: f64,
    /// Splits the `a_e` / `e_a` remaps.
    pub remap_split: f64,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            min_phoneme_duration: 0.08,
            transition_cooldown: 0.05,
            frame_delta: 0.016,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            remap_window: 0.06,
            remap_split: 0.03,
        }
    }
}

/// Parameters of the one-shot silence/voice threshold calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub window_size: usize,
    /// Upper bound on the number of windows sampled across a clip.
    pub max_windows: usize,
    pub silence_floor: f64,
    pub voice_floor: f64,
    pub silence_percentile: f64,
    pub voice_percentile: f64,
    pub silence_scale: f64,
    pub voice_scale: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_size: 1024,
            max_windows: 100,
            silence_floor: 8.0,
            voice_floor: 15.0,
            silence_percentile: 0.2,
            voice_percentile: 0.6,
            silence_scale: 0.8,
            voice_scale: 0.9,
        }
    }
}

/// Shape of the frequency frames fed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    pub fft_size: usize,
    pub smoothing_time_constant: f64,
    pub min_decibels: f64,
    pub max_decibels: f64,
    pub tick_rate_hz: f64,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            smoothing_time_constant: 0.3,
            min_decibels: -100.0,
            max_decibels: -30.0,
            tick_rate_hz: 60.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of bins in every frame of a session.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

impl LipSyncConfig {
    /// Get the config file path
    #[must_use]
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".config")
            })
            .join("lipsync");

        config_dir.join("config.toml")
    }

    /// Load configuration from the default location, falling back to defaults
    #[must_use]
    pub fn load() -> Self {
        let config_path = Self::default_path();

        match Self::load_from(&config_path) {
            Ok(config) => {
                debug!("Loaded config from {}", config_path.display());
                config
            }
            Err(LipSyncError::ConfigIo { source, .. }) => {
                debug!(
                    "Config file {} not found or unreadable: {source}. Using defaults.",
                    config_path.display()
                );
                Self::default()
            }
            Err(e) => {
                warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Load and validate configuration from an explicit path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| LipSyncError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| LipSyncError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save configuration to an explicit path
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, serialization
    /// fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| LipSyncError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        fs::write(path, self.to_toml()?).map_err(io_err)?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Render as pretty TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every tunable for a usable value
    ///
    /// # Errors
    ///
    /// Returns [`LipSyncError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let s = &self.smoother;
        validate_positive("smoother.min_phoneme_duration", s.min_phoneme_duration)?;
        validate_positive("smoother.transition_cooldown", s.transition_cooldown)?;
        validate_positive("smoother.frame_delta", s.frame_delta)?;
        validate_nonzero("smoother.history_capacity", s.history_capacity)?;
        validate_positive("smoother.remap_window", s.remap_window)?;
        validate_positive("smoother.remap_split", s.remap_split)?;
        if s.remap_split > s.remap_window {
            return Err(LipSyncError::InvalidConfig {
                field: "smoother.remap_split",
                reason: format!(
                    "{} must not exceed remap_window ({})",
                    s.remap_split, s.remap_window
                ),
            });
        }

        let c = &self.calibration;
        validate_nonzero("calibration.window_size", c.window_size)?;
        validate_nonzero("calibration.max_windows", c.max_windows)?;
        validate_fraction("calibration.silence_percentile", c.silence_percentile)?;
        validate_fraction("calibration.voice_percentile", c.voice_percentile)?;
        validate_positive("calibration.silence_scale", c.silence_scale)?;
        validate_positive("calibration.voice_scale", c.voice_scale)?;

        let a = &self.analyser;
        if a.fft_size < 32 || !a.fft_size.is_power_of_two() {
            return Err(LipSyncError::InvalidConfig {
                field: "analyser.fft_size",
                reason: format!("{} is not a power of two >= 32", a.fft_size),
            });
        }
        if !(0.0..1.0).contains(&a.smoothing_time_constant) {
            return Err(LipSyncError::InvalidConfig {
                field: "analyser.smoothing_time_constant",
                reason: format!("{} is outside [0, 1)", a.smoothing_time_constant),
            });
        }
        if a.min_decibels >= a.max_decibels {
            return Err(LipSyncError::InvalidConfig {
                field: "analyser.min_decibels",
                reason: format!(
                    "{} must be below max_decibels ({})",
                    a.min_decibels, a.max_decibels
                ),
            });
        }
        if !(limits::MIN_TICK_RATE_HZ..=limits::MAX_TICK_RATE_HZ).contains(&a.tick_rate_hz) {
            return Err(LipSyncError::InvalidConfig {
                field: "analyser.tick_rate_hz",
                reason: format!(
                    "{} is outside {}-{} Hz",
                    a.tick_rate_hz,
                    limits::MIN_TICK_RATE_HZ,
                    limits::MAX_TICK_RATE_HZ
                ),
            });
        }

        Ok(())
    }
}
