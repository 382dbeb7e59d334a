// SPDX-License-Identifier: GPL-3.0-only

//! Playback results
//!
//! A [`Timeline`] records the label shown on every tick. Runs of equal labels
//! collapse into [`Cue`]s, which is what a renderer usually wants to consume.

use anyhow::Result;
use chrono::{DateTime, Utc};
use lipsync_shared::audio::calibration::CalibrationThresholds;
use lipsync_shared::{MouthAsset, Viseme};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Full report with cues and per-tick labels.
    #[default]
    Json,
    /// One line per tick.
    Text,
    /// One line per cue.
    Cues,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedViseme {
    pub time: f64,
    pub viseme: Viseme,
}

/// A run of ticks showing the same mouth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub viseme: Viseme,
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    tick_rate_hz: f64,
    ticks: Vec<TimedViseme>,
}

impl Timeline {
    #[must_use]
    pub fn new(tick_rate_hz: f64) -> Self {
        Self {
            tick_rate_hz,
            ticks: Vec::new(),
        }
    }

    pub fn push(&mut self, time: f64, viseme: Viseme) {
        self.ticks.push(TimedViseme { time, viseme });
    }

    #[must_use]
    pub fn ticks(&self) -> &[TimedViseme] {
        &self.ticks
    }

    #[must_use]
    pub fn tick_rate_hz(&self) -> f64 {
        self.tick_rate_hz
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Collapse consecutive equal labels. The last cue lasts one tick past
    /// the final sample.
    #[must_use]
    pub fn cues(&self) -> Vec<Cue> {
        let tick = 1.0 / self.tick_rate_hz;
        let mut cues: Vec<Cue> = Vec::new();

        for entry in &self.ticks {
            match cues.last_mut() {
                Some(cue) if cue.viseme == entry.viseme => {}
                Some(cue) => {
                    cue.end = entry.time;
                    cues.push(new_cue(entry));
                }
                None => cues.push(new_cue(entry)),
            }
        }

        if let (Some(cue), Some(last)) = (cues.last_mut(), self.ticks.last()) {
            cue.end = last.time + tick;
        }
        cues
    }
}

fn new_cue(entry: &TimedViseme) -> Cue {
    Cue {
        start: entry.time,
        end: entry.time,
        viseme: entry.viseme,
        asset: MouthAsset::for_viseme(entry.viseme).file_name(),
    }
}

/// Everything written by `--format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub sample_rate: u32,
    pub duration: f64,
    pub tick_rate_hz: f64,
    pub thresholds: CalibrationThresholds,
    pub cues: Vec<Cue>,
    pub ticks: Vec<TimedViseme>,
}

impl TimelineReport {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        sample_rate: u32,
        duration: f64,
        thresholds: CalibrationThresholds,
        timeline: &Timeline,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.into(),
            sample_rate,
            duration,
            tick_rate_hz: timeline.tick_rate_hz(),
            thresholds,
            cues: timeline.cues(),
            ticks: timeline.ticks().to_vec(),
        }
    }

    /// Render in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialisation fails.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let mut out = String::new();
        match format {
            OutputFormat::Json => out = serde_json::to_string_pretty(self)?,
            OutputFormat::Text => {
                for tick in &self.ticks {
                    writeln!(out, "{:.3}\t{}", tick.time, tick.viseme)?;
                }
            }
            OutputFormat::Cues => {
                for cue in &self.cues {
                    writeln!(
                        out,
                        "{:.3}\t{:.3}\t{}\t{}",
                        cue.start, cue.end, cue.viseme, cue.asset
                    )?;
                }
            }
        }
        Ok(out)
    }
}
