// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};

use crate::config::SmootherConfig;
use crate::models::history::{HistoryBuffer, PhonemeEvent};
use crate::models::viseme::Viseme;

/// Mutable state of the smoother between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingState {
    pub current: Viseme,
    /// Seconds the current label has been held. Only an accepted transition resets it.
    pub elapsed_in_label: f64,
    /// Playback time of the last accepted transition, `None` until the
    /// first one after a reset. Cooldown only applies once this is set.
    pub last_transition_time: Option<f64>,
}

impl Default for TimingState {
    fn default() -> Self {
        Self {
            current: Viseme::Silence,
            elapsed_in_label: 0.0,
            last_transition_time: None,
        }
    }
}

/// Why a requested label change did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Cooldown,
    MinimumDuration,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Held,
    Rejected(Rejection),
    Transitioned { from: Viseme, to: Viseme },
}

/// Debounces the raw label stream.
///
/// Labels must be held for a minimum time before a non-silence label can
/// replace them, and accepted transitions are spaced by a cooldown. Every
/// accepted transition records the outgoing label in a bounded history.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    config: SmootherConfig,
    state: TimingState,
    history: HistoryBuffer,
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(SmootherConfig::default())
    }
}

impl TemporalSmoother {
    #[must_use]
    pub fn new(config: SmootherConfig) -> Self {
        let history = HistoryBuffer::new(config.history_capacity);
        Self {
            config,
            state: TimingState::default(),
            history,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &TimingState {
        &self.state
    }

    #[must_use]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    #[must_use]
    pub fn current(&self) -> Viseme {
        self.state.current
    }

    /// Back to silence with no elapsed time, no previous transition and an
    /// empty history.
    pub fn reset(&mut self) {
        self.state = TimingState::default();
        self.history.clear();
    }

    /// Advance one tick using the configured nominal frame delta.
    pub fn tick(&mut self, raw: Viseme, now: f64) -> Viseme {
        self.tick_with_delta(raw, now, self.config.frame_delta)
    }

    /// Advance one tick, crediting `delta` seconds to a held label.
    pub fn tick_with_delta(&mut self, raw: Viseme, now: f64, delta: f64) -> Viseme {
        self.step(raw, now, delta);
        self.state.current
    }

    /// Like [`Self::tick_with_delta`] but reports what happened.
    pub fn step(&mut self, raw: Viseme, now: f64, delta: f64) -> TickOutcome {
        if raw == self.state.current {
            self.hold(delta);
            return TickOutcome::Held;
        }

        if self
            .state
            .last_transition_time
            .is_some_and(|last| now - last < self.config.transition_cooldown)
        {
            self.hold(delta);
            return TickOutcome::Rejected(Rejection::Cooldown);
        }

        let involves_silence = raw.is_silence() || self.state.current.is_silence();
        if !involves_silence && self.state.elapsed_in_label < self.config.min_phoneme_duration {
            self.hold(delta);
            return TickOutcome::Rejected(Rejection::MinimumDuration);
        }

        let from = self.state.current;
        let held = self.state.elapsed_in_label;
        let to = self.remap(from, raw, held);

        self.history.push(PhonemeEvent {
            viseme: from,
            duration: held,
            timestamp: now - held,
        });

        self.state = TimingState {
            current: to,
            elapsed_in_label: 0.0,
            last_transition_time: Some(now),
        };

        log::trace!("Transition {from} -> {to} at {now:.3}s after {held:.3}s (requested {raw})");
        TickOutcome::Transitioned { from, to }
    }

    fn hold(&mut self, delta: f64) {
        self.state.elapsed_in_label += delta.max(0.0);
    }

    /// Rewrite very short-lived transitions through a fixed table.
    #[must_use]
    pub fn remap(&self, from: Viseme, to: Viseme, held: f64) -> Viseme {
        if held >= self.config.remap_window {
            return to;
        }

        let early = held < self.config.remap_split;
        match (from, to) {
            (Viseme::Silence, Viseme::A | Viseme::O | Viseme::U) => Viseme::M,
            (Viseme::Silence, Viseme::E) => Viseme::Ch,
            (Viseme::Silence, Viseme::I) => Viseme::I,
            (Viseme::A, Viseme::I) | (Viseme::I, Viseme::A) => Viseme::E,
            (Viseme::O, Viseme::U) => Viseme::O,
            (Viseme::U, Viseme::O) => Viseme::U,
            (Viseme::A, Viseme::E) => {
                if early {
                    Viseme::A
                } else {
                    Viseme::E
                }
            }
            (Viseme::E, Viseme::A) => {
                if early {
                    Viseme::E
                } else {
                    Viseme::A
                }
            }
            _ => to,
        }
    }
}

#[cfg(test)]
#[path = "smoothing_tests.rs"]
mod tests;
