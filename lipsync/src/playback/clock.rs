// SPDX-License-Identifier: GPL-3.0-only
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockState {
    Stopped,
    Running { started_at: Instant, offset: Duration },
    Paused { offset: Duration },
}

/// Playback position that survives pause/resume.
///
/// Time only advances while running; pausing freezes the position and
/// resuming continues from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackClock {
    state: ClockState,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ClockState::Stopped,
        }
    }

    /// Start from zero, discarding any previous position.
    pub fn start(&mut self, now: Instant) {
        self.state = ClockState::Running {
            started_at: now,
            offset: Duration::ZERO,
        };
    }

    pub fn pause(&mut self, now: Instant) {
        if let ClockState::Running { .. } = self.state {
            self.state = ClockState::Paused {
                offset: self.elapsed(now),
            };
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let ClockState::Paused { offset } = self.state {
            self.state = ClockState::Running {
                started_at: now,
                offset,
            };
        }
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self.state, ClockState::Paused { .. })
    }

    fn elapsed(&self, now: Instant) -> Duration {
        match self.state {
            ClockState::Stopped => Duration::ZERO,
            ClockState::Running { started_at, offset } => {
                offset + now.saturating_duration_since(started_at)
            }
            ClockState::Paused { offset } => offset,
        }
    }

    /// Playback position in seconds, or `None` when stopped.
    #[must_use]
    pub fn position(&self, now: Instant) -> Option<f64> {
        match self.state {
            ClockState::Stopped => None,
            _ => Some(self.elapsed(now).as_secs_f64()),
        }
    }
}
