// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::viseme::Viseme;

pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// A label that was held and then left, with how long it was held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhonemeEvent {
    pub viseme: Viseme,
    /// Seconds the label was held.
    pub duration: f64,
    /// Playback time (seconds) at which the label started.
    pub timestamp: f64,
}

/// Bounded FIFO of completed labels. The oldest entry is dropped on overflow.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    events: VecDeque<PhonemeEvent>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, event: PhonemeEvent) {
        self.events.push_back(event);
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    /// Most recent entry, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PhonemeEvent> {
        self.events.back()
    }

    /// Label of the most recent entry, `silence` when empty.
    #[must_use]
    pub fn last_viseme(&self) -> Viseme {
        self.last().map_or(Viseme::Silence, |event| event.viseme)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhonemeEvent> {
        self.events.iter()
    }
}
