// SPDX-License-Identifier: GPL-3.0-only

pub mod timeline;

pub use timeline::{Cue, OutputFormat, TimedViseme, Timeline, TimelineReport};
