// SPDX-License-Identifier: GPL-3.0-only

//! Drives a [`lipsync_shared::LipSyncSession`] at the display tick rate,
//! either over a decoded clip or over live microphone input.

pub mod clock;
pub mod live;
pub mod offline;

pub use clock::PlaybackClock;
pub use live::{LiveTracker, drive_live};
pub use offline::analyse_clip;
