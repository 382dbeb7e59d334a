// SPDX-License-Identifier: GPL-3.0-only
pub mod audio;
pub mod cli;
pub mod input;
pub mod output;
pub mod playback;

// Re-export the main run function
pub use app_main::run;

mod app_main;
