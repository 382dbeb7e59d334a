// SPDX-License-Identifier: GPL-3.0-only

pub mod capture;

pub use capture::{MicrophoneCapture, write_wav};
