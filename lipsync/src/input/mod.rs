// SPDX-License-Identifier: GPL-3.0-only

pub mod audio;

pub use audio::{DecodedClip, decode_file};
