// SPDX-License-Identifier: GPL-3.0-only
pub mod features;
pub mod history;
pub mod mouth;
pub mod viseme;

pub use features::{FeatureSet, FrequencyFrame};
pub use history::{HistoryBuffer, PhonemeEvent};
pub use mouth::MouthAsset;
pub use viseme::Viseme;
