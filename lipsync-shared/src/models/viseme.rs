// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumCount, EnumIter, EnumString};

/// Mouth-shape category emitted by the classifier.
///
/// The vocabulary is closed: nothing outside these eleven labels ever leaves
/// the classifier. Renderers that know a richer alphabet fold it down through
/// [`crate::MouthAsset`].
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumCount,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Viseme {
    #[default]
    Silence,
    A,
    E,
    I,
    O,
    U,
    M,
    R,
    L,
    Ch,
    Q,
}

impl std::fmt::Display for Viseme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl Viseme {
    /// Scoring order. Ties go to the earliest entry.
    pub const SCORED: [Viseme; 10] = [
        Self::A,
        Self::E,
        Self::I,
        Self::O,
        Self::U,
        Self::M,
        Self::R,
        Self::L,
        Self::Ch,
        Self::Q,
    ];

    pub const VOWELS: [Viseme; 5] = [Self::A, Self::E, Self::I, Self::O, Self::U];

    /// Consonants the history-biased fallback may pick from.
    pub const CONSONANTS: [Viseme; 4] = [Self::M, Self::L, Self::R, Self::Ch];

    #[must_use]
    pub fn is_silence(self) -> bool {
        self == Self::Silence
    }

    #[must_use]
    pub fn is_vowel(self) -> bool {
        matches!(self, Self::A | Self::E | Self::I | Self::O | Self::U)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silence => "silence",
            Self::A => "a",
            Self::E => "e",
            Self::I => "i",
            Self::O => "o",
            Self::U => "u",
            Self::M => "m",
            Self::R => "r",
            Self::L => "l",
            Self::Ch => "ch",
            Self::Q => "q",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn test_vocabulary_is_closed() {
        assert_eq!(Viseme::COUNT, 11);
        let names: Vec<String> = Viseme::iter().map(|v| v.to_string()).collect();
        assert_eq!(
            names,
            vec!["silence", "a", "e", "i", "o", "u", "m", "r", "l", "ch", "q"]
        );
    }

    #[test]
    fn test_display_matches_as_str() {
        for viseme in Viseme::iter() {
            assert_eq!(viseme.to_string(), viseme.as_str());
        }
    }

    #[test]
    fn test_parse_round_trip() {
        assert_eq!(Viseme::from_str("ch").unwrap(), Viseme::Ch);
        assert_eq!(Viseme::from_str("silence").unwrap(), Viseme::Silence);
        assert!(Viseme::from_str("sh").is_err());
    }

    #[test]
    fn test_vowel_classification() {
        assert!(Viseme::A.is_vowel());
        assert!(Viseme::U.is_vowel());
        assert!(!Viseme::M.is_vowel());
        assert!(!Viseme::Silence.is_vowel());
        assert!(Viseme::Silence.is_silence());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Viseme::Ch).unwrap();
        assert_eq!(json, "\"ch\"");
        let parsed: Viseme = serde_json::from_str("\"o\"").unwrap();
        assert_eq!(parsed, Viseme::O);
    }
}
