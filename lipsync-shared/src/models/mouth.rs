// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter};

use super::viseme::Viseme;

/// Mouth artwork shared between groups of speech symbols.
///
/// The classifier only emits [`Viseme`]s; renderers that work with a broader
/// grapheme alphabet fold it down here.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
pub enum MouthAsset {
    #[strum(serialize = "BMP")]
    Bmp,
    #[strum(serialize = "A")]
    A,
    #[strum(serialize = "E")]
    E,
    #[strum(serialize = "FVI")]
    Fvi,
    #[strum(serialize = "O")]
    O,
    #[strum(serialize = "U")]
    U,
    #[strum(serialize = "CDGKNSTXYZ")]
    Cdgknstxyz,
    #[strum(serialize = "R")]
    R,
    #[strum(serialize = "L")]
    L,
    #[strum(serialize = "Q")]
    Q,
}

impl std::fmt::Display for MouthAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl MouthAsset {
    /// Artwork file name, e.g. `FVI.svg`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.svg", self.as_ref())
    }

    /// Look up the artwork for a symbol of the renderer's alphabet.
    #[must_use]
    pub fn for_symbol(symbol: &str) -> Option<Self> {
        let asset = match symbol {
            "silence" | "m" | "p" | "b" => Self::Bmp,
            "a" => Self::A,
            "e" => Self::E,
            "i" | "f" | "v" => Self::Fvi,
            "o" => Self::O,
            "u" => Self::U,
            "ch" | "sh" | "j" | "t" | "d" | "c" | "g" | "k" | "n" | "s" | "x" | "y" | "z" => {
                Self::Cdgknstxyz
            }
            "r" => Self::R,
            "l" => Self::L,
            "q" => Self::Q,
            _ => return None,
        };
        Some(asset)
    }

    /// Like [`Self::for_symbol`], drawing unknown symbols with the silence mouth.
    #[must_use]
    pub fn for_symbol_or_rest(symbol: &str) -> Self {
        Self::for_symbol(symbol).unwrap_or_else(|| Self::for_viseme(Viseme::Silence))
    }

    #[must_use]
    pub fn for_viseme(viseme: Viseme) -> Self {
        match viseme {
            Viseme::Silence | Viseme::M => Self::Bmp,
            Viseme::A => Self::A,
            Viseme::E => Self::E,
            Viseme::I => Self::Fvi,
            Viseme::O => Self::O,
            Viseme::U => Self::U,
            Viseme::Ch => Self::Cdgknstxyz,
            Viseme::R => Self::R,
            Viseme::L => Self::L,
            Viseme::Q => Self::Q,
        }
    }
}
