//! Sand palette: the fixed, ordered set of piece colours.
//!
//! Difficulty only truncates this list, so an easier game always uses a
//! strict prefix of the colours a harder one uses.

use serde::{Deserialize, Serialize};

/// One palette entry. Compared by value; the renderer maps it to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum SandColor {
    Cyan = 0,
    Yellow = 1,
    Purple = 2,
    Green = 3,
    Red = 4,
    Blue = 5,
    Orange = 6,
}

/// Palette order. Index `i` is the colour drawn for colour index `i`.
pub const PALETTE: [SandColor; 7] = [
    SandColor::Cyan,
    SandColor::Yellow,
    SandColor::Purple,
    SandColor::Green,
    SandColor::Red,
    SandColor::Blue,
    SandColor::Orange,
];

impl SandColor {
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Palette entry for `index`, or `None` past the end of the palette.
    pub fn from_index(index: u8) -> Option<Self> {
        PALETTE.get(index as usize).copied()
    }

    /// The first `count` palette entries (clamped to the palette length).
    pub fn prefix(count: u8) -> &'static [Self] {
        &PALETTE[..(count as usize).min(PALETTE.len())]
    }

    /// sRGB triple for renderers.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Cyan => (0x66, 0xCC, 0xFF),
            Self::Yellow => (0xFF, 0xE6, 0x4D),
            Self::Purple => (0xCC, 0x66, 0xFF),
            Self::Green => (0x80, 0xFF, 0x80),
            Self::Red => (0xFF, 0x66, 0x66),
            Self::Blue => (0x4D, 0x80, 0xFF),
            Self::Orange => (0xFF, 0x99, 0x4D),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cyan => "cyan",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Orange => "orange",
        }
    }
}
