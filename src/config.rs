//! Session configuration: playfield size and colour count.
//!
//! A `Config` is read once when a session is (re)built. Every constructor
//! clamps its inputs, so any value that reaches the engine yields a playable
//! grid.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Particles per piece-cell side: each piece cell is SUBDIVISION x SUBDIVISION grains.
pub const SUBDIVISION: usize = 12;

pub const MIN_PIECE_GRID_WIDTH: usize = 10;
pub const MAX_PIECE_GRID_WIDTH: usize = 30;
pub const MIN_PIECE_GRID_HEIGHT: usize = 15;
pub const MIN_ASPECT_RATIO: f64 = 1.0;
pub const MAX_ASPECT_RATIO: f64 = 3.0;
pub const DEFAULT_ASPECT_RATIO: f64 = 1.5;
pub const MIN_COLOR_COUNT: u8 = 2;
pub const MAX_COLOR_COUNT: u8 = 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Difficulty presets: how many palette colours are in play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn color_count(self) -> u8 {
        match self {
            Self::Easy => 3,
            Self::Normal => 5,
            Self::Hard => 7,
        }
    }
}

/// Playfield and colour settings. Fields are private so they stay clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct Config {
    piece_grid_width: usize,
    aspect_ratio: f64,
    color_count: u8,
}

/// Unchecked shape of a settings file; converted through `Config::new`.
#[derive(Deserialize)]
struct RawConfig {
    piece_grid_width: usize,
    aspect_ratio: f64,
    color_count: u8,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self::new(raw.piece_grid_width, raw.aspect_ratio, raw.color_count)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(20, DEFAULT_ASPECT_RATIO, Difficulty::default().color_count())
    }
}

impl Config {
    pub fn new(piece_grid_width: usize, aspect_ratio: f64, color_count: u8) -> Self {
        let aspect_ratio = if aspect_ratio.is_finite() {
            aspect_ratio.clamp(MIN_ASPECT_RATIO, MAX_ASPECT_RATIO)
        } else {
            DEFAULT_ASPECT_RATIO
        };
        Self {
            piece_grid_width: piece_grid_width.clamp(MIN_PIECE_GRID_WIDTH, MAX_PIECE_GRID_WIDTH),
            aspect_ratio,
            color_count: color_count.clamp(MIN_COLOR_COUNT, MAX_COLOR_COUNT),
        }
    }

    pub fn with_difficulty(self, difficulty: Difficulty) -> Self {
        Self::new(self.piece_grid_width, self.aspect_ratio, difficulty.color_count())
    }

    /// Read a JSON settings file. Out-of-range values are clamped, not rejected.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    #[inline]
    pub fn piece_grid_width(&self) -> usize {
        self.piece_grid_width
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    #[inline]
    pub fn color_count(&self) -> u8 {
        self.color_count
    }

    /// `max(15, ceil(width * aspect))`.
    pub fn piece_grid_height(&self) -> usize {
        let h = (self.piece_grid_width as f64 * self.aspect_ratio).ceil() as usize;
        h.max(MIN_PIECE_GRID_HEIGHT)
    }

    #[inline]
    pub fn particle_width(&self) -> usize {
        self.piece_grid_width * SUBDIVISION
    }

    #[inline]
    pub fn particle_height(&self) -> usize {
        self.piece_grid_height() * SUBDIVISION
    }
}
