//! Particle grid and piece placement against it.

use crate::config::{Config, SUBDIVISION};
use crate::palette::SandColor;
use crate::piece::{Piece, Shape};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("{width}x{height} particles does not match {piece_width}x{piece_height} piece cells")]
    Dimensions {
        piece_width: usize,
        piece_height: usize,
        width: usize,
        height: usize,
    },
    #[error("expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },
}

/// Single particle: either empty or sand of a palette colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Sand(SandColor),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    #[inline]
    pub fn color(self) -> Option<SandColor> {
        match self {
            Self::Empty => None,
            Self::Sand(c) => Some(c),
        }
    }
}

/// Particle grid. y=0 is top; storage is row-major.
///
/// Dimensions are fixed at construction. Piece-grid dimensions are kept
/// alongside so placement never has to re-derive them from a config that may
/// have changed since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    piece_width: usize,
    piece_height: usize,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

/// Unchecked serialized grid; dimensions are verified before it becomes a `Grid`.
#[derive(Deserialize)]
struct RawGrid {
    piece_width: usize,
    piece_height: usize,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        if raw.piece_width.checked_mul(SUBDIVISION) != Some(raw.width)
            || raw.piece_height.checked_mul(SUBDIVISION) != Some(raw.height)
        {
            return Err(GridError::Dimensions {
                piece_width: raw.piece_width,
                piece_height: raw.piece_height,
                width: raw.width,
                height: raw.height,
            });
        }
        let expected = raw.width * raw.height;
        if raw.cells.len() != expected {
            return Err(GridError::CellCount {
                expected,
                actual: raw.cells.len(),
            });
        }
        Ok(Self {
            piece_width: raw.piece_width,
            piece_height: raw.piece_height,
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
        })
    }
}

impl Grid {
    /// Empty grid of `piece_width x piece_height` piece cells.
    pub fn new(piece_width: usize, piece_height: usize) -> Self {
        let (width, height) = (piece_width * SUBDIVISION, piece_height * SUBDIVISION);
        Self {
            piece_width,
            piece_height,
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    pub fn for_config(config: &Config) -> Self {
        Self::new(config.piece_grid_width(), config.piece_grid_height())
    }

    /// Particle dimensions (width, height).
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Piece-grid dimensions (width, height).
    #[inline]
    pub fn piece_dims(&self) -> (usize, usize) {
        (self.piece_width, self.piece_height)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    /// Write a cell. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    #[inline]
    pub(crate) fn is_empty_at(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(Cell::Empty)
    }

    /// Row `y` as a slice, or empty past the bottom.
    pub fn row(&self, y: usize) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Filled particles within the top `rows` particle rows.
    pub fn filled_in_top_rows(&self, rows: usize) -> usize {
        let rows = rows.min(self.height);
        self.cells[..rows * self.width]
            .iter()
            .filter(|c| !c.is_empty())
            .count()
    }

    /// Fill the whole particle row `y` with one colour.
    pub fn fill_row(&mut self, y: usize, color: SandColor) {
        for x in 0..self.width {
            self.set(x, y, Cell::Sand(color));
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// True if no particle inside piece cell (px, py)'s block is filled.
    fn block_is_empty(&self, px: usize, py: usize) -> bool {
        let (bx, by) = (px * SUBDIVISION, py * SUBDIVISION);
        (by..by + SUBDIVISION).all(|y| {
            self.row(y)[bx..bx + SUBDIVISION]
                .iter()
                .all(|c| c.is_empty())
        })
    }

    /// True if `shape` may occupy origin (x, y) in piece-grid coordinates.
    ///
    /// Cells above the top edge (y < 0) are allowed so pieces can overhang the
    /// spawn row; they never collide.
    pub fn can_place_shape(&self, shape: &Shape, x: i32, y: i32) -> bool {
        for (dx, dy) in shape.filled() {
            let px = x + dx as i32;
            let py = y + dy as i32;
            if px < 0 || px >= self.piece_width as i32 || py >= self.piece_height as i32 {
                return false;
            }
            if py < 0 {
                continue;
            }
            if !self.block_is_empty(px as usize, py as usize) {
                return false;
            }
        }
        true
    }

    /// True if the piece fits at its own position.
    #[inline]
    pub fn can_place(&self, piece: &Piece) -> bool {
        self.can_place_shape(&piece.shape, piece.x, piece.y)
    }
}
