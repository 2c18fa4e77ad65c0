//! Polyomino pieces: random shape growth, colour choice, clockwise rotation.

use crate::palette::SandColor;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub const MIN_PIECE_CELLS: usize = 2;
pub const MAX_PIECE_CELLS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{width}x{height} shape cannot hold {actual} cells")]
pub struct ShapeError {
    pub width: usize,
    pub height: usize,
    pub actual: usize,
}

/// Dense boolean occupancy mask, row-major, zero-based bounding box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawShape")]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

#[derive(Deserialize)]
struct RawShape {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl TryFrom<RawShape> for Shape {
    type Error = ShapeError;

    fn try_from(raw: RawShape) -> Result<Self, Self::Error> {
        if raw.width.checked_mul(raw.height) != Some(raw.cells.len()) {
            return Err(ShapeError {
                width: raw.width,
                height: raw.height,
                actual: raw.cells.len(),
            });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
        })
    }
}

impl Shape {
    /// Build from rows of booleans.
    ///
    /// # Panics
    ///
    /// Panics if the rows differ in length.
    pub fn from_rows(rows: &[&[bool]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        assert!(
            rows.iter().all(|r| r.len() == width),
            "shape rows must share one length"
        );
        let cells = rows.iter().flat_map(|r| r.iter().copied()).collect::<Vec<_>>();
        Self { width, height, cells }
    }

    /// Build from a set of cell coordinates, normalised to a zero-based box.
    pub fn from_cells(points: &BTreeSet<(i32, i32)>) -> Self {
        let min_x = points.iter().map(|p| p.0).min().unwrap_or(0);
        let min_y = points.iter().map(|p| p.1).min().unwrap_or(0);
        let max_x = points.iter().map(|p| p.0).max().unwrap_or(0);
        let max_y = points.iter().map(|p| p.1).max().unwrap_or(0);
        let width = (max_x - min_x + 1) as usize;
        let height = (max_y - min_y + 1) as usize;
        let mut cells = vec![false; width * height];
        for &(x, y) in points {
            cells[(y - min_y) as usize * width + (x - min_x) as usize] = true;
        }
        Self { width, height, cells }
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
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Occupied cells as (dx, dy) offsets from the shape origin.
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.cells[y * self.width + x])
    }

    /// 90° clockwise: transpose with row reversal, dimensions swap.
    pub fn rotated_cw(&self) -> Self {
        let (w, h) = (self.height, self.width);
        let mut cells = vec![false; w * h];
        for y in 0..self.height {
            for x in 0..self.width {
                // old (x, y) lands at column (rows - 1 - y), row x
                cells[x * w + (self.height - 1 - y)] = self.cells[y * self.width + x];
            }
        }
        Self { width: w, height: h, cells }
    }
}

/// A falling piece: shape, colour and origin in piece-grid coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub shape: Shape,
    pub color: SandColor,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn new(shape: Shape, color: SandColor) -> Self {
        Self { shape, color, x: 0, y: 0 }
    }

    /// Same piece moved by (dx, dy).
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Same piece rotated clockwise in place (origin unchanged).
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            ..self.clone()
        }
    }

    /// Absolute piece-grid coordinates of each occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled()
            .map(|(dx, dy)| (self.x + dx as i32, self.y + dy as i32))
    }
}

/// Random piece: 2..=6 four-connected cells grown one neighbour at a time,
/// coloured from the first `color_count` palette entries.
pub fn random_piece<R: Rng + ?Sized>(rng: &mut R, color_count: u8) -> Piece {
    let cell_count = rng.random_range(MIN_PIECE_CELLS..=MAX_PIECE_CELLS);
    let shape = random_shape(rng, cell_count);
    let colors = SandColor::prefix(color_count.max(1));
    let color = colors[rng.random_range(0..colors.len())];
    Piece::new(shape, color)
}

/// Grow a polyomino of `cell_count` cells from a single seed cell.
///
/// Candidate frontiers are kept in a `BTreeSet` so the choice for a given RNG
/// state never depends on hash ordering.
pub fn random_shape<R: Rng + ?Sized>(rng: &mut R, cell_count: usize) -> Shape {
    const NEIGHBOURS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    let mut cells = BTreeSet::new();
    cells.insert((0, 0));

    for _ in 1..cell_count.max(1) {
        let candidates: Vec<(i32, i32)> = cells
            .iter()
            .flat_map(|&(x, y)| NEIGHBOURS_4.iter().map(move |(dx, dy)| (x + dx, y + dy)))
            .filter(|p| !cells.contains(p))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let pick = candidates[rng.random_range(0..candidates.len())];
        cells.insert(pick);
    }
    Shape::from_cells(&cells)
}
