//! Edge-to-edge clears.
//!
//! A same-colour region clears when it connects the left wall (x=0) to the
//! right wall (x=width-1). Paths may be slanted: connectivity is
//! 8-neighbour. Regions are only discovered from column 0, one seed per row,
//! so a region has to touch the left wall to be found at all.

use crate::grid::{Cell, Grid};

const NEIGHBOURS_8: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Result of one clear pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Number of distinct spanning regions.
    pub regions: usize,
    /// Particles to erase, in discovery order.
    pub cells: Vec<(usize, usize)>,
}

impl ClearReport {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.cells.len()
    }
}

/// Find every region that spans the grid left to right.
///
/// Seeds are tried for each row whose leftmost particle is sand. A seed that
/// an earlier fill already reached belongs to the same region, so it is
/// skipped; the union of cleared cells is unchanged by that shortcut.
pub fn find_spanning(grid: &Grid) -> ClearReport {
    let (gw, gh) = grid.dims();
    let mut report = ClearReport::default();
    if gw == 0 {
        return report;
    }
    let mut visited = vec![false; gw * gh];
    let mut stack = Vec::new();
    let mut region = Vec::new();

    for start_y in 0..gh {
        let Some(Cell::Sand(color)) = grid.get(0, start_y) else {
            continue;
        };
        if visited[start_y * gw] {
            continue;
        }

        region.clear();
        let mut touches_right = false;
        visited[start_y * gw] = true;
        stack.push((0usize, start_y));

        while let Some((x, y)) = stack.pop() {
            region.push((x, y));
            if x == gw - 1 {
                touches_right = true;
            }
            for (dx, dy) in NEIGHBOURS_8 {
                let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
                else {
                    continue;
                };
                if nx >= gw || ny >= gh || visited[ny * gw + nx] {
                    continue;
                }
                if grid.get(nx, ny) == Some(Cell::Sand(color)) {
                    visited[ny * gw + nx] = true;
                    stack.push((nx, ny));
                }
            }
        }

        if touches_right {
            report.regions += 1;
            report.cells.extend_from_slice(&region);
        }
    }
    report
}

/// Erase every spanning region. Returns what was erased.
pub fn clear_spanning(grid: &mut Grid) -> ClearReport {
    let report = find_spanning(grid);
    for &(x, y) in &report.cells {
        grid.set(x, y, Cell::Empty);
    }
    report
}
