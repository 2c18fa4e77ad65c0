//! Falling-sand update rule.
//!
//! Grains fall straight down, or down-left/down-right when the cell below is
//! taken. Rows are swept bottom-up so a grain that moved in a lower row is
//! already in place when the grain above it is evaluated; this lets a column
//! cascade several rows in one pass.

use crate::grid::{Cell, Grid};
use rand::Rng;

/// Physics passes per game tick.
pub const STEPS_PER_TICK: usize = 3;

/// One pass over the grid. Returns true if any grain moved.
pub fn step<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> bool {
    let (gw, gh) = grid.dims();
    let mut moved = false;

    // The bottom row cannot fall further.
    for y in (0..gh.saturating_sub(1)).rev() {
        for x in 0..gw {
            let Some(cell @ Cell::Sand(_)) = grid.get(x, y) else {
                continue;
            };

            let target = if grid.is_empty_at(x, y + 1) {
                Some(x)
            } else {
                let left = x > 0 && grid.is_empty_at(x - 1, y + 1);
                let right = grid.is_empty_at(x + 1, y + 1);
                match (left, right) {
                    (true, true) => Some(if rng.random::<bool>() { x - 1 } else { x + 1 }),
                    (true, false) => Some(x - 1),
                    (false, true) => Some(x + 1),
                    (false, false) => None,
                }
            };

            if let Some(tx) = target {
                grid.set(x, y, Cell::Empty);
                grid.set(tx, y + 1, cell);
                moved = true;
            }
        }
    }
    moved
}

/// Run `steps` passes. Returns true if any pass moved a grain.
pub fn settle<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R, steps: usize) -> bool {
    let mut moved = false;
    for _ in 0..steps {
        moved |= step(grid, rng);
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::SandColor;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const RED: Cell = Cell::Sand(SandColor::Red);

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(1)
    }

    #[test]
    fn test_grain_falls_one_row() {
        let mut g = Grid::new(10, 15);
        g.set(5, 10, RED);
        assert!(step(&mut g, &mut rng()));
        assert_eq!(g.get(5, 10), Some(Cell::Empty));
        assert_eq!(g.get(5, 11), Some(RED));
    }

    #[test]
    fn test_bottom_row_is_static() {
        let mut g = Grid::new(10, 15);
        let bottom = g.height() - 1;
        g.set(0, bottom, RED);
        assert!(!step(&mut g, &mut rng()));
        assert_eq!(g.get(0, bottom), Some(RED));
    }

    #[test]
    fn test_stacked_column_cascades_in_one_pass() {
        let mut g = Grid::new(10, 15);
        // two grains stacked with a gap below them
        g.set(7, 50, RED);
        g.set(7, 51, RED);
        step(&mut g, &mut rng());
        // the lower grain moved first, so the upper one saw an empty cell
        assert_eq!(g.get(7, 52), Some(RED));
        assert_eq!(g.get(7, 51), Some(RED));
        assert_eq!(g.get(7, 50), Some(Cell::Empty));
    }

    #[test]
    fn test_slides_to_only_free_diagonal() {
        let mut g = Grid::new(10, 15);
        let y = g.height() - 2;
        // blocked below and below-left, free below-right
        g.set(0, y + 1, RED);
        g.set(1, y + 1, RED);
        g.set(1, y, RED);
        step(&mut g, &mut rng());
        assert_eq!(g.get(2, y + 1), Some(RED));
        assert_eq!(g.get(1, y), Some(Cell::Empty));
    }

    #[test]
    fn test_left_edge_never_goes_left() {
        let mut g = Grid::new(10, 15);
        let y = g.height() - 2;
        g.set(0, y + 1, RED);
        g.set(1, y + 1, RED);
        g.set(0, y, RED);
        assert!(!step(&mut g, &mut rng()));
        assert_eq!(g.get(0, y), Some(RED));
    }

    #[test]
    fn test_tie_break_takes_either_side() {
        let mut seen_left = false;
        let mut seen_right = false;
        let mut r = rng();
        for _ in 0..64 {
            let mut g = Grid::new(10, 15);
            let y = g.height() - 2;
            g.set(5, y + 1, RED);
            g.set(5, y, RED);
            step(&mut g, &mut r);
            seen_left |= g.get(4, y + 1) == Some(RED);
            seen_right |= g.get(6, y + 1) == Some(RED);
        }
        assert!(seen_left && seen_right);
    }

    #[test]
    fn test_settle_preserves_grain_count() {
        let mut g = Grid::new(10, 15);
        let mut r = rng();
        for x in (0..g.width()).step_by(3) {
            for y in (0..40).step_by(2) {
                g.set(x, y, RED);
            }
        }
        let before = g.filled_count();
        for _ in 0..200 {
            settle(&mut g, &mut r, STEPS_PER_TICK);
        }
        assert_eq!(g.filled_count(), before);
        assert!(!step(&mut g, &mut r), "pile should be at rest");
    }
}
