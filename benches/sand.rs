use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use sandtrix::clear::find_spanning;
use sandtrix::physics::step;
use sandtrix::{Cell, Config, GameState, Grid, PALETTE, TICK_DT};

/// Widest supported field, lower half packed with mixed colours.
fn half_full_grid() -> Grid {
    let mut grid = Grid::new(30, 45);
    let (w, h) = grid.dims();
    for y in h / 2..h {
        for x in 0..w {
            grid.set(x, y, Cell::Sand(PALETTE[(x / 7 + y / 5) % PALETTE.len()]));
        }
    }
    grid
}

fn bench_physics_step(c: &mut Criterion) {
    let base = half_full_grid();
    let mut rng = Pcg32::seed_from_u64(1);
    c.bench_function("physics_step_30x45", |b| {
        b.iter(|| {
            let mut grid = base.clone();
            black_box(step(&mut grid, &mut rng));
        })
    });
}

fn bench_find_spanning(c: &mut Criterion) {
    let mut grid = half_full_grid();
    let (_, h) = grid.dims();
    grid.fill_row(h - 1, PALETTE[0]);
    c.bench_function("find_spanning_30x45", |b| {
        b.iter(|| black_box(find_spanning(black_box(&grid))))
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut game = GameState::new(Config::new(20, 1.5, 5), 12345);
    game.start();
    c.bench_function("game_tick_20x30", |b| {
        b.iter(|| {
            game.hard_drop();
            game.tick(black_box(TICK_DT));
        })
    });
}

criterion_group!(benches, bench_physics_step, bench_find_spanning, bench_tick);
criterion_main!(benches);
