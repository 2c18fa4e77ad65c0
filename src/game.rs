//! Game session: current/next piece, per-tick ordering, score and state machine.
//!
//! Per tick while playing:
//! 1. spawn wait, or gravity on the current piece (lock when blocked)
//! 2. `STEPS_PER_TICK` physics passes
//! 3. stability tracking; the clear check fires once when the grid has been
//!    still for `STABILITY_THRESHOLD` ticks
//! 4. overflow check on the top `GAME_OVER_ROWS` piece rows

use crate::clear;
use crate::config::{Config, SUBDIVISION};
use crate::grid::{Cell, Grid};
use crate::level::{fall_speed, level_for_score};
use crate::physics::{self, STEPS_PER_TICK};
use crate::piece::{Piece, random_piece};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed driver cadence (seconds per tick).
pub const TICK_DT: f32 = 1.0 / 60.0;

/// Pause between a lock and the next piece appearing.
pub const SPAWN_DELAY_SECS: f32 = 0.25;

/// Consecutive still ticks before the clear check runs.
pub const STABILITY_THRESHOLD: u32 = 10;

/// Top piece rows watched for overflow.
pub const GAME_OVER_ROWS: usize = 3;

/// Fill ratio of the watched rows that ends the game.
pub const OVERFLOW_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Ready,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Sand filled the top rows past the overflow ratio.
    Overflow,
    /// The next piece did not fit at the spawn position.
    BlockedSpawn,
}

/// Handed to the persistence collaborator when a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverRecord {
    pub score: u32,
    pub level: u32,
    /// Unix time in milliseconds.
    pub timestamp: u64,
    pub color_count: u8,
    pub reason: GameOverReason,
}

/// Owned copy of everything a renderer draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub grid: Grid,
    pub current: Option<Piece>,
    pub next: Piece,
    pub score: u32,
    pub level: u32,
    pub phase: Phase,
    pub fall_speed: f32,
}

/// Everything that is thrown away on reset.
#[derive(Debug, Clone)]
struct Session {
    grid: Grid,
    /// Particle dimensions the session was built with.
    dims: (usize, usize),
    current: Option<Piece>,
    next: Piece,
    score: u32,
    level: u32,
    fall_speed: f32,
    phase: Phase,
    fall_timer: f32,
    /// Seconds waited since the last lock; `None` while a piece is live.
    spawn_wait: Option<f32>,
    stability: u32,
    /// Grid was written outside physics (lock) since the last tick.
    grid_touched: bool,
    ticks: u64,
    pieces_locked: u32,
    particles_cleared: u64,
    game_over: Option<GameOverRecord>,
}

impl Session {
    fn new<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Self {
        let grid = Grid::for_config(config);
        let current = spawn_at_top(&grid, random_piece(rng, config.color_count()));
        let next = random_piece(rng, config.color_count());
        let level = level_for_score(0);
        Self {
            dims: grid.dims(),
            grid,
            current: Some(current),
            next,
            score: 0,
            level,
            fall_speed: fall_speed(level),
            phase: Phase::Ready,
            fall_timer: 0.0,
            spawn_wait: None,
            stability: 0,
            grid_touched: false,
            ticks: 0,
            pieces_locked: 0,
            particles_cleared: 0,
            game_over: None,
        }
    }
}

/// Place `piece` at the spawn column on the top row.
fn spawn_at_top(grid: &Grid, mut piece: Piece) -> Piece {
    let (pw, _) = grid.piece_dims();
    let max_x = pw.saturating_sub(piece.shape.width());
    piece.x = (pw / 2).saturating_sub(1).min(max_x) as i32;
    piece.y = 0;
    piece
}

/// One game session plus the RNG that drives it.
///
/// Every random decision (piece shapes and colours, diagonal tie-breaks,
/// subdivision fill) draws from `rng` in a fixed order, so a seeded session
/// replays identically.
#[derive(Debug)]
pub struct GameState<R = Pcg32> {
    config: Config,
    /// Settings staged by `set_config`, applied on the next reset.
    pending_config: Option<Config>,
    rng: R,
    s: Session,
}

impl GameState<Pcg32> {
    pub fn new(config: Config, seed: u64) -> Self {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> GameState<R> {
    pub fn with_rng(config: Config, mut rng: R) -> Self {
        let s = Session::new(&config, &mut rng);
        log::debug!(
            "new session: {}x{} piece cells, {} colours",
            config.piece_grid_width(),
            config.piece_grid_height(),
            config.color_count()
        );
        Self {
            config,
            pending_config: None,
            rng,
            s,
        }
    }

    // --- renderer view ---

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.s.grid
    }

    #[inline]
    pub fn current(&self) -> Option<&Piece> {
        self.s.current.as_ref()
    }

    #[inline]
    pub fn next(&self) -> &Piece {
        &self.s.next
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.s.score
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.s.level
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.s.phase
    }

    /// Seconds per automatic one-row drop at the current level.
    #[inline]
    pub fn fall_speed(&self) -> f32 {
        self.s.fall_speed
    }

    #[inline]
    pub fn fall_timer(&self) -> f32 {
        self.s.fall_timer
    }

    /// Consecutive ticks with no grain movement.
    #[inline]
    pub fn stability(&self) -> u32 {
        self.s.stability
    }

    #[inline]
    pub fn is_spawn_waiting(&self) -> bool {
        self.s.spawn_wait.is_some()
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.s.ticks
    }

    #[inline]
    pub fn pieces_locked(&self) -> u32 {
        self.s.pieces_locked
    }

    #[inline]
    pub fn particles_cleared(&self) -> u64 {
        self.s.particles_cleared
    }

    /// The configuration the live session was built from.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn pending_config(&self) -> Option<&Config> {
        self.pending_config.as_ref()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.s.grid.clone(),
            current: self.s.current.clone(),
            next: self.s.next.clone(),
            score: self.s.score,
            level: self.s.level,
            phase: self.s.phase,
            fall_speed: self.s.fall_speed,
        }
    }

    /// Direct grid access for scripted fixtures and editors.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.s.grid
    }

    /// The record produced when the game ended, if any.
    pub fn game_over_record(&self) -> Option<&GameOverRecord> {
        self.s.game_over.as_ref()
    }

    /// Hand the game-over record to the caller; later calls return `None`.
    pub fn take_game_over_record(&mut self) -> Option<GameOverRecord> {
        self.s.game_over.take()
    }

    // --- lifecycle ---

    /// Stage new settings. They take effect on the next `reset`.
    pub fn set_config(&mut self, config: Config) {
        log::debug!("config staged until next reset: {:?}", config);
        self.pending_config = Some(config);
    }

    /// Throw the session away and build a fresh one in `Ready`.
    pub fn reset(&mut self) {
        if let Some(config) = self.pending_config.take() {
            self.config = config;
        }
        self.s = Session::new(&self.config, &mut self.rng);
        log::info!("session reset");
    }

    pub fn start(&mut self) {
        if self.s.phase == Phase::Ready {
            self.s.phase = Phase::Playing;
            log::info!("game started");
        }
    }

    pub fn pause(&mut self) {
        if self.s.phase == Phase::Playing {
            self.s.phase = Phase::Paused;
            log::debug!("paused");
        }
    }

    pub fn resume(&mut self) {
        if self.s.phase == Phase::Paused {
            self.s.phase = Phase::Playing;
            log::debug!("resumed");
        }
    }

    // --- input ---

    /// Current piece when input is accepted.
    fn controllable(&self) -> Option<&Piece> {
        if self.s.phase != Phase::Playing {
            return None;
        }
        self.s.current.as_ref()
    }

    /// Move the current piece if the target fits. Returns true if it moved.
    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.controllable() else {
            return false;
        };
        let moved = piece.shifted(dx, dy);
        if self.s.grid.can_place(&moved) {
            self.s.current = Some(moved);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) {
        self.try_shift(-1, 0);
    }

    pub fn move_right(&mut self) {
        self.try_shift(1, 0);
    }

    /// One row down; locks the piece when it cannot descend.
    pub fn move_down(&mut self) {
        if self.controllable().is_none() {
            return;
        }
        if !self.try_shift(0, 1) {
            self.lock_piece();
        }
    }

    /// Drop straight down until blocked, then lock.
    pub fn hard_drop(&mut self) {
        if self.controllable().is_none() {
            return;
        }
        while self.try_shift(0, 1) {}
        self.lock_piece();
    }

    /// Rotate clockwise in place. Discarded if the rotated shape does not fit;
    /// there is no wall kick.
    pub fn rotate(&mut self) {
        let Some(piece) = self.controllable() else {
            return;
        };
        let rotated = piece.rotated();
        if self.s.grid.can_place(&rotated) {
            self.s.current = Some(rotated);
        }
    }

    // --- simulation ---

    /// Advance the session by `dt` seconds. No-op unless playing.
    pub fn tick(&mut self, dt: f32) {
        if self.s.phase != Phase::Playing {
            return;
        }
        if self.s.grid.dims() != self.s.dims {
            log::warn!(
                "grid is {:?} but session was built for {:?}; skipping tick until reset",
                self.s.grid.dims(),
                self.s.dims
            );
            return;
        }
        self.s.ticks += 1;

        if let Some(waited) = self.s.spawn_wait.as_mut() {
            *waited += dt;
            if *waited >= SPAWN_DELAY_SECS {
                self.spawn_next();
                if self.s.phase == Phase::GameOver {
                    return;
                }
            }
        } else {
            self.s.fall_timer += dt;
            if self.s.fall_timer >= self.s.fall_speed {
                self.s.fall_timer = 0.0;
                if !self.try_shift(0, 1) {
                    self.lock_piece();
                }
            }
        }

        let moved = physics::settle(&mut self.s.grid, &mut self.rng, STEPS_PER_TICK);
        if moved || std::mem::take(&mut self.s.grid_touched) {
            self.s.stability = 0;
        } else {
            self.s.stability = self.s.stability.saturating_add(1);
            if self.s.stability == STABILITY_THRESHOLD {
                self.process_clears();
            }
        }

        if self.is_overflowing() {
            self.end_game(GameOverReason::Overflow);
        }
    }

    /// Turn the current piece into sand and start the spawn wait.
    ///
    /// Each piece cell becomes a SUBDIVISION x SUBDIVISION block; every grain
    /// is filled with probability 1/2 except the block centre, which always is.
    fn lock_piece(&mut self) {
        let Some(piece) = self.s.current.take() else {
            return;
        };
        let (gw, gh) = self.s.grid.dims();
        let center = SUBDIVISION / 2;
        let mut grains = 0usize;

        for (px, py) in piece.cells() {
            if px < 0 || py < 0 {
                continue;
            }
            let (bx, by) = (px as usize * SUBDIVISION, py as usize * SUBDIVISION);
            if bx >= gw || by >= gh {
                continue;
            }
            for dy in 0..SUBDIVISION {
                for dx in 0..SUBDIVISION {
                    let forced = dx == center && dy == center;
                    if forced || self.rng.random_bool(0.5) {
                        self.s.grid.set(bx + dx, by + dy, Cell::Sand(piece.color));
                        grains += 1;
                    }
                }
            }
        }

        self.s.pieces_locked += 1;
        self.s.grid_touched = true;
        self.s.spawn_wait = Some(0.0);
        self.s.fall_timer = 0.0;
        log::debug!(
            "locked {:?} piece at ({}, {}) into {} grains",
            piece.color,
            piece.x,
            piece.y,
            grains
        );
    }

    /// Promote `next` to `current` and draw a new `next`.
    fn spawn_next(&mut self) {
        self.s.spawn_wait = None;
        let incoming = random_piece(&mut self.rng, self.config.color_count());
        let promoted = std::mem::replace(&mut self.s.next, incoming);
        let piece = spawn_at_top(&self.s.grid, promoted);
        let fits = self.s.grid.can_place(&piece);
        log::debug!("spawned {:?} piece at column {}", piece.color, piece.x);
        self.s.current = Some(piece);
        if !fits {
            self.end_game(GameOverReason::BlockedSpawn);
        }
    }

    /// Erase spanning regions and score them.
    fn process_clears(&mut self) {
        let report = clear::clear_spanning(&mut self.s.grid);
        if report.is_empty() {
            return;
        }
        let count = report.particle_count();
        self.s.score = self.s.score.saturating_add(count as u32);
        self.s.particles_cleared += count as u64;

        let level = level_for_score(self.s.score);
        if level != self.s.level {
            log::info!("level {} -> {}", self.s.level, level);
        }
        self.s.level = level;
        self.s.fall_speed = fall_speed(level);
        log::info!(
            "cleared {} region(s), {} particles; score {}",
            report.regions,
            count,
            self.s.score
        );
    }

    /// Fill ratio of the top `GAME_OVER_ROWS` piece rows has reached `OVERFLOW_RATIO`.
    fn is_overflowing(&self) -> bool {
        let rows = (GAME_OVER_ROWS * SUBDIVISION).min(self.s.grid.height());
        let total = rows * self.s.grid.width();
        if total == 0 {
            return false;
        }
        let filled = self.s.grid.filled_in_top_rows(rows);
        filled as f64 / total as f64 >= OVERFLOW_RATIO
    }

    fn end_game(&mut self, reason: GameOverReason) {
        if self.s.phase == Phase::GameOver {
            return;
        }
        self.s.phase = Phase::GameOver;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.s.game_over = Some(GameOverRecord {
            score: self.s.score,
            level: self.s.level,
            timestamp,
            color_count: self.config.color_count(),
            reason,
        });
        log::info!(
            "game over ({:?}): score {}, level {}",
            reason,
            self.s.score,
            self.s.level
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::SandColor;

    fn playing(seed: u64) -> GameState {
        let mut game = GameState::new(Config::new(10, 1.5, 4), seed);
        game.start();
        game
    }

    #[test]
    fn test_new_session_is_ready() {
        let game = GameState::new(Config::default(), 1);
        assert_eq!(game.phase(), Phase::Ready);
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), 1);
        assert!(game.current().is_some());
        assert_eq!(game.grid().filled_count(), 0);
        assert!(game.grid().can_place(game.current().unwrap()));
    }

    #[test]
    fn test_state_transitions() {
        let mut game = GameState::new(Config::default(), 2);
        game.pause();
        assert_eq!(game.phase(), Phase::Ready);
        game.resume();
        assert_eq!(game.phase(), Phase::Ready);
        game.start();
        assert_eq!(game.phase(), Phase::Playing);
        game.start();
        assert_eq!(game.phase(), Phase::Playing);
        game.pause();
        assert_eq!(game.phase(), Phase::Paused);
        game.resume();
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_input_ignored_when_not_playing() {
        let mut game = GameState::new(Config::default(), 3);
        let before = game.current().cloned();
        game.move_left();
        game.move_down();
        game.hard_drop();
        game.rotate();
        assert_eq!(game.current().cloned(), before);
        assert_eq!(game.pieces_locked(), 0);
    }

    #[test]
    fn test_gravity_moves_piece_after_fall_speed() {
        let mut game = playing(4);
        let y0 = game.current().unwrap().y;
        // just under one second: no drop yet
        for _ in 0..59 {
            game.tick(TICK_DT);
        }
        assert_eq!(game.current().unwrap().y, y0);
        game.tick(TICK_DT);
        game.tick(TICK_DT);
        assert_eq!(game.current().unwrap().y, y0 + 1);
    }

    #[test]
    fn test_lock_then_spawn_after_delay() {
        let mut game = playing(5);
        game.hard_drop();
        assert!(game.current().is_none());
        assert!(game.is_spawn_waiting());
        assert_eq!(game.pieces_locked(), 1);

        let expected_next = game.next().clone();
        let wait_ticks = (SPAWN_DELAY_SECS / TICK_DT).ceil() as usize + 1;
        for _ in 0..wait_ticks {
            game.tick(TICK_DT);
        }
        let current = game.current().expect("next piece spawned");
        assert_eq!(current.shape, expected_next.shape);
        assert_eq!(current.color, expected_next.color);
        assert_eq!(current.y, 0);
    }

    #[test]
    fn test_stability_counter_resets_on_movement() {
        let mut game = playing(6);
        for _ in 0..5 {
            game.tick(TICK_DT);
        }
        assert_eq!(game.stability(), 5);
        game.grid_mut().set(0, 0, Cell::Sand(SandColor::Red));
        game.tick(TICK_DT);
        assert_eq!(game.stability(), 0);
    }

    #[test]
    fn test_resized_grid_is_skipped_until_reset() {
        let mut game = playing(7);
        *game.grid_mut() = Grid::new(12, 20);
        game.tick(TICK_DT);
        assert_eq!(game.ticks(), 0);
        game.reset();
        game.start();
        game.tick(TICK_DT);
        assert_eq!(game.ticks(), 1);
    }

    #[test]
    fn test_game_over_record_taken_once() {
        let mut game = playing(8);
        for y in 0..GAME_OVER_ROWS * SUBDIVISION {
            game.grid_mut().fill_row(y, SandColor::Cyan);
        }
        game.tick(TICK_DT);
        assert_eq!(game.phase(), Phase::GameOver);
        let record = game.take_game_over_record().expect("record");
        assert_eq!(record.reason, GameOverReason::Overflow);
        assert_eq!(record.color_count, 4);
        assert!(game.take_game_over_record().is_none());
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut game = playing(9);
        game.hard_drop();
        let snapshot = game.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);

        // a truncated grid is rejected instead of producing a grid that panics on access
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["grid"]["cells"].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<GameSnapshot>(value).is_err());
    }
}
