//! Sandtrix: simulation core for a falling-sand polyomino puzzle.
//!
//! Random polyominoes fall onto a particle grid. When a piece locks, each of
//! its cells crumbles into a block of coloured sand grains that settle under
//! gravity. A same-colour region connecting the left wall to the right wall
//! is erased and scores one point per grain.
//!
//! The crate has no rendering or platform code. A driver calls
//! [`GameState::tick`] at a fixed cadence, forwards input through the move
//! methods (or [`input::Action`]), and reads the grid, pieces and score back
//! for drawing.
//!
//! ```
//! use sandtrix::{Config, GameState, Phase, TICK_DT};
//!
//! let mut game = GameState::new(Config::new(10, 1.5, 3), 42);
//! game.start();
//! game.hard_drop();
//! for _ in 0..120 {
//!     game.tick(TICK_DT);
//! }
//! assert_eq!(game.phase(), Phase::Playing);
//! assert_eq!(game.pieces_locked(), 1);
//! ```

pub mod clear;
pub mod config;
pub mod game;
pub mod grid;
pub mod input;
pub mod level;
pub mod palette;
pub mod physics;
pub mod piece;

pub use config::{Config, ConfigError, Difficulty, SUBDIVISION};
pub use game::{GameOverReason, GameOverRecord, GameSnapshot, GameState, Phase, TICK_DT};
pub use grid::{Cell, Grid, GridError};
pub use input::{Action, ScriptError, parse_script};
pub use palette::{PALETTE, SandColor};
pub use piece::{Piece, Shape, ShapeError, random_piece};
