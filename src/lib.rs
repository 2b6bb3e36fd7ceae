//! # Connect Twist
//!
//! This library provides the board simulation engine for a multi-player,
//! gravity-drop connect game with an obstacle block and limited-use special
//! moves.
//!
//! It is used by the `human_player` binary, which collects moves from the
//! terminal, enforces the turn timer, and renders the grid.
//!
//! ## Modules
//! - `engine`: The grid model (`Grid`, `Cell`, `PlayerId`), obstacle placement and gravity.
//! - `moves`: Move kinds and `perform_move`, which validates and applies a move.
//! - `scoring`: Lane extraction, run-length encoding and score recomputation.
//! - `player`: Per-player counters and the `PlayerRegistry` that assigns ids.
//! - `game`: The `Game` session tying a grid, its players and the turn order together.
//! - `config`: `GameConfig`, loadable from TOML.
//! - `error`: Engine, configuration and input error types.
//! - `utils`: Parsing grids from strings and validating raw player input.

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod moves;
pub mod player;
pub mod scoring;
pub mod utils;
