//! Error types for the engine, configuration loading and driver input.

use std::path::PathBuf;

use crate::engine::PlayerId;

/// Reasons a move request is rejected by the rules of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    #[error("the column is full")]
    ColumnFull,

    #[error("you have no more pop-outs left")]
    NoPopOutsLeft,

    #[error("you cannot pop out a disc that you don't own")]
    NotYourDisc,

    #[error("you have no more special discs left")]
    NoSpecialsLeft,
}

/// A coordinate or size argument that falls outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OutOfBounds {
    #[error("grid dimensions {rows}x{cols} must both be at least 1")]
    Dimensions { rows: usize, cols: usize },

    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    Cell {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("column {col} is outside the grid's {cols} columns")]
    Column { col: usize, cols: usize },

    #[error("size {rows}x{cols} does not fit within {max_rows}x{max_cols}")]
    Size {
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },
}

/// Errors produced by the board simulation engine.
///
/// All of these are value-level failures: the caller reports the reason and
/// asks again rather than aborting the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("that move is not possible because {0}")]
    IllegalMove(#[from] IllegalMove),

    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),

    #[error("obstacles can only be placed on an empty grid")]
    GridNotEmpty,

    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),

    #[error("a game needs at least one player")]
    NoPlayers,

    #[error("player registry is full ({max} players)")]
    TooManyPlayers { max: usize },
}

impl EngineError {
    /// Returns the illegal-move reason, if this is a rules violation.
    pub fn illegal_move(&self) -> Option<IllegalMove> {
        match self {
            EngineError::IllegalMove(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Rejections of raw terminal input, reported back to the player before
/// anything reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("\"{0}\" is too short of a username!")]
    UsernameTooShort(String),

    #[error("\"{0}\" is too long of a username!")]
    UsernameTooLong(String),

    #[error("\"{0}\" is not a valid move type.")]
    UnknownMoveKind(String),

    #[error("\"{0}\" is not a number.")]
    NotANumber(String),

    #[error("\"{input}\" is not in the range 1-{max}.")]
    ColumnOutOfRange { input: String, max: usize },
}
