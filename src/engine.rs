//! Core board model for the game.
//!
//! This module defines the game's fundamental components:
//! - `Cell`: What a single grid position holds (nothing, an obstacle, or a player's disc).
//! - `PlayerId`: The identity a disc is stamped with.
//! - `Grid`: The fixed-size board, with bounds-checked access, obstacle placement,
//!   gravity settling and terminal rendering.
use rand::Rng;
use std::fmt;
use tracing::{debug, info};

use crate::error::{EngineError, OutOfBounds};

/// Largest number of distinct players a grid can tell apart.
pub const MAX_PLAYERS: usize = u8::MAX as usize;

/// Identifies a player on the grid. Ids start at 1 and are handed out by
/// [`PlayerRegistry`](crate::player::PlayerRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates an id from its numeric value. Returns `None` for 0, which is
    /// never a valid player.
    pub fn new(value: u8) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(PlayerId(value))
        }
    }

    /// The numeric value of this id.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Returns the ANSI SGR color code used when drawing this player's discs.
    ///
    /// Colors cycle through a fixed palette, so large player counts reuse them.
    pub fn ansi_color_code(self) -> &'static str {
        const PALETTE: [&str; 6] = ["1;32", "1;31", "1;33", "1;34", "1;36", "0;35"];
        PALETTE[(self.0 as usize - 1) % PALETTE.len()]
    }

    /// Wraps `text` in this player's color.
    pub fn paint(self, text: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", self.ansi_color_code(), text)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents the content of a single grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Nothing here; discs can land or fall into it.
    Empty,
    /// Part of the obstacle block. Never moves under gravity.
    Obstacle,
    /// A disc belonging to the given player.
    OwnedBy(PlayerId),
}

impl Cell {
    /// Converts the cell to its character representation.
    ///
    /// Player ids 1-9 map to their digit and ids 10-35 to the letters 'a'-'z',
    /// which `utils::grid_from_str_array` reads back. Larger ids render as '?'.
    ///
    /// # Examples
    ///
    /// ```
    /// use connect_twist::engine::{Cell, PlayerId};
    /// assert_eq!(Cell::Empty.to_char(), '.');
    /// assert_eq!(Cell::Obstacle.to_char(), '#');
    /// assert_eq!(Cell::OwnedBy(PlayerId::new(2).unwrap()).to_char(), '2');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Obstacle => '#',
            Cell::OwnedBy(id) => char::from_digit(id.get() as u32, 36).unwrap_or('?'),
        }
    }

    /// The player owning this cell, if any.
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Cell::OwnedBy(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether gravity may move this cell.
    fn is_movable(&self) -> bool {
        matches!(self, Cell::OwnedBy(_))
    }

    /// Returns the glyph wrapped in ANSI color codes for terminal output.
    fn to_ansi(&self) -> String {
        match self {
            Cell::Empty => "\x1b[1;30m◌\x1b[0m".to_string(),
            Cell::Obstacle => "\x1b[1;35m■\x1b[0m".to_string(),
            Cell::OwnedBy(id) => id.paint("●"),
        }
    }
}

/// Dimensions of the rectangular obstacle block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstacleSize {
    pub rows: usize,
    pub cols: usize,
}

/// Represents the game board as a row-major grid of `Cell`s.
///
/// Row 0 is the top; gravity pulls discs towards the highest row index.
/// The dimensions are fixed when the grid is created and every coordinate
/// access is bounds-checked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a new grid with every cell set to `Cell::Empty`.
    ///
    /// # Errors
    /// `OutOfBounds::Dimensions` if either dimension is zero.
    ///
    /// # Examples
    /// ```
    /// use connect_twist::engine::{Cell, Grid};
    /// let grid = Grid::new(6, 7).unwrap();
    /// assert_eq!(grid.get(5, 6).unwrap(), Cell::Empty);
    /// assert!(Grid::new(0, 7).is_err());
    /// ```
    pub fn new(rows: usize, cols: usize) -> Result<Self, EngineError> {
        if rows == 0 || cols == 0 {
            return Err(OutOfBounds::Dimensions { rows, cols }.into());
        }
        Ok(Grid {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, EngineError> {
        if row >= self.rows || col >= self.cols {
            return Err(OutOfBounds::Cell {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            }
            .into());
        }
        Ok(row * self.cols + col)
    }

    fn check_column(&self, col: usize) -> Result<(), EngineError> {
        if col >= self.cols {
            return Err(OutOfBounds::Column {
                col,
                cols: self.cols,
            }
            .into());
        }
        Ok(())
    }

    /// Returns the cell at the specified row and column.
    pub fn get(&self, row: usize, col: usize) -> Result<Cell, EngineError> {
        Ok(self.cells[self.index(row, col)?])
    }

    /// Overwrites the cell at the specified row and column.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), EngineError> {
        let idx = self.index(row, col)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Returns the cells of a column, ordered top to bottom.
    pub fn column_cells(&self, col: usize) -> Result<Vec<Cell>, EngineError> {
        self.check_column(col)?;
        Ok((0..self.rows)
            .map(|row| self.cells[row * self.cols + col])
            .collect())
    }

    /// Finds the row a disc dropped into `col` would come to rest on.
    ///
    /// The disc falls from the top and stops on the first occupied cell (or
    /// the bottom edge), so the landing row is the last `Empty` row above the
    /// topmost occupant.
    ///
    /// # Returns
    /// * `Ok(Some(row))` with the landing row.
    /// * `Ok(None)` if the top cell of the column is occupied.
    pub fn landing_row(&self, col: usize) -> Result<Option<usize>, EngineError> {
        let column = self.column_cells(col)?;
        let first_occupied = column
            .iter()
            .position(|cell| *cell != Cell::Empty)
            .unwrap_or(self.rows);
        Ok(first_occupied.checked_sub(1))
    }

    /// True when no cell is `Cell::Empty`. Obstacles count as filled.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| *cell != Cell::Empty)
    }

    /// True when every cell is `Cell::Empty`.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| *cell == Cell::Empty)
    }

    /// Iterates over the rows of the grid, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.cols)
    }

    /// Copies the full matrix of cells out for a renderer.
    pub fn snapshot(&self) -> Vec<Vec<Cell>> {
        self.iter_rows().map(|row| row.to_vec()).collect()
    }

    /// Stamps a block of `Cell::Obstacle` onto the bottom rows of the grid.
    ///
    /// The block occupies rows `[rows - size.rows, rows)` and starts at a
    /// column offset chosen uniformly from `[0, cols - size.cols]`. A size
    /// with a zero dimension places nothing.
    ///
    /// This must happen before any disc is played; placing an obstacle over
    /// existing discs would silently destroy them.
    ///
    /// # Returns
    /// The chosen column offset.
    ///
    /// # Errors
    /// * `OutOfBounds::Size` if the block is larger than the grid.
    /// * `EngineError::GridNotEmpty` if any cell is already occupied.
    pub fn place_obstacle<R: Rng + ?Sized>(
        &mut self,
        size: ObstacleSize,
        rng: &mut R,
    ) -> Result<usize, EngineError> {
        if size.rows > self.rows || size.cols > self.cols {
            return Err(OutOfBounds::Size {
                rows: size.rows,
                cols: size.cols,
                max_rows: self.rows,
                max_cols: self.cols,
            }
            .into());
        }
        if !self.is_empty() {
            return Err(EngineError::GridNotEmpty);
        }

        let offset = rng.gen_range(0..=self.cols - size.cols);
        for row in self.rows - size.rows..self.rows {
            for col in offset..offset + size.cols {
                self.cells[row * self.cols + col] = Cell::Obstacle;
            }
        }
        info!(
            rows = size.rows,
            cols = size.cols,
            offset,
            "placed obstacle block"
        );
        Ok(offset)
    }

    /// Settles every disc downwards until none has an empty cell beneath it.
    ///
    /// Repeats full top-to-bottom passes over all rows except the bottom one,
    /// moving a disc down a step whenever the cell below it is `Cell::Empty`,
    /// until a pass moves nothing. Obstacles never move, so discs resting on
    /// them stay put. Relative vertical order within a column is preserved.
    ///
    /// # Returns
    /// The number of single-step moves performed. A settled grid returns 0.
    pub fn apply_gravity(&mut self) -> usize {
        let mut moves = 0;
        let mut passes = 0;
        loop {
            let mut changed = false;
            for row in 0..self.rows - 1 {
                for col in 0..self.cols {
                    let above = row * self.cols + col;
                    let below = above + self.cols;
                    if self.cells[above].is_movable() && self.cells[below] == Cell::Empty {
                        self.cells.swap(above, below);
                        moves += 1;
                        changed = true;
                    }
                }
            }
            passes += 1;
            if !changed {
                break;
            }
        }
        debug!(moves, passes, "gravity settled");
        moves
    }

    /// Generates a string representation of the grid for terminal output.
    ///
    /// The first line holds the 1-based column numbers, underlined; the last
    /// line is a rule as wide as the grid.
    pub fn to_ansi_string(&self) -> String {
        let header = (1..=self.cols)
            .map(|c| format!("{:<2}", c % 100))
            .collect::<String>();
        let mut output = format!("\x1b[1;35;4m{}\x1b[0m\n", header.trim_end());

        for row in self.iter_rows() {
            let line = row.iter().map(Cell::to_ansi).collect::<Vec<_>>().join(" ");
            output.push_str(&line);
            output.push('\n');
        }
        output.push_str(&format!("\x1b[1;35m{}\x1b[0m", "‾".repeat(2 * self.cols - 1)));
        output
    }
}

impl fmt::Display for Grid {
    /// Plain-text form: one line per row using `Cell::to_char`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.iter_rows().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for cell in row {
                write!(f, "{}", cell.to_char())?;
            }
        }
        Ok(())
    }
}
