//! Text helpers: parsing grids from string fixtures and validating the raw
//! terminal input a driver collects before it calls into the engine.

use crate::engine::{Cell, Grid, PlayerId};
use crate::error::InputError;

/// Shortest accepted username.
pub const MIN_USERNAME_LEN: usize = 3;
/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 15;

/// Parses an array of string slices into a `Grid`.
///
/// Each string slice represents a row, starting from row 0 (the top). The
/// grid takes its dimensions from the input: the number of rows, and the
/// length of the rows, which must all be equal.
///
/// Valid characters:
/// - '.': `Cell::Empty`
/// - '#': `Cell::Obstacle`
/// - '1'-'9', 'a'-'z': `Cell::OwnedBy` that player id, read as a base-36
///   digit (so 'a' is player 10 and 'z' is player 35)
///
/// # Returns
/// * `Ok(Grid)` if parsing is successful.
/// * `Err(String)` if the input is empty, rows differ in length, or a
///   character is not recognized.
///
/// # Examples
/// ```
/// use connect_twist::utils::grid_from_str_array;
/// use connect_twist::engine::{Cell, PlayerId};
///
/// let grid = grid_from_str_array(&["1..", "#.2"]).unwrap();
/// assert_eq!(grid.rows(), 2);
/// assert_eq!(grid.cols(), 3);
/// assert_eq!(grid.get(1, 0).unwrap(), Cell::Obstacle);
/// assert_eq!(grid.get(1, 2).unwrap(), Cell::OwnedBy(PlayerId::new(2).unwrap()));
///
/// assert!(grid_from_str_array(&["1.?"]).is_err());
/// assert!(grid_from_str_array(&["1..", ".."]).is_err());
/// ```
pub fn grid_from_str_array(s: &[&str]) -> Result<Grid, String> {
    let rows = s.len();
    let cols = s.first().map_or(0, |row| row.chars().count());
    let mut grid = Grid::new(rows, cols).map_err(|e| e.to_string())?;

    for (r, row_str) in s.iter().enumerate() {
        let len = row_str.chars().count();
        if len != cols {
            return Err(format!(
                "Row {} has {} characters, expected {}",
                r, len, cols
            ));
        }

        for (c, ch) in row_str.chars().enumerate() {
            let cell = match ch {
                '.' => Cell::Empty,
                '#' => Cell::Obstacle,
                '1'..='9' | 'a'..='z' => {
                    // The match arm guarantees a non-zero base-36 digit.
                    let id = ch.to_digit(36).and_then(|d| PlayerId::new(d as u8));
                    match id {
                        Some(id) => Cell::OwnedBy(id),
                        None => return Err(format!("Invalid player digit '{}'", ch)),
                    }
                }
                _ => {
                    return Err(format!(
                        "Unrecognized character '{}' in row {} col {}",
                        ch, r, c
                    ))
                }
            };
            grid.set(r, c, cell).map_err(|e| e.to_string())?;
        }
    }
    Ok(grid)
}

/// Sanity-checks a username typed by a player.
///
/// Empty input falls back to `default`. Otherwise the name must be between
/// `MIN_USERNAME_LEN` and `MAX_USERNAME_LEN` characters long.
pub fn validate_username(input: &str, default: &str) -> Result<String, InputError> {
    let len = input.chars().count();
    if len == 0 {
        return Ok(default.to_string());
    }
    if len > MAX_USERNAME_LEN {
        return Err(InputError::UsernameTooLong(input.to_string()));
    }
    if len < MIN_USERNAME_LEN {
        return Err(InputError::UsernameTooShort(input.to_string()));
    }
    Ok(input.to_string())
}

/// Parses a 1-based column number and returns the 0-based column index.
pub fn parse_column(input: &str, cols: usize) -> Result<usize, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(InputError::NotANumber(trimmed.to_string()));
    }
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=cols).contains(&n) => Ok(n - 1),
        _ => Err(InputError::ColumnOutOfRange {
            input: trimmed.to_string(),
            max: cols,
        }),
    }
}
