//! Move kinds and move execution.
//!
//! A move request is a `(player, kind, column)` triple. Validation and
//! execution happen together in [`perform_move`]: either the whole move is
//! applied (including gravity for destructive moves and the resource
//! decrement) or nothing changes and an error is returned.

use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::engine::{Cell, Grid};
use crate::error::{EngineError, IllegalMove, InputError, OutOfBounds};
use crate::player::Player;

/// The three kinds of move a player can make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Drop a disc into a column. Free and unlimited.
    Normal,
    /// Remove your own disc from the bottom of a column, then settle.
    PopOut,
    /// Clear the 3x3 area around the landing cell, then settle.
    Special,
}

impl MoveKind {
    pub const ALL: [MoveKind; 3] = [MoveKind::Normal, MoveKind::PopOut, MoveKind::Special];

    /// The full keyword players can type (or abbreviate).
    pub fn keyword(self) -> &'static str {
        match self {
            MoveKind::Normal => "normal",
            MoveKind::PopOut => "popout",
            MoveKind::Special => "special",
        }
    }

    /// The one-character canonical code: `n`, `p` or `s`.
    pub fn code(self) -> char {
        match self {
            MoveKind::Normal => 'n',
            MoveKind::PopOut => 'p',
            MoveKind::Special => 's',
        }
    }

    /// Looks a move kind up by its canonical code.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'n' => Some(MoveKind::Normal),
            'p' => Some(MoveKind::PopOut),
            's' => Some(MoveKind::Special),
            _ => None,
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for MoveKind {
    type Err = InputError;

    /// Case-insensitive prefix match against `normal`, `popout` and
    /// `special`. Empty input selects `Normal`.
    ///
    /// ```
    /// use connect_twist::moves::MoveKind;
    /// assert_eq!("".parse::<MoveKind>().unwrap(), MoveKind::Normal);
    /// assert_eq!("Pop".parse::<MoveKind>().unwrap(), MoveKind::PopOut);
    /// assert_eq!("S".parse::<MoveKind>().unwrap(), MoveKind::Special);
    /// assert!("x".parse::<MoveKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        if input.is_empty() {
            return Ok(MoveKind::Normal);
        }
        MoveKind::ALL
            .into_iter()
            .find(|kind| kind.keyword().starts_with(&input))
            .ok_or_else(|| InputError::UnknownMoveKind(s.trim().to_string()))
    }
}

/// Validates and applies one move for `player` in `column`.
///
/// 1. The landing row is where a disc dropped into `column` would rest.
///    `Normal` and `Special` need one and fail with `ColumnFull` otherwise;
///    `PopOut` does not.
/// 2. `Normal` stamps the player's disc on the landing row.
/// 3. `PopOut` needs a pop-out left and the player's own disc in the bottom
///    row of the column. That disc is removed and the grid settled.
/// 4. `Special` needs a special left. Every cell in the 3x3 window around the
///    landing cell (clamped to the grid) is emptied, whoever owns it and
///    including obstacle cells, and the grid is settled.
///
/// Resource counters are only spent when the move succeeds.
///
/// # Errors
/// * `OutOfBounds::Column` if `column` is not on the grid.
/// * `IllegalMove` for rule violations (see above).
pub fn perform_move(
    grid: &mut Grid,
    player: &mut Player,
    kind: MoveKind,
    column: usize,
) -> Result<(), EngineError> {
    if column >= grid.cols() {
        return Err(OutOfBounds::Column {
            col: column,
            cols: grid.cols(),
        }
        .into());
    }
    let landing = grid.landing_row(column)?;
    let disc = Cell::OwnedBy(player.id());

    match kind {
        MoveKind::Normal => {
            let row = landing.ok_or(IllegalMove::ColumnFull)?;
            grid.set(row, column, disc)?;
            debug!(player = %player.id(), row, column, "dropped disc");
        }
        MoveKind::PopOut => {
            if player.pop_outs_left() == 0 {
                return Err(IllegalMove::NoPopOutsLeft.into());
            }
            let bottom = grid.rows() - 1;
            if grid.get(bottom, column)? != disc {
                return Err(IllegalMove::NotYourDisc.into());
            }
            grid.set(bottom, column, Cell::Empty)?;
            grid.apply_gravity();
            let spent = player.use_pop_out();
            debug_assert!(spent, "pop-out counter checked above");
            debug!(player = %player.id(), column, "popped out disc");
        }
        MoveKind::Special => {
            let row = landing.ok_or(IllegalMove::ColumnFull)?;
            if player.specials_left() == 0 {
                return Err(IllegalMove::NoSpecialsLeft.into());
            }
            let rows = row.saturating_sub(1)..(row + 2).min(grid.rows());
            let cols = column.saturating_sub(1)..(column + 2).min(grid.cols());
            let mut cleared = 0;
            for r in rows {
                for c in cols.clone() {
                    if grid.get(r, c)? != Cell::Empty {
                        cleared += 1;
                    }
                    grid.set(r, c, Cell::Empty)?;
                }
            }
            grid.apply_gravity();
            let spent = player.use_special();
            debug_assert!(spent, "special counter checked above");
            debug!(player = %player.id(), row, column, cleared, "special disc exploded");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlayerId;
    use crate::player::PlayerRegistry;
    use crate::utils::grid_from_str_array;

    fn two_players() -> (PlayerRegistry, PlayerId, PlayerId) {
        let mut registry = PlayerRegistry::new();
        let a = registry.create_player().unwrap();
        let b = registry.create_player().unwrap();
        (registry, a, b)
    }

    fn obstacle_cells(grid: &Grid) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for r in 0..grid.rows() {
            for c in 0..grid.cols() {
                if grid.get(r, c).unwrap() == Cell::Obstacle {
                    found.push((r, c));
                }
            }
        }
        found
    }

    #[test]
    fn test_parse_move_kind_prefixes() {
        assert_eq!("n".parse::<MoveKind>(), Ok(MoveKind::Normal));
        assert_eq!("NORMAL".parse::<MoveKind>(), Ok(MoveKind::Normal));
        assert_eq!("po".parse::<MoveKind>(), Ok(MoveKind::PopOut));
        assert_eq!("popout".parse::<MoveKind>(), Ok(MoveKind::PopOut));
        assert_eq!("  spec ".parse::<MoveKind>(), Ok(MoveKind::Special));
        assert_eq!(
            "popouts".parse::<MoveKind>(),
            Err(InputError::UnknownMoveKind("popouts".to_string()))
        );
        assert!("q".parse::<MoveKind>().is_err());
    }

    #[test]
    fn test_codes_round_trip() {
        for kind in MoveKind::ALL {
            assert_eq!(MoveKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(MoveKind::from_code('x'), None);
    }

    #[test]
    fn test_normal_drops_to_lowest_empty() {
        let (mut registry, a, b) = two_players();
        let mut grid = grid_from_str_array(&["...", "...", "#.."]).unwrap();

        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Normal, 0).unwrap();
        perform_move(&mut grid, registry.get_mut(b).unwrap(), MoveKind::Normal, 1).unwrap();
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Normal, 1).unwrap();
        assert_eq!(grid.to_string(), "...\n11.\n#2.");
    }

    #[test]
    fn test_normal_on_full_column_fails() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["2.", "1.", "#."]).unwrap();
        let before = grid.clone();
        let err = perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Normal, 0)
            .unwrap_err();
        assert_eq!(err, EngineError::IllegalMove(IllegalMove::ColumnFull));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_column_out_of_range() {
        let (mut registry, a, _) = two_players();
        let mut grid = Grid::new(3, 3).unwrap();
        let err = perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Normal, 3)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::OutOfBounds(OutOfBounds::Column { col: 3, cols: 3 })
        );
    }

    #[test]
    fn test_pop_out_removes_own_disc_and_settles() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["...", "2..", "1..", "1.."]).unwrap();
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::PopOut, 0).unwrap();
        assert_eq!(grid.to_string(), "...\n...\n2..\n1..");
        assert_eq!(registry.get(a).unwrap().pop_outs_left(), 0);
    }

    #[test]
    fn test_pop_out_on_full_column_allowed() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["2", "1"]).unwrap();
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::PopOut, 0).unwrap();
        assert_eq!(grid.to_string(), ".\n2");
    }

    #[test]
    fn test_pop_out_leaves_empty_when_nothing_above() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["..", "1."]).unwrap();
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::PopOut, 0).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_pop_out_rejects_other_players_disc() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["..", "2."]).unwrap();
        let err = perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::PopOut, 0)
            .unwrap_err();
        assert_eq!(err.illegal_move(), Some(IllegalMove::NotYourDisc));
        assert_eq!(registry.get(a).unwrap().pop_outs_left(), 1, "failed move must not cost a pop-out");
    }

    #[test]
    fn test_pop_out_rejects_obstacle_and_empty() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["..", "#."]).unwrap();
        let player = registry.get_mut(a).unwrap();
        assert_eq!(
            perform_move(&mut grid, player, MoveKind::PopOut, 0).unwrap_err().illegal_move(),
            Some(IllegalMove::NotYourDisc)
        );
        assert_eq!(
            perform_move(&mut grid, player, MoveKind::PopOut, 1).unwrap_err().illegal_move(),
            Some(IllegalMove::NotYourDisc)
        );
        assert_eq!(grid.get(1, 0).unwrap(), Cell::Obstacle);
    }

    #[test]
    fn test_pop_out_limit() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["1.", "1."]).unwrap();
        let player = registry.get_mut(a).unwrap();
        perform_move(&mut grid, player, MoveKind::PopOut, 0).unwrap();
        let err = perform_move(&mut grid, player, MoveKind::PopOut, 0).unwrap_err();
        assert_eq!(err.illegal_move(), Some(IllegalMove::NoPopOutsLeft));
        assert_eq!(grid.to_string(), "..\n1.");
    }

    #[test]
    fn test_special_clears_three_by_three_any_owner() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&[
            ".....", //
            ".....",
            ".....",
            ".2.2.",
            "12121",
        ])
        .unwrap();
        // Column 2 lands on row 3; window is rows 2..=4, cols 1..=3.
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Special, 2).unwrap();
        assert_eq!(grid.to_string(), ".....\n.....\n.....\n.....\n1...1");
        assert_eq!(registry.get(a).unwrap().specials_left(), 0);
    }

    #[test]
    fn test_special_clamps_at_edges() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["...", "...", "21.", "12."]).unwrap();
        // Column 0 lands on row 1; window rows 0..=2, cols 0..=1.
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Special, 0).unwrap();
        assert_eq!(grid.to_string(), "...\n...\n...\n12.");
    }

    #[test]
    fn test_special_settles_disturbed_columns() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&[
            "2...", //
            "1...",
            "2...",
            "1...",
            "2...",
            "1...",
        ])
        .unwrap();
        // Column 1 is empty: lands on row 5, clears rows 4..=5 of columns 0..=2.
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Special, 1).unwrap();
        assert_eq!(grid.to_string(), "....\n....\n2...\n1...\n2...\n1...");
    }

    #[test]
    fn test_special_clears_obstacle_cells() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&[
            "....", //
            "....",
            ".##.",
            ".##.",
        ])
        .unwrap();
        // Column 0 lands on row 3: window rows 2..=3, cols 0..=1.
        perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Special, 0).unwrap();
        assert_eq!(obstacle_cells(&grid), vec![(2, 2), (3, 2)]);
    }

    #[test]
    fn test_special_on_full_column_fails() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["1.", "2."]).unwrap();
        let err = perform_move(&mut grid, registry.get_mut(a).unwrap(), MoveKind::Special, 0)
            .unwrap_err();
        assert_eq!(err.illegal_move(), Some(IllegalMove::ColumnFull));
        assert_eq!(registry.get(a).unwrap().specials_left(), 1);
    }

    #[test]
    fn test_special_limit() {
        let (mut registry, a, _) = two_players();
        let mut grid = Grid::new(4, 4).unwrap();
        let player = registry.get_mut(a).unwrap();
        perform_move(&mut grid, player, MoveKind::Special, 0).unwrap();
        let err = perform_move(&mut grid, player, MoveKind::Special, 0).unwrap_err();
        assert_eq!(err.illegal_move(), Some(IllegalMove::NoSpecialsLeft));
    }

    #[test]
    fn test_each_move_spends_only_its_own_counter() {
        let (mut registry, a, _) = two_players();
        let mut grid = grid_from_str_array(&["...", "...", "1.."]).unwrap();
        let player = registry.get_mut(a).unwrap();

        perform_move(&mut grid, player, MoveKind::Normal, 1).unwrap();
        assert_eq!((player.pop_outs_left(), player.specials_left()), (1, 1));

        perform_move(&mut grid, player, MoveKind::PopOut, 0).unwrap();
        assert_eq!((player.pop_outs_left(), player.specials_left()), (0, 1));

        perform_move(&mut grid, player, MoveKind::Special, 2).unwrap();
        assert_eq!((player.pop_outs_left(), player.specials_left()), (0, 0));
    }

    #[test]
    fn test_normal_and_pop_out_never_touch_obstacles() {
        let (mut registry, a, b) = two_players();
        let mut grid = grid_from_str_array(&[
            ".....", //
            ".....",
            ".....",
            ".##..",
            ".##..",
        ])
        .unwrap();
        let obstacles = obstacle_cells(&grid);

        let script = [
            (a, MoveKind::Normal, 0),
            (b, MoveKind::Normal, 1),
            (a, MoveKind::Normal, 2),
            (b, MoveKind::Normal, 0),
            (a, MoveKind::PopOut, 0),
            (b, MoveKind::PopOut, 1),
            (a, MoveKind::Normal, 1),
            (b, MoveKind::Normal, 1),
            (a, MoveKind::Normal, 1),
            (b, MoveKind::Normal, 1),
        ];
        for (id, kind, column) in script {
            // Some of these are illegal; obstacles must survive either way.
            let _ = perform_move(&mut grid, registry.get_mut(id).unwrap(), kind, column);
            assert_eq!(obstacle_cells(&grid), obstacles);
        }
    }
}
