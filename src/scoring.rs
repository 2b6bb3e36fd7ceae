//! Run-based scoring.
//!
//! Every scoring pass starts from nothing and derives each player's score
//! from the current grid alone. The grid is cut into lanes in four
//! directions, each lane is split into runs of equal cells, and every run of
//! a player's discs at least `connect_size` long is worth
//! `len - (connect_size - 1)` points: a run of exactly `connect_size` scores
//! 1, and each extra disc scores one more.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::engine::{Cell, Grid, PlayerId};
use crate::player::PlayerRegistry;

/// Points per player, in id order.
pub type ScoreMap = BTreeMap<PlayerId, u32>;

/// A family of lanes scanned for runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Every row, left to right.
    Horizontal,
    /// Every column, top to bottom.
    Vertical,
    /// Diagonals running down and to the right (`col - row` constant).
    Diagonal,
    /// Diagonals running down and to the left (`col + row` constant).
    AntiDiagonal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];
}

/// Generates the `(row, col)` coordinates of every lane in one direction.
///
/// Each lane is ordered; consecutive coordinates are neighbours in that
/// direction. Diagonal lanes include the one-cell corners.
pub fn lanes(rows: usize, cols: usize, direction: Direction) -> Vec<Vec<(usize, usize)>> {
    match direction {
        Direction::Horizontal => (0..rows)
            .map(|r| (0..cols).map(|c| (r, c)).collect())
            .collect(),
        Direction::Vertical => (0..cols)
            .map(|c| (0..rows).map(|r| (r, c)).collect())
            .collect(),
        Direction::Diagonal => {
            // k = col - row ranges over [-(rows - 1), cols - 1].
            let (rows, cols) = (rows as isize, cols as isize);
            (-(rows - 1)..cols)
                .map(|k| {
                    (0..rows)
                        .filter_map(|r| {
                            let c = r + k;
                            (0..cols).contains(&c).then_some((r as usize, c as usize))
                        })
                        .collect()
                })
                .collect()
        }
        Direction::AntiDiagonal => {
            // s = col + row ranges over [0, rows + cols - 2].
            (0..rows + cols - 1)
                .map(|s| {
                    (0..rows)
                        .filter_map(|r| {
                            let c = s.checked_sub(r)?;
                            (c < cols).then_some((r, c))
                        })
                        .collect()
                })
                .collect()
        }
    }
}

/// Run-length encodes a lane into `(value, length)` pairs of maximal runs.
///
/// ```
/// use connect_twist::engine::Cell;
/// use connect_twist::scoring::runs;
/// let lane = [Cell::Empty, Cell::Obstacle, Cell::Obstacle, Cell::Empty];
/// assert_eq!(runs(&lane), vec![(Cell::Empty, 1), (Cell::Obstacle, 2), (Cell::Empty, 1)]);
/// ```
pub fn runs(lane: &[Cell]) -> Vec<(Cell, usize)> {
    let mut encoded: Vec<(Cell, usize)> = Vec::new();
    for &cell in lane {
        match encoded.last_mut() {
            Some((value, len)) if *value == cell => *len += 1,
            _ => encoded.push((cell, 1)),
        }
    }
    encoded
}

/// Points a single run is worth.
pub fn run_points(len: usize, connect_size: usize) -> u32 {
    // A connect size of 0 behaves like 1.
    let connect_size = connect_size.max(1);
    if len < connect_size {
        0
    } else {
        (len - (connect_size - 1)) as u32
    }
}

/// Builds a fresh ledger from the lanes of the given directions.
///
/// Only players that own at least one scoring run get an entry. The result
/// does not depend on the order of `directions`.
pub fn score_ledger(grid: &Grid, directions: &[Direction], connect_size: usize) -> ScoreMap {
    let mut ledger = ScoreMap::new();
    for &direction in directions {
        for lane in lanes(grid.rows(), grid.cols(), direction) {
            if lane.len() < connect_size {
                continue;
            }
            let cells: Vec<Cell> = lane
                .iter()
                .filter_map(|&(r, c)| grid.get(r, c).ok())
                .collect();
            for (cell, len) in runs(&cells) {
                let Cell::OwnedBy(id) = cell else {
                    continue;
                };
                let points = run_points(len, connect_size);
                if points > 0 {
                    *ledger.entry(id).or_insert(0) += points;
                }
            }
        }
    }
    ledger
}

/// Recomputes every registered player's score from the grid.
///
/// Scores are overwritten, never accumulated: a player with no qualifying
/// run this pass ends up at 0 even if they had points before.
///
/// # Returns
/// The new score of every registered player.
pub fn recompute_scores(
    grid: &Grid,
    registry: &mut PlayerRegistry,
    connect_size: usize,
) -> ScoreMap {
    let ledger = score_ledger(grid, &Direction::ALL, connect_size);

    for id in ledger.keys() {
        if registry.get(*id).is_err() {
            warn!(player = %id, "grid holds discs of an unregistered player");
        }
    }

    let mut scores = ScoreMap::new();
    for player in registry.iter_mut() {
        let score = ledger.get(&player.id()).copied().unwrap_or(0);
        player.set_score(score);
        scores.insert(player.id(), score);
    }
    debug!(?scores, "scores recomputed");
    scores
}
