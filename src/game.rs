//! Game session: one grid, its players, and the turn loop glue.
//!
//! `Game` runs the per-turn pipeline: move execution (with gravity for
//! destructive moves), then a full scoring pass, then the turn passes on.
//! It never reads input or measures time; a driver feeds it already-parsed
//! move requests and tells it when a player ran out of time.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

use crate::config::GameConfig;
use crate::engine::{Cell, Grid, ObstacleSize, PlayerId};
use crate::error::EngineError;
use crate::moves::{perform_move, MoveKind};
use crate::player::{Player, PlayerRegistry};
use crate::scoring::{recompute_scores, ScoreMap};

/// A player's score before and after a scoring pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreChange {
    pub player: PlayerId,
    pub old: u32,
    pub new: u32,
}

impl ScoreChange {
    /// Points gained, or 0 if the score went down.
    pub fn gained(&self) -> u32 {
        self.new.saturating_sub(self.old)
    }

    /// Points lost, or 0 if the score went up.
    pub fn lost(&self) -> u32 {
        self.old.saturating_sub(self.new)
    }
}

/// How a finished game ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Winner { player: PlayerId, score: u32 },
    /// Every player sharing the top score, in id order.
    Tie { players: Vec<PlayerId>, score: u32 },
}

fn register_players(count: usize) -> Result<PlayerRegistry, EngineError> {
    if count == 0 {
        return Err(EngineError::NoPlayers);
    }
    let mut registry = PlayerRegistry::new();
    for _ in 0..count {
        registry.create_player()?;
    }
    Ok(registry)
}

/// Manages the state and progression of one game.
///
/// # Examples
/// ```
/// use connect_twist::config::GameConfig;
/// use connect_twist::game::Game;
/// use connect_twist::moves::MoveKind;
///
/// let config = GameConfig { seed: Some(1), ..GameConfig::default() };
/// let mut game = Game::from_config(&config).unwrap();
/// let first = game.current_player();
/// game.play_turn(MoveKind::Normal, 0).unwrap();
/// assert_ne!(game.current_player(), first);
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    grid: Grid,
    registry: PlayerRegistry,
    connect_size: usize,
    turn: usize,
}

impl Game {
    /// Creates a game from a validated config, seeding obstacle placement
    /// from `config.seed` when present.
    pub fn from_config(config: &GameConfig) -> Result<Self, EngineError> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self::new(
            config.rows,
            config.cols,
            config.obstacle_size(),
            config.connect_size,
            config.players,
            &mut rng,
        )
    }

    /// Creates the grid, registers `players` players (ids `1..=players`) and
    /// places the obstacle block before any move is made.
    #[instrument(skip(rng))]
    pub fn new<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        obstacle: ObstacleSize,
        connect_size: usize,
        players: usize,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        let mut grid = Grid::new(rows, cols)?;
        grid.place_obstacle(obstacle, rng)?;
        let registry = register_players(players)?;
        info!(rows, cols, players, connect_size, "new game");
        Ok(Game {
            grid,
            registry,
            connect_size,
            turn: 0,
        })
    }

    /// Starts a game on an existing grid, for tests and replays.
    pub fn with_grid(grid: Grid, connect_size: usize, players: usize) -> Result<Self, EngineError> {
        let registry = register_players(players)?;
        let mut game = Game {
            grid,
            registry,
            connect_size,
            turn: 0,
        };
        game.rescore();
        Ok(game)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Read-only copy of the cell matrix for renderers.
    pub fn snapshot(&self) -> Vec<Vec<Cell>> {
        self.grid.snapshot()
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, EngineError> {
        self.registry.get(id)
    }

    pub fn connect_size(&self) -> usize {
        self.connect_size
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> PlayerId {
        self.registry.ids()[self.turn % self.registry.len()]
    }

    /// Current scores, in id order.
    pub fn scores(&self) -> ScoreMap {
        self.registry.iter().map(|p| (p.id(), p.score())).collect()
    }

    /// Applies a move for the current player.
    ///
    /// On success the scores are recomputed, the turn passes to the next
    /// player, and the players whose score changed are returned. On failure
    /// nothing changes and it is still the same player's turn.
    #[instrument(skip(self), fields(player = %self.current_player()))]
    pub fn play_turn(&mut self, kind: MoveKind, column: usize) -> Result<Vec<ScoreChange>, EngineError> {
        let id = self.current_player();
        self.play_as(id, kind, column)
    }

    /// Applies a move for a specific player regardless of turn order, then
    /// advances the turn past them.
    pub fn play_as(
        &mut self,
        id: PlayerId,
        kind: MoveKind,
        column: usize,
    ) -> Result<Vec<ScoreChange>, EngineError> {
        let player = self.registry.get_mut(id)?;
        perform_move(&mut self.grid, player, kind, column)?;
        let changes = self.rescore();
        self.turn = id.get() as usize % self.registry.len();
        Ok(changes)
    }

    /// The current player ran out of time; the move goes to the next player.
    pub fn forfeit_turn(&mut self) -> PlayerId {
        let skipped = self.current_player();
        info!(player = %skipped, "turn forfeited");
        self.turn = (self.turn + 1) % self.registry.len();
        skipped
    }

    /// Settles the grid again without making a move.
    pub fn settle(&mut self) -> Vec<ScoreChange> {
        self.grid.apply_gravity();
        self.rescore()
    }

    fn rescore(&mut self) -> Vec<ScoreChange> {
        let old = self.scores();
        let new = recompute_scores(&self.grid, &mut self.registry, self.connect_size);
        new.into_iter()
            .filter_map(|(player, score)| {
                let before = old.get(&player).copied().unwrap_or(0);
                (before != score).then_some(ScoreChange {
                    player,
                    old: before,
                    new: score,
                })
            })
            .collect()
    }

    /// The game ends when no empty cell is left, or when no column can take
    /// another disc. The second case covers empty cells sealed under an
    /// obstacle cell left floating by a Special.
    pub fn is_over(&self) -> bool {
        self.grid.is_full()
            || (0..self.grid.cols()).all(|col| matches!(self.grid.landing_row(col), Ok(None)))
    }

    /// The player(s) with the highest score.
    pub fn outcome(&self) -> Option<Outcome> {
        let best = self.registry.iter().map(Player::score).max()?;
        let mut leaders: Vec<PlayerId> = self
            .registry
            .iter()
            .filter(|p| p.score() == best)
            .map(Player::id)
            .collect();
        if leaders.len() == 1 {
            Some(Outcome::Winner {
                player: leaders.remove(0),
                score: best,
            })
        } else {
            Some(Outcome::Tie {
                players: leaders,
                score: best,
            })
        }
    }
}
