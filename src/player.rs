//! Per-player state and the registry that hands out player ids.

use crate::engine::{PlayerId, MAX_PLAYERS};
use crate::error::EngineError;

/// Number of pop-out moves each player starts with.
pub const STARTING_POP_OUTS: u32 = 1;
/// Number of special discs each player starts with.
pub const STARTING_SPECIALS: u32 = 1;

/// A participant's engine-side state.
///
/// Display details such as the username belong to the driver; the engine
/// only tracks identity, score and the limited-use move counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    score: u32,
    pop_outs_left: u32,
    specials_left: u32,
}

impl Player {
    fn new(id: PlayerId) -> Self {
        Player {
            id,
            score: 0,
            pop_outs_left: STARTING_POP_OUTS,
            specials_left: STARTING_SPECIALS,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// The score from the most recent scoring pass.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn pop_outs_left(&self) -> u32 {
        self.pop_outs_left
    }

    pub fn specials_left(&self) -> u32 {
        self.specials_left
    }

    /// Overwrites the score. Scores are recomputed from the grid, never
    /// accumulated.
    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    /// Spends a pop-out. Returns `false` if none are left.
    pub(crate) fn use_pop_out(&mut self) -> bool {
        if self.pop_outs_left == 0 {
            return false;
        }
        self.pop_outs_left -= 1;
        true
    }

    /// Spends a special disc. Returns `false` if none are left.
    pub(crate) fn use_special(&mut self) -> bool {
        if self.specials_left == 0 {
            return false;
        }
        self.specials_left -= 1;
        true
    }
}

/// Owns every player in a session and assigns ids in creation order,
/// starting at 1.
#[derive(Clone, Debug, Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new player and returns its id.
    ///
    /// # Errors
    /// `EngineError::TooManyPlayers` once `MAX_PLAYERS` ids are in use.
    pub fn create_player(&mut self) -> Result<PlayerId, EngineError> {
        let next = self.players.len() + 1;
        let id = u8::try_from(next)
            .ok()
            .and_then(PlayerId::new)
            .ok_or(EngineError::TooManyPlayers { max: MAX_PLAYERS })?;
        self.players.push(Player::new(id));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    // Ids are dense and 1-based, so the id doubles as an index.
    fn slot(id: PlayerId) -> usize {
        id.get() as usize - 1
    }

    pub fn get(&self, id: PlayerId) -> Result<&Player, EngineError> {
        self.players
            .get(Self::slot(id))
            .ok_or(EngineError::UnknownPlayer(id))
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Result<&mut Player, EngineError> {
        self.players
            .get_mut(Self::slot(id))
            .ok_or(EngineError::UnknownPlayer(id))
    }

    /// Iterates over players in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> + '_ {
        self.players.iter_mut()
    }

    /// Ids in creation order.
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(Player::id).collect()
    }
}
