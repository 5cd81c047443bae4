//! Table identity.

use serde::{Deserialize, Serialize};

use crate::core::entity::{GameId, TableId};

/// A live play session of one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub game: GameId,
}

impl Table {
    /// Create a table record.
    #[must_use]
    pub const fn new(id: TableId, game: GameId) -> Self {
        Self { id, game }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.id, self.game)
    }
}
