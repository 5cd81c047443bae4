//! Error taxonomy.
//!
//! - `ValidationError`: a field or count constraint was violated.
//! - `ReferenceError`: an id does not exist, or belongs to another table/game.
//! - `ConcurrencyConflict`: a transaction lost an optimistic-version race.
//! - `OrderingIntegrity`: stack order is no longer dense. Always a bug.
//!
//! Validation and reference errors are raised before anything is committed.

use thiserror::Error;

use crate::core::entity::{CardId, GameId, StackCardId, StackId, TableId, TokenId};
use crate::core::player::UserId;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, TabletopError>;

/// Top-level error for every fallible operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TabletopError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("{table} was modified concurrently; gave up after {attempts} attempt(s)")]
    ConcurrencyConflict { table: TableId, attempts: u32 },

    #[error("ordering integrity violated in {stack}: {detail}")]
    OrderingIntegrity { stack: StackId, detail: String },

    #[error("lock for {0} was poisoned")]
    Poisoned(TableId),

    #[error("snapshot codec failed: {0}")]
    Snapshot(String),
}

impl TabletopError {
    /// Whether retrying the same operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, TabletopError::ConcurrencyConflict { .. })
    }

    /// Whether this error indicates a bug rather than bad input.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TabletopError::OrderingIntegrity { .. } | TabletopError::Poisoned(_)
        )
    }
}

/// A field or count constraint was violated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is {len} characters long, at most {max} allowed")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("invalid player bounds: min {min}, max {max}")]
    PlayerBounds { min: u32, max: u32 },

    #[error("{count} player(s) is below the minimum of {min}")]
    TooFewPlayers { min: u32, count: usize },

    #[error("{count} player(s) exceeds the maximum of {max}")]
    TooManyPlayers { max: u32, count: usize },

    #[error("user {0} is already seated at this table")]
    AlreadySeated(UserId),

    #[error("card number {number} is already used in {game}")]
    DuplicateCardNumber { game: GameId, number: i32 },

    #[error("a hand stack must have an owning player")]
    HandWithoutOwner,

    #[error("selection names no cards")]
    EmptySelection,

    #[error("{stack_card} is selected more than once")]
    DuplicateSelection { stack_card: StackCardId },

    #[error("{stack} holds {available} card(s), {requested} requested")]
    NotEnoughCards {
        stack: StackId,
        requested: usize,
        available: usize,
    },

    #[error("{0} still holds cards")]
    StackNotEmpty(StackId),
}

/// An id does not resolve, or resolves to something in the wrong scope.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("unknown {0}")]
    UnknownGame(GameId),

    #[error("unknown {0}")]
    UnknownCard(CardId),

    #[error("unknown {0}")]
    UnknownToken(TokenId),

    #[error("unknown {0}")]
    UnknownTable(TableId),

    #[error("unknown {0}")]
    UnknownStack(StackId),

    #[error("unknown {0}")]
    UnknownStackCard(StackCardId),

    #[error("user {0} is not seated at this table")]
    NotSeated(UserId),

    #[error("{card} belongs to {actual}, table plays {expected}")]
    CardOfOtherGame {
        card: CardId,
        expected: GameId,
        actual: GameId,
    },

    #[error("{token} belongs to {actual}, table plays {expected}")]
    TokenOfOtherGame {
        token: TokenId,
        expected: GameId,
        actual: GameId,
    },

    #[error("{stack_card} is not in {stack}")]
    NotInStack {
        stack_card: StackCardId,
        stack: StackId,
    },
}
