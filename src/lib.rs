//! # tabletop-stacks
//!
//! Card, stack and table model for a virtual tabletop card game.
//!
//! ## Design Principles
//!
//! 1. **Physical, not rules-aware**: the crate models where cards lie and
//!    which way they face. It never decides whether a move is legal.
//!
//! 2. **Every move is logged**: card movement, shuffles, flips and
//!    rotations each append one `TableAction` per card.
//!
//! 3. **Dense ordering**: within a stack, card orders are always exactly
//!    `0..n`, with 0 at the bottom.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: `TableState` is built on `im`, so a
//!   transaction clones it in O(1) and works on the copy.
//!
//! - **Optimistic commits**: `TableStore` swaps a working copy in only if
//!   the table's version is unchanged, retrying on conflict.
//!
//! ## Modules
//!
//! - `core`: Entity ids, players, table state, actions, RNG, configuration
//! - `catalog`: Games, cards and tokens
//! - `stacks`: Stacks, stack cards and ordering
//! - `session`: Live tables, setup hooks and the transactional store
//! - `view`: What a given viewer sees
//! - `games`: Ready-made table setups

pub mod catalog;
pub mod core;
pub mod error;
pub mod games;
pub mod session;
pub mod stacks;
pub mod view;

// Re-export commonly used types
pub use crate::core::{
    ActionId, ActionKind, ActionLog, Actor, CardId, GameId, PlayerBounds, PlayerRoster,
    StackCardId, StackId, TableAction, TableConfig, TableId, TableRng, TableRngState,
    TableState, TokenId, UserId,
};

pub use crate::catalog::{AssetRef, Card, CardBack, Catalog, Game, NewCard, NewGame, NewToken, Token};

pub use crate::stacks::{
    CardMeta, Destination, Facing, NewStack, Orientation, Selection, Stack, StackCard,
    StackManager, StackPosition, TokenSet, TokenTarget,
};

pub use crate::session::{SetupRegistry, Table, TableSetup, TableStore, Transaction};

pub use crate::view::{CardView, Face, StackView};

pub use crate::error::{ReferenceError, Result, TabletopError, ValidationError};

pub use crate::games::single_deck::SingleDeckSetup;
