//! Catalog: the universe of pieces a game can put on a table.
//!
//! ## Key Types
//!
//! - `Game`: identity, player bounds and default card back
//! - `Card` / `Token`: pieces owned by one game
//! - `NewGame` / `NewCard` / `NewToken`: unvalidated entries to register
//! - `Catalog`: validation, id assignment and lookup
//! - `AssetRef`: opaque image path in an external asset store

pub mod definition;
pub mod registry;

pub use definition::{
    AssetRef, Card, CardBack, Game, NewCard, NewGame, NewToken, Token, GAME_NAME_MAX,
    PIECE_NAME_MAX,
};
pub use registry::Catalog;
