//! Core types: entity ids, players, table state, actions, RNG, configuration.
//!
//! Nothing here knows about a specific game. Games plug in through
//! `session::TableSetup`.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;

pub use entity::{ActionId, CardId, GameId, StackCardId, StackId, TableId, TokenId};
pub use player::{PlayerBounds, PlayerRoster, UserId};
pub use rng::{TableRng, TableRngState};
pub use config::TableConfig;
pub use action::{ActionKind, ActionLog, TableAction};
pub use state::{Actor, TableState};
