//! Table setups for specific games.
//!
//! Each submodule provides a `TableSetup` that a host registers for its
//! game in a `SetupRegistry`.

pub mod single_deck;
