//! Live tables.
//!
//! ## Key Types
//!
//! - `Table`: id and game of a play session
//! - `TableSetup` / `SetupRegistry`: per-game hooks that lay out new tables
//! - `TableStore`: all live tables, with optimistic transactions
//! - `Transaction`: a working copy taken with `begin`

pub mod setup;
pub mod store;
pub mod table;

pub use setup::{SetupRegistry, TableSetup};
pub use store::{TableStore, Transaction};
pub use table::Table;
