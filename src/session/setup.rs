//! Table setup hooks.
//!
//! A game may register a `TableSetup` that lays out the starting stacks of
//! every new table. The store runs it exactly once, inside the creation
//! transaction, after the initial players are seated. If it fails, the
//! table is never created.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::catalog::Catalog;
use crate::core::entity::GameId;
use crate::core::state::TableState;
use crate::error::Result;

/// Lays out the starting stacks of a new table.
///
/// ## Implementation Notes
///
/// - Log setup moves with `Actor::Setup`
/// - Only `TableState` operations are available, so every placement is
///   ordered and logged like a player move
/// - Must not depend on anything outside `catalog` and `state`
pub trait TableSetup: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Populate a freshly created table.
    fn setup(&self, catalog: &Catalog, state: &mut TableState) -> Result<()>;
}

/// Setup hooks keyed by game.
#[derive(Clone, Default)]
pub struct SetupRegistry {
    setups: FxHashMap<GameId, Arc<dyn TableSetup>>,
}

impl SetupRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setup for a game, replacing any previous one.
    pub fn register(&mut self, game: GameId, setup: impl TableSetup + 'static) {
        self.setups.insert(game, Arc::new(setup));
    }

    /// Register a setup for a game (builder style).
    #[must_use]
    pub fn with(mut self, game: GameId, setup: impl TableSetup + 'static) -> Self {
        self.register(game, setup);
        self
    }

    /// Setup for a game, if any.
    #[must_use]
    pub fn get(&self, game: GameId) -> Option<&Arc<dyn TableSetup>> {
        self.setups.get(&game)
    }

    /// Number of registered setups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.setups.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setups.is_empty()
    }
}

impl std::fmt::Debug for SetupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self
            .setups
            .iter()
            .map(|(game, setup)| (*game, setup.name().to_string()))
            .collect();
        names.sort();
        f.debug_struct("SetupRegistry").field("setups", &names).finish()
    }
}
