//! Table store: the transactional surface over all live tables.
//!
//! Each table's `TableState` lives behind its own mutex. The lock is held
//! only to clone the state out or to swap a new one in. Operations run on
//! the private clone, so concurrent work on one table never blocks for
//! long, and a failed operation leaves nothing behind.
//!
//! ## Commit protocol
//!
//! 1. `begin` clones the state and remembers its version
//! 2. the caller mutates the clone
//! 3. `commit` checks integrity, then swaps the clone in only if the
//!    committed version is still the one it started from
//!
//! A version mismatch is a `ConcurrencyConflict`. `execute` wraps the three
//! steps and retries on conflict up to `TableConfig::max_retries` times.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument, warn};

use super::setup::SetupRegistry;
use super::table::Table;
use crate::catalog::Catalog;
use crate::core::action::TableAction;
use crate::core::config::TableConfig;
use crate::core::entity::{GameId, StackId, TableId};
use crate::core::player::UserId;
use crate::core::state::TableState;
use crate::error::{ReferenceError, Result, TabletopError};
use crate::stacks::StackCard;
use crate::view::{self, StackView};

type TableCell = Arc<Mutex<TableState>>;

/// A working copy of one table.
///
/// Dropping a transaction without committing discards it.
#[derive(Clone, Debug)]
#[must_use = "a transaction does nothing until committed"]
pub struct Transaction {
    table: TableId,
    base_version: u64,
    state: TableState,
}

impl Transaction {
    /// Table this transaction works on.
    pub fn table(&self) -> TableId {
        self.table
    }

    /// Version the working copy was taken from.
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    /// The working copy.
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// The working copy, mutably.
    pub fn state_mut(&mut self) -> &mut TableState {
        &mut self.state
    }
}

/// All live tables of one catalog.
pub struct TableStore {
    catalog: Arc<Catalog>,
    setups: SetupRegistry,
    config: TableConfig,
    tables: RwLock<FxHashMap<TableId, TableCell>>,
    next_table: AtomicU32,
}

impl TableStore {
    /// Create a store with no setup hooks.
    ///
    /// `config.unique_card_numbers` is not applied here: the catalog was
    /// already built with its own rule (see `Catalog::with_config`). A
    /// mismatch is logged.
    #[must_use]
    pub fn new(catalog: Catalog, config: TableConfig) -> Self {
        if catalog.unique_card_numbers() != config.unique_card_numbers {
            warn!(
                catalog = catalog.unique_card_numbers(),
                config = config.unique_card_numbers,
                "card number rule differs from the catalog's"
            );
        }
        Self {
            catalog: Arc::new(catalog),
            setups: SetupRegistry::new(),
            config,
            tables: RwLock::new(FxHashMap::default()),
            next_table: AtomicU32::new(0),
        }
    }

    /// Use these setup hooks for new tables.
    #[must_use]
    pub fn with_setups(mut self, setups: SetupRegistry) -> Self {
        self.setups = setups;
        self
    }

    /// The catalog all tables play from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Store configuration.
    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Ids of all live tables, sorted.
    pub fn table_ids(&self) -> Result<Vec<TableId>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| TabletopError::Poisoned(TableId::default()))?;
        let mut ids: Vec<_> = tables.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    // === Table lifecycle ===

    /// Start a table for `game` with `players` seated, and run the game's
    /// setup hook once.
    ///
    /// Nothing is stored if seating, setup or the integrity check fails.
    #[instrument(skip(self, players), fields(players = players.len()))]
    pub fn create_table(&self, game: GameId, players: &[UserId]) -> Result<TableId> {
        let bounds = self.catalog.game(game)?.players;
        if self.config.enforce_player_bounds {
            bounds.check_min(players.len())?;
        }

        let id = TableId::new(self.next_table.fetch_add(1, Ordering::Relaxed));
        let mut state = TableState::new(Table::new(id, game), bounds, self.config.seed);
        for &user in players {
            state.join(user)?;
        }

        if let Some(setup) = self.setups.get(game) {
            debug!(setup = setup.name(), table = %id, "running table setup");
            setup.setup(&self.catalog, &mut state)?;
        }
        state.check_integrity()?;
        state.bump_version();

        self.insert(state)?;
        info!(table = %id, %game, "table created");
        Ok(id)
    }

    /// End a table, returning its final state.
    #[instrument(skip(self))]
    pub fn end_table(&self, table: TableId) -> Result<TableState> {
        let cell = self
            .tables
            .write()
            .map_err(|_| TabletopError::Poisoned(table))?
            .remove(&table)
            .ok_or(ReferenceError::UnknownTable(table))?;
        let state = cell
            .lock()
            .map_err(|_| TabletopError::Poisoned(table))?
            .clone();
        info!(table = %table, actions = state.log().len(), "table ended");
        Ok(state)
    }

    /// Seat a user at a table.
    pub fn join(&self, table: TableId, user: UserId) -> Result<usize> {
        self.execute(table, |state, _| state.join(user))
    }

    /// Unseat a user.
    pub fn leave(&self, table: TableId, user: UserId) -> Result<()> {
        self.execute(table, |state, _| state.leave(user))
    }

    // === Transactions ===

    /// Take a working copy of a table.
    pub fn begin(&self, table: TableId) -> Result<Transaction> {
        let state = self.snapshot(table)?;
        Ok(Transaction {
            table,
            base_version: state.version(),
            state,
        })
    }

    /// Commit a working copy. Returns the new version.
    ///
    /// Fails with `ConcurrencyConflict` if another commit landed since
    /// `begin`, and with `OrderingIntegrity` if the copy is inconsistent.
    pub fn commit(&self, tx: Transaction) -> Result<u64> {
        let Transaction {
            table,
            base_version,
            mut state,
        } = tx;
        state.check_integrity()?;

        let cell = self.cell(table)?;
        let mut current = cell.lock().map_err(|_| TabletopError::Poisoned(table))?;
        if current.version() != base_version {
            debug!(
                table = %table,
                base_version,
                current = current.version(),
                "stale transaction"
            );
            return Err(TabletopError::ConcurrencyConflict { table, attempts: 1 });
        }

        state.bump_version();
        let version = state.version();
        *current = state;
        Ok(version)
    }

    /// Run `op` as a transaction, retrying on conflict.
    ///
    /// `op` may run more than once and must not have side effects outside
    /// the state it is given. Any error other than a conflict is returned
    /// immediately without retrying.
    #[instrument(skip(self, op))]
    pub fn execute<T, F>(&self, table: TableId, mut op: F) -> Result<T>
    where
        F: FnMut(&mut TableState, &Catalog) -> Result<T>,
    {
        let attempts = self.config.max_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let mut tx = self.begin(table)?;
            let value = op(tx.state_mut(), &self.catalog)?;
            match self.commit(tx) {
                Ok(version) => {
                    debug!(version, attempt, "committed");
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => {
                    warn!(attempt, "commit conflict, retrying");
                }
                Err(err) => return Err(err),
            }
        }
        warn!(attempts, "giving up after repeated conflicts");
        Err(TabletopError::ConcurrencyConflict { table, attempts })
    }

    // === Reads ===

    /// Clone of a table's committed state.
    pub fn snapshot(&self, table: TableId) -> Result<TableState> {
        let cell = self.cell(table)?;
        let state = cell.lock().map_err(|_| TabletopError::Poisoned(table))?;
        Ok(state.clone())
    }

    /// Committed cards of a stack, bottom first.
    pub fn stack_contents(&self, table: TableId, stack: StackId) -> Result<Vec<StackCard>> {
        let state = self.snapshot(table)?;
        let cards = state.stack_cards(stack)?.into_iter().cloned().collect();
        Ok(cards)
    }

    /// Committed action log of a table, oldest first.
    pub fn actions(&self, table: TableId) -> Result<Vec<TableAction>> {
        Ok(self.snapshot(table)?.actions().cloned().collect())
    }

    /// A stack as `viewer` sees it.
    pub fn view_stack(
        &self,
        table: TableId,
        stack: StackId,
        viewer: Option<UserId>,
    ) -> Result<StackView> {
        view::view_stack(&self.snapshot(table)?, &self.catalog, stack, viewer)
    }

    /// Every stack of a table as `viewer` sees it.
    pub fn view_table(&self, table: TableId, viewer: Option<UserId>) -> Result<Vec<StackView>> {
        view::view_table(&self.snapshot(table)?, &self.catalog, viewer)
    }

    // === Snapshots ===

    /// Encode a table's committed state with bincode.
    #[instrument(skip(self))]
    pub fn export(&self, table: TableId) -> Result<Vec<u8>> {
        let state = self.snapshot(table)?;
        let bytes =
            bincode::serialize(&state).map_err(|e| TabletopError::Snapshot(e.to_string()))?;
        debug!(bytes = bytes.len(), "exported table");
        Ok(bytes)
    }

    /// Load a table from an exported snapshot.
    ///
    /// The snapshot must pass the integrity check and its table id must not
    /// be live. Its game, cards and tokens must exist in this store's
    /// catalog, and its roster must fit the game's `max_players`.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn import(&self, bytes: &[u8]) -> Result<TableId> {
        let state: TableState =
            bincode::deserialize(bytes).map_err(|e| TabletopError::Snapshot(e.to_string()))?;
        state.check_integrity()?;
        state.check_references(&self.catalog)?;

        let id = state.id();
        self.next_table
            .fetch_max(id.raw().saturating_add(1), Ordering::Relaxed);
        self.insert(state)?;
        info!(table = %id, "table imported");
        Ok(id)
    }

    fn insert(&self, state: TableState) -> Result<()> {
        let id = state.id();
        let mut tables = self
            .tables
            .write()
            .map_err(|_| TabletopError::Poisoned(id))?;
        if tables.contains_key(&id) {
            return Err(TabletopError::Snapshot(format!("{id} is already live")));
        }
        tables.insert(id, Arc::new(Mutex::new(state)));
        Ok(())
    }

    fn cell(&self, table: TableId) -> Result<TableCell> {
        self.tables
            .read()
            .map_err(|_| TabletopError::Poisoned(table))?
            .get(&table)
            .cloned()
            .ok_or_else(|| ReferenceError::UnknownTable(table).into())
    }
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("config", &self.config)
            .field("setups", &self.setups)
            .field("next_table", &self.next_table.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NewCard, NewGame};
    use crate::core::state::Actor;
    use crate::error::ValidationError;
    use crate::stacks::{Destination, NewStack, Selection, StackPosition};

    fn store() -> (TableStore, GameId) {
        let mut catalog = Catalog::new();
        let game = catalog.register_game(NewGame::new("Test", 2, 4)).unwrap();
        for i in 0..3 {
            catalog
                .register_card(game, NewCard::new(format!("Card {i}"), i))
                .unwrap();
        }
        (TableStore::new(catalog, TableConfig::default()), game)
    }

    fn seated(store: &TableStore, game: GameId) -> TableId {
        store
            .create_table(game, &[UserId(1), UserId(2)])
            .unwrap()
    }

    #[test]
    fn test_create_table_checks_players() {
        let (store, game) = store();

        let err = store.create_table(game, &[UserId(1)]).unwrap_err();
        assert_eq!(
            err,
            TabletopError::from(ValidationError::TooFewPlayers { min: 2, count: 1 })
        );

        let table = seated(&store, game);
        assert_eq!(store.snapshot(table).unwrap().roster().len(), 2);
        assert_eq!(store.snapshot(table).unwrap().version(), 1);
        assert!(store.create_table(GameId(99), &[]).is_err());
    }

    #[test]
    fn test_short_tables_allowed_by_config() {
        let mut catalog = Catalog::new();
        let game = catalog.register_game(NewGame::new("Test", 2, 4)).unwrap();
        let store = TableStore::new(catalog, TableConfig::new().allow_short_tables());

        assert!(store.create_table(game, &[]).is_ok());
    }

    #[test]
    fn test_execute_commits() {
        let (store, game) = store();
        let table = seated(&store, game);

        let deck = store
            .execute(table, |state, _| state.create_stack(NewStack::new("Deck", 0, 0)))
            .unwrap();
        store
            .execute(table, |state, catalog| {
                let card = catalog.cards_of(state.game()).next().map(|c| c.id).unwrap();
                state.place_card(catalog, Actor::Setup, card, deck, StackPosition::Top)
            })
            .unwrap();

        assert_eq!(store.stack_contents(table, deck).unwrap().len(), 1);
        assert_eq!(store.actions(table).unwrap().len(), 1);
        assert_eq!(store.snapshot(table).unwrap().version(), 3);
    }

    #[test]
    fn test_failed_operation_leaves_state() {
        let (store, game) = store();
        let table = seated(&store, game);
        let deck = store
            .execute(table, |state, _| state.create_stack(NewStack::new("Deck", 0, 0)))
            .unwrap();
        let before = store.snapshot(table).unwrap();

        let err = store
            .execute(table, |state, _| {
                state.create_stack(NewStack::new("Other", 1, 0))?;
                state.move_cards(Actor::Setup, deck, Selection::Top(1), Destination::OffTable)
            })
            .unwrap_err();

        assert!(matches!(err, TabletopError::Validation(_)));
        assert_eq!(store.snapshot(table).unwrap(), before);
    }

    #[test]
    fn test_stale_commit_conflicts() {
        let (store, game) = store();
        let table = seated(&store, game);

        let mut first = store.begin(table).unwrap();
        let mut second = store.begin(table).unwrap();
        first
            .state_mut()
            .create_stack(NewStack::new("A", 0, 0))
            .unwrap();
        second
            .state_mut()
            .create_stack(NewStack::new("B", 1, 0))
            .unwrap();

        store.commit(first).unwrap();
        let err = store.commit(second).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.snapshot(table).unwrap().stacks().stack_count(), 1);
    }

    #[test]
    fn test_join_and_leave() {
        let (store, game) = store();
        let table = seated(&store, game);

        assert_eq!(store.join(table, UserId(3)).unwrap(), 2);
        assert!(store.join(table, UserId(3)).is_err());
        store.leave(table, UserId(3)).unwrap();
        assert!(store.leave(table, UserId(3)).is_err());
    }

    #[test]
    fn test_end_table() {
        let (store, game) = store();
        let table = seated(&store, game);

        let state = store.end_table(table).unwrap();
        assert_eq!(state.id(), table);
        assert!(store.snapshot(table).is_err());
        assert!(store.end_table(table).is_err());
        assert!(store.table_ids().unwrap().is_empty());
    }

    #[test]
    fn test_export_import() {
        let (store, game) = store();
        let table = seated(&store, game);
        store
            .execute(table, |state, _| state.create_stack(NewStack::new("Deck", 0, 0)))
            .unwrap();

        let bytes = store.export(table).unwrap();
        let before = store.end_table(table).unwrap();

        let imported = store.import(&bytes).unwrap();
        assert_eq!(imported, table);
        assert_eq!(store.snapshot(table).unwrap(), before);
        assert!(store.import(&bytes).is_err());
        assert!(matches!(
            store.import(&[1, 2, 3]).unwrap_err(),
            TabletopError::Snapshot(_)
        ));
    }

    #[test]
    fn test_import_checks_catalog() {
        let (store, game) = store();
        let table = seated(&store, game);
        store
            .execute(table, |state, catalog| {
                let deck = state.create_stack(NewStack::new("Deck", 0, 0))?;
                let card = catalog.card_by_number(game, 2).unwrap();
                state.place_card(catalog, Actor::Setup, card, deck, StackPosition::Top)
            })
            .unwrap();
        let bytes = store.export(table).unwrap();

        let mut catalog = Catalog::new();
        let small = catalog.register_game(NewGame::new("Test", 2, 4)).unwrap();
        catalog.register_card(small, NewCard::new("Card 0", 0)).unwrap();
        let other = TableStore::new(catalog, TableConfig::default());
        assert!(matches!(
            other.import(&bytes).unwrap_err(),
            TabletopError::Reference(ReferenceError::UnknownCard(_))
        ));
        assert!(other.table_ids().unwrap().is_empty());

        let mut catalog = Catalog::new();
        catalog.register_game(NewGame::new("Test", 1, 1)).unwrap();
        let solo = TableStore::new(catalog, TableConfig::default());
        let bare = store.export(seated(&store, game)).unwrap();
        assert_eq!(
            solo.import(&bare).unwrap_err(),
            TabletopError::from(ValidationError::TooManyPlayers { max: 1, count: 2 })
        );
        assert!(solo.import(&[]).is_err());
    }

    #[test]
    fn test_store_keeps_catalog_number_rule() {
        let config = TableConfig::new().allow_duplicate_card_numbers();
        let mut catalog = Catalog::with_config(&config);
        let game = catalog.register_game(NewGame::new("Test", 2, 4)).unwrap();
        catalog.register_card(game, NewCard::new("A", 1)).unwrap();
        catalog.register_card(game, NewCard::new("B", 1)).unwrap();

        let store = TableStore::new(catalog, TableConfig::default());
        assert!(store.config().unique_card_numbers);
        assert!(!store.catalog().unique_card_numbers());
        assert_eq!(store.catalog().cards_of(game).count(), 2);
    }
}
