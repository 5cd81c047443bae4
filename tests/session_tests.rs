//! Table lifecycle: creation, seating, setup hooks, views and snapshots.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tabletop_stacks::{
    Actor, Catalog, Face, GameId, NewCard, NewGame, NewStack, NewToken, Result, SetupRegistry,
    SingleDeckSetup, StackPosition, TableConfig, TableSetup, TableState, TableStore,
    TabletopError, UserId, ValidationError,
};

fn poker_catalog(cards: i32) -> (Catalog, GameId) {
    let mut catalog = Catalog::new();
    let game = catalog
        .register_game(NewGame::new("Poker", 2, 4).with_card_back("Blue", None))
        .unwrap();
    for n in 1..=cards {
        catalog
            .register_card(game, NewCard::new(format!("Card {n}"), n))
            .unwrap();
    }
    catalog.register_token(game, NewToken::new("Chip")).unwrap();
    (catalog, game)
}

fn users(n: u64) -> Vec<UserId> {
    (1..=n).map(UserId).collect()
}

/// Counts calls and places one card.
struct Counting(Arc<AtomicUsize>);

impl TableSetup for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn setup(&self, catalog: &Catalog, state: &mut TableState) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        let deck = state.create_stack(NewStack::new("Deck", 0, 0))?;
        let card = catalog.cards_of(state.game()).next().map(|c| c.id);
        if let Some(card) = card {
            state.place_card(catalog, Actor::Setup, card, deck, StackPosition::Top)?;
        }
        Ok(())
    }
}

/// Always fails.
struct Broken;

impl TableSetup for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn setup(&self, _catalog: &Catalog, state: &mut TableState) -> Result<()> {
        state.create_stack(NewStack::new("x".repeat(500), 0, 0))?;
        Ok(())
    }
}

#[test]
fn test_fifth_player_rejected() {
    let (catalog, game) = poker_catalog(4);
    let store = TableStore::new(catalog, TableConfig::default());
    let table = store.create_table(game, &users(4)).unwrap();

    let err = store.join(table, UserId(5)).unwrap_err();
    assert_eq!(
        err,
        TabletopError::from(ValidationError::TooManyPlayers { max: 4, count: 5 })
    );
    assert_eq!(store.snapshot(table).unwrap().roster().len(), 4);

    assert!(store.create_table(game, &users(5)).is_err());
}

#[test]
fn test_duplicate_seat_rejected() {
    let (catalog, game) = poker_catalog(4);
    let store = TableStore::new(catalog, TableConfig::default());

    let err = store
        .create_table(game, &[UserId(1), UserId(1)])
        .unwrap_err();
    assert_eq!(err, TabletopError::from(ValidationError::AlreadySeated(UserId(1))));
    assert!(store.table_ids().unwrap().is_empty());
}

#[test]
fn test_setup_runs_once_per_table() {
    let (catalog, game) = poker_catalog(4);
    let calls = Arc::new(AtomicUsize::new(0));
    let setups = SetupRegistry::new().with(game, Counting(Arc::clone(&calls)));
    let store = TableStore::new(catalog, TableConfig::default()).with_setups(setups);

    let first = store.create_table(game, &users(2)).unwrap();
    let second = store.create_table(game, &users(3)).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_ne!(first, second);
    for table in [first, second] {
        let state = store.snapshot(table).unwrap();
        assert_eq!(state.version(), 1);
        assert_eq!(state.log().len(), 1);
        assert_eq!(state.actions().next().unwrap().player, None);
    }
}

#[test]
fn test_failed_setup_creates_nothing() {
    let (catalog, game) = poker_catalog(4);
    let setups = SetupRegistry::new().with(game, Broken);
    let store = TableStore::new(catalog, TableConfig::default()).with_setups(setups);

    assert!(store.create_table(game, &users(2)).is_err());
    assert!(store.table_ids().unwrap().is_empty());
}

#[test]
fn test_single_deck_poker_table() {
    let (catalog, game) = poker_catalog(52);
    let setups = SetupRegistry::new().with(game, SingleDeckSetup::new().with_hand_size(2));
    let store = TableStore::new(catalog, TableConfig::default()).with_setups(setups);
    let table = store.create_table(game, &users(3)).unwrap();

    let alice = UserId(1);
    let views = store.view_table(table, Some(alice)).unwrap();
    let deck = views.iter().find(|v| v.name == "Deck").unwrap();
    assert_eq!(deck.len(), 46);
    assert!(deck.cards.iter().all(|c| !c.face.is_front()));
    assert_eq!(
        deck.top().unwrap().face,
        Face::Back {
            text: "Blue".into(),
            image: None
        }
    );

    let hands: Vec<_> = views.iter().filter(|v| v.is_hand).collect();
    assert_eq!(hands.len(), 3);
    for hand in hands {
        assert_eq!(hand.len(), 2);
        let own = hand.owner == Some(alice);
        assert!(hand.cards.iter().all(|c| c.face.is_front() == own));
    }

    let chips = views.iter().filter(|v| v.name == "Chips").count();
    assert_eq!(chips, 3);
}

#[test]
fn test_export_import_roundtrip() {
    let (catalog, game) = poker_catalog(10);
    let setups = SetupRegistry::new().with(game, SingleDeckSetup::new());
    let store = TableStore::new(catalog.clone(), TableConfig::default()).with_setups(setups);
    let table = store.create_table(game, &users(2)).unwrap();
    let bytes = store.export(table).unwrap();

    let other = TableStore::new(catalog, TableConfig::default());
    let imported = other.import(&bytes).unwrap();

    assert_eq!(other.snapshot(imported).unwrap(), store.snapshot(table).unwrap());
    let next = other.create_table(game, &users(2)).unwrap();
    assert_ne!(next, imported);
}

#[test]
fn test_import_requires_known_game() {
    let (catalog, game) = poker_catalog(3);
    let store = TableStore::new(catalog, TableConfig::default());
    let table = store.create_table(game, &users(2)).unwrap();
    let bytes = store.export(table).unwrap();

    let empty = TableStore::new(Catalog::new(), TableConfig::default());
    assert!(matches!(
        empty.import(&bytes).unwrap_err(),
        TabletopError::Reference(_)
    ));
}

#[test]
fn test_config_from_json() {
    let config: TableConfig = serde_json::from_str(r#"{"max_retries": 3, "seed": 9}"#).unwrap();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.seed, 9);
    assert!(config.enforce_player_bounds);
}
