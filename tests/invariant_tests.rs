//! Property tests: random operation sequences never break stack ordering.

use proptest::prelude::*;

use tabletop_stacks::{
    ActionKind, Actor, CardId, Catalog, Destination, GameId, NewCard, NewGame, NewStack,
    PlayerBounds, Selection, StackId, StackPosition, Table, TableId, TableState,
};

const STACKS: u32 = 3;
const CARDS: i32 = 6;

#[derive(Clone, Debug)]
enum Op {
    Place { card: u32, stack: u32, position: StackPosition },
    Move { from: u32, to: u32, selection: Selection, position: StackPosition },
    Remove { from: u32, count: usize },
    Shuffle { stack: u32 },
    Flip { stack: u32 },
}

fn position() -> impl Strategy<Value = StackPosition> {
    prop_oneof![
        Just(StackPosition::Top),
        Just(StackPosition::Bottom),
        (0usize..8).prop_map(StackPosition::Index),
        Just(StackPosition::Random),
    ]
}

fn selection() -> impl Strategy<Value = Selection> {
    prop_oneof![
        (0usize..4).prop_map(Selection::Top),
        (0usize..4).prop_map(Selection::Bottom),
        (0usize..4).prop_map(Selection::Random),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..CARDS as u32, 0..STACKS, position())
            .prop_map(|(card, stack, position)| Op::Place { card, stack, position }),
        4 => (0..STACKS, 0..STACKS, selection(), position())
            .prop_map(|(from, to, selection, position)| Op::Move { from, to, selection, position }),
        1 => (0..STACKS, 1usize..3).prop_map(|(from, count)| Op::Remove { from, count }),
        1 => (0..STACKS).prop_map(|stack| Op::Shuffle { stack }),
        1 => (0..STACKS).prop_map(|stack| Op::Flip { stack }),
    ]
}

fn table(seed: u64) -> (Catalog, TableState) {
    let mut catalog = Catalog::new();
    let game: GameId = catalog.register_game(NewGame::new("Prop", 1, 4)).unwrap();
    for n in 0..CARDS {
        catalog.register_card(game, NewCard::new(format!("{n}"), n)).unwrap();
    }
    let mut state = TableState::new(
        Table::new(TableId::new(0), game),
        PlayerBounds::new(1, 4).unwrap(),
        seed,
    );
    for i in 0..STACKS {
        state
            .create_stack(NewStack::new(format!("S{i}"), i as i32, 0))
            .unwrap();
    }
    (catalog, state)
}

fn apply(catalog: &Catalog, state: &mut TableState, op: &Op) -> tabletop_stacks::Result<()> {
    match op.clone() {
        Op::Place { card, stack, position } => state
            .place_card(catalog, Actor::Setup, CardId::new(card), StackId::new(stack), position)
            .map(|_| ()),
        Op::Move { from, to, selection, position } => state
            .move_cards(
                Actor::Setup,
                StackId::new(from),
                selection,
                Destination::Stack { stack: StackId::new(to), position },
            )
            .map(|_| ()),
        Op::Remove { from, count } => state
            .move_cards(Actor::Setup, StackId::new(from), Selection::Top(count), Destination::OffTable)
            .map(|_| ()),
        Op::Shuffle { stack } => state.shuffle_stack(Actor::Setup, StackId::new(stack)),
        Op::Flip { stack } => state.flip_stack(Actor::Setup, StackId::new(stack)),
    }
}

proptest! {
    #[test]
    fn prop_orders_stay_dense(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..40)) {
        let (catalog, mut state) = table(seed);

        for op in &ops {
            // Run on a copy and keep it only on success, as the store does.
            let mut working = state.clone();
            if apply(&catalog, &mut working, op).is_ok() {
                state = working;
            }
            prop_assert!(state.check_integrity().is_ok());
        }

        let mut total = 0;
        for i in 0..STACKS {
            let orders: Vec<u32> = state
                .stack_cards(StackId::new(i))
                .unwrap()
                .iter()
                .map(|c| c.order)
                .collect();
            prop_assert_eq!(&orders, &(0..orders.len() as u32).collect::<Vec<_>>());
            total += orders.len();
        }
        prop_assert_eq!(total, state.stacks().total_cards());

        let entered = state.actions().filter(|a| a.is_entry()).count();
        let removed = state.actions().filter(|a| a.is_removal()).count();
        prop_assert_eq!(total, entered - removed);
    }

    #[test]
    fn prop_moves_log_one_action_per_card(
        seed in any::<u64>(),
        count in 1usize..=CARDS as usize,
        position in position(),
    ) {
        let (catalog, mut state) = table(seed);
        let (from, to) = (StackId::new(0), StackId::new(1));
        for n in 0..CARDS as u32 {
            state.place_card(&catalog, Actor::Setup, CardId::new(n), from, StackPosition::Top).unwrap();
        }
        let before = state.log().len();

        let moved = state
            .move_cards(Actor::Setup, from, Selection::Top(count), Destination::Stack { stack: to, position })
            .unwrap();

        prop_assert_eq!(moved.len(), count);
        prop_assert_eq!(state.log().len(), before + count);
        for action in state.actions().skip(before) {
            prop_assert_eq!(action.kind, ActionKind::MoveCard);
            prop_assert_eq!(action.old_stack, Some(from));
            prop_assert_eq!(action.new_stack, Some(to));
        }
        prop_assert_eq!(state.stack_len(from).unwrap(), CARDS as usize - count);
        prop_assert_eq!(state.stack_len(to).unwrap(), count);
    }
}
