//! `SingleDeckSetup` implementation.

use crate::catalog::Catalog;
use crate::core::entity::StackId;
use crate::core::state::{Actor, TableState};
use crate::error::Result;
use crate::session::TableSetup;
use crate::stacks::{Destination, NewStack, Selection, StackPosition, TokenTarget};

/// One shuffled deck, chips for everyone, optional starting hands.
///
/// Layout: the deck at column 0 row 0; player `i` (in seating order) gets
/// a chip stack at column `i + 1` row 0 and, when dealing, a hand at
/// column `i + 1` row 1.
///
/// ```
/// use tabletop_stacks::catalog::{Catalog, NewCard, NewGame};
/// use tabletop_stacks::core::{TableConfig, UserId};
/// use tabletop_stacks::games::single_deck::SingleDeckSetup;
/// use tabletop_stacks::session::{SetupRegistry, TableStore};
///
/// let mut catalog = Catalog::new();
/// let game = catalog.register_game(NewGame::new("Poker", 2, 8)).unwrap();
/// for n in 1..=52 {
///     catalog.register_card(game, NewCard::new(format!("Card {n}"), n)).unwrap();
/// }
///
/// let setups = SetupRegistry::new().with(game, SingleDeckSetup::new().with_hand_size(5));
/// let store = TableStore::new(catalog, TableConfig::default()).with_setups(setups);
/// let table = store.create_table(game, &[UserId::new(1), UserId::new(2)]).unwrap();
///
/// let deck = store.snapshot(table).unwrap().stacks().stacks().next().unwrap().id;
/// assert_eq!(store.stack_contents(table, deck).unwrap().len(), 42);
/// ```
#[derive(Clone, Debug)]
pub struct SingleDeckSetup {
    deck_name: String,
    chips_name: String,
    hand_name: String,
    hand_size: usize,
}

impl Default for SingleDeckSetup {
    fn default() -> Self {
        Self {
            deck_name: "Deck".into(),
            chips_name: "Chips".into(),
            hand_name: "Hand".into(),
            hand_size: 0,
        }
    }
}

impl SingleDeckSetup {
    /// Deck and chips only, no dealing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deal `size` cards to every seated player.
    #[must_use]
    pub fn with_hand_size(mut self, size: usize) -> Self {
        self.hand_size = size;
        self
    }

    /// Name of the deck stack.
    #[must_use]
    pub fn with_deck_name(mut self, name: impl Into<String>) -> Self {
        self.deck_name = name.into();
        self
    }

    fn lay_out_deck(&self, catalog: &Catalog, state: &mut TableState) -> Result<StackId> {
        let game = state.game();
        let deck = state.create_stack(NewStack::new(self.deck_name.as_str(), 0, 0).face_down())?;
        for card in catalog.cards_of(game) {
            state.place_card(catalog, Actor::Setup, card.id, deck, StackPosition::Top)?;
        }
        if state.stack_len(deck)? > 1 {
            state.shuffle_stack(Actor::Setup, deck)?;
        }
        Ok(deck)
    }

    fn hand_out_chips(&self, catalog: &Catalog, state: &mut TableState) -> Result<()> {
        let game = state.game();
        let players: Vec<_> = state.roster().iter().collect();
        for (seat, user) in players.into_iter().enumerate() {
            let chips = state.create_stack(
                NewStack::new(self.chips_name.as_str(), seat as i32 + 1, 0).owned_by(user),
            )?;
            for token in catalog.tokens_of(game) {
                state.attach_token(catalog, TokenTarget::Stack(chips), token.id)?;
            }
        }
        Ok(())
    }

    fn deal(&self, state: &mut TableState, deck: StackId) -> Result<()> {
        let players: Vec<_> = state.roster().iter().collect();
        let mut hands = Vec::with_capacity(players.len());
        for (seat, user) in players.into_iter().enumerate() {
            hands.push(state.create_stack(
                NewStack::new(self.hand_name.as_str(), seat as i32 + 1, 1).hand_of(user),
            )?);
        }
        for _ in 0..self.hand_size {
            for &hand in &hands {
                state.move_cards(Actor::Setup, deck, Selection::Top(1), Destination::top_of(hand))?;
            }
        }
        Ok(())
    }
}

impl TableSetup for SingleDeckSetup {
    fn name(&self) -> &str {
        "single_deck"
    }

    /// Fails with `NotEnoughCards` if the deck cannot cover every hand.
    fn setup(&self, catalog: &Catalog, state: &mut TableState) -> Result<()> {
        let deck = self.lay_out_deck(catalog, state)?;
        self.hand_out_chips(catalog, state)?;
        if self.hand_size > 0 {
            self.deal(state, deck)?;
        }
        Ok(())
    }
}
