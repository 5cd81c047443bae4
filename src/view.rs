//! What a viewer sees of a table.
//!
//! Visibility is decided at read time and never stored:
//!
//! - In a hand, cards show their front to the owner and their back to
//!   everyone else, whatever their facing.
//! - Elsewhere, a card's effective facing decides.
//!
//! A card showing its back hides its identity. Only the resolved back
//! (card back or game default) is exposed.

use serde::{Deserialize, Serialize};

use crate::catalog::{AssetRef, Catalog};
use crate::core::entity::{CardId, StackCardId, StackId, TokenId};
use crate::core::player::UserId;
use crate::core::state::TableState;
use crate::error::Result;
use crate::stacks::{Facing, Orientation, Stack, StackCard};

/// The visible side of a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Front {
        card: CardId,
        name: String,
        text: String,
        image: Option<AssetRef>,
    },
    Back {
        text: String,
        image: Option<AssetRef>,
    },
}

impl Face {
    /// True if the front is showing.
    #[must_use]
    pub fn is_front(&self) -> bool {
        matches!(self, Face::Front { .. })
    }

    /// The card, if its front is showing.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        match self {
            Face::Front { card, .. } => Some(*card),
            Face::Back { .. } => None,
        }
    }
}

/// One card as seen by a viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub id: StackCardId,
    pub order: u32,
    pub orientation: Orientation,
    pub face: Face,
    pub tokens: Vec<TokenId>,
}

/// One stack as seen by a viewer. Cards are bottom first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackView {
    pub id: StackId,
    pub name: String,
    pub column: i32,
    pub row: i32,
    pub owner: Option<UserId>,
    pub is_hand: bool,
    pub orientation: Orientation,
    pub facing: Facing,
    pub tokens: Vec<TokenId>,
    pub cards: Vec<CardView>,
}

impl StackView {
    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True if the stack holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Top card, if any.
    #[must_use]
    pub fn top(&self) -> Option<&CardView> {
        self.cards.last()
    }
}

/// Whether `viewer` sees the front of `card` lying in `stack`.
///
/// `None` is a spectator.
#[must_use]
pub fn shows_front(stack: &Stack, card: &StackCard, viewer: Option<UserId>) -> bool {
    if stack.is_hand {
        return viewer.is_some() && stack.player == viewer;
    }
    card.effective_facing(stack).is_up()
}

/// Project one stack for a viewer.
pub fn view_stack(
    state: &TableState,
    catalog: &Catalog,
    stack: StackId,
    viewer: Option<UserId>,
) -> Result<StackView> {
    let stack = state.stack(stack)?;
    let cards = state
        .stack_cards(stack.id)?
        .into_iter()
        .map(|card| view_card(catalog, stack, card, viewer))
        .collect::<Result<Vec<_>>>()?;

    Ok(StackView {
        id: stack.id,
        name: stack.name.clone(),
        column: stack.column,
        row: stack.row,
        owner: stack.player,
        is_hand: stack.is_hand,
        orientation: stack.orientation,
        facing: stack.facing,
        tokens: stack.tokens.iter().collect(),
        cards,
    })
}

/// Project every stack of a table for a viewer, by stack id.
pub fn view_table(
    state: &TableState,
    catalog: &Catalog,
    viewer: Option<UserId>,
) -> Result<Vec<StackView>> {
    state
        .stacks()
        .stacks()
        .map(|stack| view_stack(state, catalog, stack.id, viewer))
        .collect()
}

fn view_card(
    catalog: &Catalog,
    stack: &Stack,
    card: &StackCard,
    viewer: Option<UserId>,
) -> Result<CardView> {
    let face = if shows_front(stack, card, viewer) {
        let def = catalog.card(card.card)?;
        Face::Front {
            card: def.id,
            name: def.name.clone(),
            text: def.front_text.clone(),
            image: def.front_image.clone(),
        }
    } else {
        let back = catalog.card_back(card.card)?;
        Face::Back {
            text: back.text.to_string(),
            image: back.image.cloned(),
        }
    };

    Ok(CardView {
        id: card.id,
        order: card.order,
        orientation: card.effective_orientation(stack),
        face,
        tokens: card.tokens.iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NewCard, NewGame};
    use crate::core::entity::TableId;
    use crate::core::player::PlayerBounds;
    use crate::core::state::Actor;
    use crate::session::Table;
    use crate::stacks::{NewStack, StackPosition};

    const OWNER: UserId = UserId(1);
    const OTHER: UserId = UserId(2);

    fn setup() -> (Catalog, TableState, StackId, StackId) {
        let mut catalog = Catalog::new();
        let game = catalog
            .register_game(NewGame::new("Test", 2, 4).with_card_back("Default back", None))
            .unwrap();
        let ace = catalog
            .register_card(game, NewCard::new("Ace", 1).with_front("A", None))
            .unwrap();
        let king = catalog
            .register_card(game, NewCard::new("King", 13).with_back("Red back", None))
            .unwrap();

        let mut state = TableState::new(
            Table::new(TableId(0), game),
            PlayerBounds::new(2, 4).unwrap(),
            1,
        );
        state.join(OWNER).unwrap();
        state.join(OTHER).unwrap();

        let deck = state
            .create_stack(NewStack::new("Deck", 0, 0).face_down())
            .unwrap();
        let hand = state
            .create_stack(NewStack::new("Hand", 0, 1).hand_of(OWNER).face_down())
            .unwrap();
        state
            .place_card(&catalog, Actor::Setup, ace, deck, StackPosition::Top)
            .unwrap();
        state
            .place_card(&catalog, Actor::Setup, king, hand, StackPosition::Top)
            .unwrap();
        (catalog, state, deck, hand)
    }

    #[test]
    fn test_face_down_hides_identity() {
        let (catalog, state, deck, _) = setup();
        let view = view_stack(&state, &catalog, deck, Some(OWNER)).unwrap();

        let top = view.top().unwrap();
        assert_eq!(top.face.card(), None);
        assert_eq!(
            top.face,
            Face::Back {
                text: "Default back".into(),
                image: None
            }
        );
    }

    #[test]
    fn test_hand_shows_front_to_owner_only() {
        let (catalog, state, _, hand) = setup();

        let own = view_stack(&state, &catalog, hand, Some(OWNER)).unwrap();
        assert!(own.cards[0].face.is_front());

        let other = view_stack(&state, &catalog, hand, Some(OTHER)).unwrap();
        assert_eq!(
            other.cards[0].face,
            Face::Back {
                text: "Red back".into(),
                image: None
            }
        );

        let spectator = view_stack(&state, &catalog, hand, None).unwrap();
        assert!(!spectator.cards[0].face.is_front());
    }

    #[test]
    fn test_flip_reveals() {
        let (catalog, mut state, deck, _) = setup();
        let top = state.stacks().top_card(deck).unwrap();
        state.flip_cards(Actor::Setup, &[top]).unwrap();

        let view = view_stack(&state, &catalog, deck, Some(OTHER)).unwrap();
        match &view.cards[0].face {
            Face::Front { name, text, .. } => {
                assert_eq!(name, "Ace");
                assert_eq!(text, "A");
            }
            face => panic!("expected front, got {face:?}"),
        }
    }

    #[test]
    fn test_view_table_covers_all_stacks() {
        let (catalog, state, deck, hand) = setup();
        let views = view_table(&state, &catalog, None).unwrap();

        assert_eq!(views.iter().map(|v| v.id).collect::<Vec<_>>(), vec![deck, hand]);
        assert!(views.iter().all(|v| v.len() == 1));
    }
}
