//! Stack cards: one catalog card placed in a stack.

use serde::{Deserialize, Serialize};

use super::meta::{CardMeta, Facing, Orientation, TokenSet};
use super::stack::Stack;
use crate::core::entity::{CardId, StackCardId, StackId, TableId};

/// A card in a stack.
///
/// `order` is the card's position in its stack: 0 is the bottom, the
/// highest value is the top. Orders are dense and unique per stack, and
/// only the `StackManager` changes them.
///
/// `orientation` and `facing` are overrides; `None` follows the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackCard {
    pub id: StackCardId,
    pub table: TableId,
    pub stack: StackId,
    pub card: CardId,
    pub order: u32,
    pub orientation: Option<Orientation>,
    pub facing: Option<Facing>,
    pub tokens: TokenSet,
}

impl StackCard {
    /// Create a stack card with no overrides. The manager assigns `stack`
    /// and `order` when it is inserted.
    #[must_use]
    pub fn new(id: StackCardId, table: TableId, card: CardId) -> Self {
        Self {
            id,
            table,
            stack: StackId::default(),
            card,
            order: 0,
            orientation: None,
            facing: None,
            tokens: TokenSet::new(),
        }
    }

    /// Facing after applying the override to the stack's facing.
    #[must_use]
    pub fn effective_facing(&self, stack: &Stack) -> Facing {
        self.facing.unwrap_or(stack.facing)
    }

    /// Orientation after applying the override to the stack's orientation.
    #[must_use]
    pub fn effective_orientation(&self, stack: &Stack) -> Orientation {
        self.orientation.unwrap_or(stack.orientation)
    }

    /// True if either override is set.
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.orientation.is_some() || self.facing.is_some()
    }
}

impl CardMeta for StackCard {
    fn table(&self) -> TableId {
        self.table
    }

    fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    fn facing(&self) -> Option<Facing> {
        self.facing
    }

    fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    fn tokens_mut(&mut self) -> &mut TokenSet {
        &mut self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stacks::NewStack;

    fn stack(facing: Facing) -> Stack {
        let mut draft = NewStack::new("Deck", 0, 0);
        draft.facing = facing;
        draft.into_stack(StackId(0), TableId(0)).unwrap()
    }

    #[test]
    fn test_follows_stack_without_override() {
        let card = StackCard::new(StackCardId(1), TableId(0), CardId(5));
        assert!(!card.has_overrides());

        assert_eq!(card.effective_facing(&stack(Facing::Up)), Facing::Up);
        assert_eq!(card.effective_facing(&stack(Facing::Down)), Facing::Down);
        assert_eq!(
            card.effective_orientation(&stack(Facing::Up)),
            Orientation::Vertical
        );
    }

    #[test]
    fn test_override_wins() {
        let mut card = StackCard::new(StackCardId(1), TableId(0), CardId(5));
        card.facing = Some(Facing::Up);
        card.orientation = Some(Orientation::Horizontal);

        assert!(card.has_overrides());
        assert_eq!(card.effective_facing(&stack(Facing::Down)), Facing::Up);
        assert_eq!(
            card.effective_orientation(&stack(Facing::Down)),
            Orientation::Horizontal
        );
    }

    #[test]
    fn test_card_meta_may_be_unset() {
        let card = StackCard::new(StackCardId(1), TableId(2), CardId(5));
        assert_eq!(CardMeta::table(&card), TableId(2));
        assert_eq!(CardMeta::facing(&card), None);
        assert_eq!(CardMeta::orientation(&card), None);
    }
}
