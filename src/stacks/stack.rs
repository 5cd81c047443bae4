//! Stacks: named, positioned piles of cards on a table.

use serde::{Deserialize, Serialize};

use super::meta::{CardMeta, Facing, Orientation, TokenSet};
use crate::catalog::definition::check_len;
use crate::core::entity::{StackId, TableId};
use crate::core::player::UserId;
use crate::error::{Result, ValidationError};

/// Maximum length of a stack name.
pub const STACK_NAME_MAX: usize = 100;

/// A pile of cards at a grid position on a table.
///
/// `player == None` marks a communal stack (center area). A hand
/// (`is_hand`) always has an owner: its cards show face up to that player
/// and face down to everyone else.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub id: StackId,
    pub table: TableId,
    pub name: String,
    pub player: Option<UserId>,
    pub is_hand: bool,
    pub column: i32,
    pub row: i32,
    pub orientation: Orientation,
    pub facing: Facing,
    pub tokens: TokenSet,
}

impl Stack {
    /// True if no player owns this stack.
    #[must_use]
    pub fn is_communal(&self) -> bool {
        self.player.is_none()
    }

    /// True if `user` owns this stack.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.player == Some(user)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_len("stack name", &self.name, STACK_NAME_MAX)?;
        if self.is_hand && self.player.is_none() {
            return Err(ValidationError::HandWithoutOwner.into());
        }
        Ok(())
    }
}

impl CardMeta for Stack {
    fn table(&self) -> TableId {
        self.table
    }

    fn orientation(&self) -> Option<Orientation> {
        Some(self.orientation)
    }

    fn facing(&self) -> Option<Facing> {
        Some(self.facing)
    }

    fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    fn tokens_mut(&mut self) -> &mut TokenSet {
        &mut self.tokens
    }
}

/// Description of a stack to create.
///
/// ```
/// use tabletop_stacks::stacks::{NewStack, Facing};
/// use tabletop_stacks::core::UserId;
///
/// let deck = NewStack::new("Deck", 0, 0).face_down();
/// assert_eq!(deck.facing, Facing::Down);
///
/// let hand = NewStack::new("Hand", 0, 3).hand_of(UserId::new(1));
/// assert!(hand.is_hand);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewStack {
    pub name: String,
    pub column: i32,
    pub row: i32,
    pub player: Option<UserId>,
    pub is_hand: bool,
    pub orientation: Orientation,
    pub facing: Facing,
}

impl NewStack {
    /// Describe a communal, face-up, vertical stack.
    pub fn new(name: impl Into<String>, column: i32, row: i32) -> Self {
        Self {
            name: name.into(),
            column,
            row,
            player: None,
            is_hand: false,
            orientation: Orientation::default(),
            facing: Facing::default(),
        }
    }

    /// Give the stack an owner (a player area that is not a hand).
    #[must_use]
    pub fn owned_by(mut self, player: UserId) -> Self {
        self.player = Some(player);
        self
    }

    /// Make the stack `player`'s hand.
    #[must_use]
    pub fn hand_of(mut self, player: UserId) -> Self {
        self.player = Some(player);
        self.is_hand = true;
        self
    }

    /// Lay cards face down by default.
    #[must_use]
    pub fn face_down(mut self) -> Self {
        self.facing = Facing::Down;
        self
    }

    /// Lay cards horizontally by default.
    #[must_use]
    pub fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        self
    }

    /// Build the stack with its assigned id.
    pub fn into_stack(self, id: StackId, table: TableId) -> Result<Stack> {
        let stack = Stack {
            id,
            table,
            name: self.name,
            player: self.player,
            is_hand: self.is_hand,
            column: self.column,
            row: self.row,
            orientation: self.orientation,
            facing: self.facing,
            tokens: TokenSet::new(),
        };
        stack.validate()?;
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TabletopError;

    #[test]
    fn test_new_stack_defaults() {
        let stack = NewStack::new("Center", 2, 1)
            .into_stack(StackId(0), TableId(0))
            .unwrap();

        assert!(stack.is_communal());
        assert!(!stack.is_hand);
        assert_eq!(stack.facing, Facing::Up);
        assert_eq!(stack.orientation, Orientation::Vertical);
        assert_eq!((stack.column, stack.row), (2, 1));
    }

    #[test]
    fn test_hand_requires_owner() {
        let mut draft = NewStack::new("Hand", 0, 0);
        draft.is_hand = true;

        let err = draft.into_stack(StackId(0), TableId(0)).unwrap_err();
        assert_eq!(err, TabletopError::from(ValidationError::HandWithoutOwner));
    }

    #[test]
    fn test_hand_of() {
        let stack = NewStack::new("Hand", 0, 0)
            .hand_of(UserId(4))
            .into_stack(StackId(1), TableId(0))
            .unwrap();

        assert!(stack.is_hand);
        assert!(stack.is_owned_by(UserId(4)));
        assert!(!stack.is_owned_by(UserId(5)));
    }

    #[test]
    fn test_blank_name_allowed_but_not_long_name() {
        assert!(NewStack::new("", 0, 0).into_stack(StackId(0), TableId(0)).is_ok());

        let long = "s".repeat(STACK_NAME_MAX + 1);
        assert!(NewStack::new(long, 0, 0)
            .into_stack(StackId(0), TableId(0))
            .is_err());
    }

    #[test]
    fn test_card_meta_always_set() {
        let stack = NewStack::new("Deck", 0, 0)
            .face_down()
            .horizontal()
            .into_stack(StackId(0), TableId(3))
            .unwrap();

        assert_eq!(CardMeta::table(&stack), TableId(3));
        assert_eq!(CardMeta::facing(&stack), Some(Facing::Down));
        assert_eq!(CardMeta::orientation(&stack), Some(Orientation::Horizontal));
    }
}
