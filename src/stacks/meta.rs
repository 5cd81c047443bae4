//! Physical card state shared by stacks and stack cards.
//!
//! Both a whole `Stack` and a single `StackCard` have an orientation, a
//! facing, an owning table and a set of attached tokens. The `CardMeta`
//! trait exposes these uniformly. A stack always has a value; a stack card
//! may leave orientation and facing unset to follow its stack.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::entity::{StackCardId, StackId, TableId, TokenId};

/// How a card lies on the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    /// The other orientation.
    #[must_use]
    pub const fn rotated(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Which side of a card is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Up,
    Down,
}

impl Facing {
    /// The other side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Facing::Up => Facing::Down,
            Facing::Down => Facing::Up,
        }
    }

    /// True for `Up`.
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Facing::Up)
    }
}

/// Tokens placed on a stack or card. Each token appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSet(SmallVec<[TokenId; 4]>);

impl TokenSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a token. Returns `false` if it was already present.
    pub fn insert(&mut self, token: TokenId) -> bool {
        if self.contains(token) {
            return false;
        }
        self.0.push(token);
        true
    }

    /// Remove a token. Returns `false` if it was not present.
    pub fn remove(&mut self, token: TokenId) -> bool {
        match self.0.iter().position(|&t| t == token) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Check whether a token is present.
    #[must_use]
    pub fn contains(&self, token: TokenId) -> bool {
        self.0.contains(&token)
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no tokens are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over tokens in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.0.iter().copied()
    }
}

/// What a token is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenTarget {
    Stack(StackId),
    Card(StackCardId),
}

/// Physical attributes common to stacks and stack cards.
pub trait CardMeta {
    /// Table the item lies on.
    fn table(&self) -> TableId;

    /// Own orientation. `None` means "same as the containing stack".
    fn orientation(&self) -> Option<Orientation>;

    /// Own facing. `None` means "same as the containing stack".
    fn facing(&self) -> Option<Facing>;

    /// Attached tokens.
    fn tokens(&self) -> &TokenSet;

    /// Attached tokens, mutably.
    fn tokens_mut(&mut self) -> &mut TokenSet;
}
