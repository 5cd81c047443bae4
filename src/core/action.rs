//! Table actions: the append-only audit log.
//!
//! Every operation that affects a card on the table appends one
//! `TableAction` per affected `StackCard`, in the same transaction as the
//! change itself. The log has no removal or mutation API.
//!
//! ```
//! use tabletop_stacks::core::{ActionKind, ActionLog, CardId, StackCardId, StackId, TableId, UserId};
//!
//! let mut log = ActionLog::new(TableId::new(1));
//! let id = log.record(
//!     ActionKind::MoveCard,
//!     Some(UserId::new(7)),
//!     StackCardId::new(3),
//!     CardId::new(12),
//!     Some(StackId::new(0)),
//!     Some(StackId::new(1)),
//! );
//! assert_eq!(log.get(id).unwrap().kind.as_str(), "move_card");
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};

use super::entity::{ActionId, CardId, StackCardId, StackId, TableId};
use super::player::UserId;

/// What happened to a card.
///
/// Serialized as a snake_case tag, so logs written today stay readable
/// after new kinds are added.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ActionKind {
    /// Card entered play, changed stack or position, or left play.
    MoveCard,
    /// Card was part of a shuffled stack.
    Shuffle,
    /// Card's effective facing changed.
    Flip,
    /// Card's effective orientation changed.
    Rotate,
}

impl ActionKind {
    /// Stable name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::MoveCard => "move_card",
            ActionKind::Shuffle => "shuffle",
            ActionKind::Flip => "flip",
            ActionKind::Rotate => "rotate",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
///
/// `old_stack == None` means the card had no prior stack (it entered
/// play); `new_stack == None` means it left play. `player == None` marks
/// actions taken by setup automation rather than a seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAction {
    pub id: ActionId,
    pub table: TableId,
    pub player: Option<UserId>,
    pub stack_card: StackCardId,
    /// Catalog card of the stack card, kept so the record stays readable
    /// after the stack card leaves play.
    pub card: CardId,
    pub old_stack: Option<StackId>,
    pub new_stack: Option<StackId>,
    pub kind: ActionKind,
}

impl TableAction {
    /// True if the card entered play with this action.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.old_stack.is_none()
    }

    /// True if the card left play with this action.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.new_stack.is_none()
    }
}

/// Append-only list of a table's actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    table: TableId,
    entries: Vector<TableAction>,
    next_id: ActionId,
}

impl ActionLog {
    /// Create an empty log for a table.
    #[must_use]
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            entries: Vector::new(),
            next_id: ActionId::new(0),
        }
    }

    /// Append an action and return its id.
    pub fn record(
        &mut self,
        kind: ActionKind,
        player: Option<UserId>,
        stack_card: StackCardId,
        card: CardId,
        old_stack: Option<StackId>,
        new_stack: Option<StackId>,
    ) -> ActionId {
        let id = self.next_id;
        self.next_id = id.next();
        self.entries.push_back(TableAction {
            id,
            table: self.table,
            player,
            stack_card,
            card,
            old_stack,
            new_stack,
            kind,
        });
        id
    }

    /// Get an action by id.
    #[must_use]
    pub fn get(&self, id: ActionId) -> Option<&TableAction> {
        self.entries.get(id.raw() as usize)
    }

    /// Number of recorded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over actions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TableAction> {
        self.entries.iter()
    }

    /// Actions recorded at or after `since`.
    pub fn since(&self, since: ActionId) -> impl Iterator<Item = &TableAction> {
        self.entries.iter().skip(since.raw() as usize)
    }

    /// Actions that touched a given stack card.
    pub fn for_stack_card(&self, stack_card: StackCardId) -> impl Iterator<Item = &TableAction> {
        self.entries.iter().filter(move |a| a.stack_card == stack_card)
    }
}
