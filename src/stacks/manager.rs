//! Stack manager: card placement and ordering.
//!
//! The `StackManager` owns every stack and stack card of one table and is
//! the only code that assigns `StackCard::order`. After every change it
//! renumbers the touched stacks so orders stay `0..n` with no gaps.
//!
//! Storage uses `im` persistent maps, so cloning a manager for a
//! transaction is O(1).

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::stack::Stack;
use super::stack_card::StackCard;
use crate::core::entity::{StackCardId, StackId};
use crate::core::rng::TableRng;
use crate::error::{ReferenceError, Result, TabletopError, ValidationError};

/// Where a card goes within a stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackPosition {
    /// On top (highest order).
    #[default]
    Top,
    /// At the bottom (order 0).
    Bottom,
    /// At a specific order; past-the-end values are clamped to the top.
    Index(usize),
    /// At a uniformly random position.
    Random,
}

impl StackPosition {
    /// Resolve to an insertion index for a stack holding `len` cards.
    pub fn index_for(self, len: usize, rng: &mut TableRng) -> usize {
        match self {
            StackPosition::Top => len,
            StackPosition::Bottom => 0,
            StackPosition::Index(i) => i.min(len),
            StackPosition::Random => rng.choose_index(len + 1).unwrap_or(len),
        }
    }
}

/// Which cards to take from a stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// The top `n` cards, topmost first.
    Top(usize),
    /// The bottom `n` cards, bottommost first.
    Bottom(usize),
    /// `n` distinct cards chosen at random.
    Random(usize),
    /// Exactly these cards, in this sequence.
    Specific(SmallVec<[StackCardId; 4]>),
}

impl Selection {
    /// Select specific cards.
    pub fn specific(ids: impl IntoIterator<Item = StackCardId>) -> Self {
        Selection::Specific(ids.into_iter().collect())
    }
}

/// Where selected cards end up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// Into a stack at a position.
    Stack {
        stack: StackId,
        position: StackPosition,
    },
    /// Out of play.
    OffTable,
}

impl Destination {
    /// On top of a stack.
    #[must_use]
    pub fn top_of(stack: StackId) -> Self {
        Destination::Stack {
            stack,
            position: StackPosition::Top,
        }
    }

    /// At the bottom of a stack.
    #[must_use]
    pub fn bottom_of(stack: StackId) -> Self {
        Destination::Stack {
            stack,
            position: StackPosition::Bottom,
        }
    }

    /// At a specific order in a stack.
    #[must_use]
    pub fn at(stack: StackId, index: usize) -> Self {
        Destination::Stack {
            stack,
            position: StackPosition::Index(index),
        }
    }

    /// At a random position in a stack.
    #[must_use]
    pub fn random_in(stack: StackId) -> Self {
        Destination::Stack {
            stack,
            position: StackPosition::Random,
        }
    }

    /// The destination stack, if any.
    #[must_use]
    pub fn stack(&self) -> Option<StackId> {
        match self {
            Destination::Stack { stack, .. } => Some(*stack),
            Destination::OffTable => None,
        }
    }
}

fn integrity(stack: StackId, detail: String) -> TabletopError {
    TabletopError::OrderingIntegrity { stack, detail }
}

/// Stacks and stack cards of one table.
///
/// ## Usage
///
/// ```
/// use tabletop_stacks::core::{CardId, StackCardId, StackId, TableId, TableRng};
/// use tabletop_stacks::stacks::{NewStack, StackCard, StackManager, StackPosition};
///
/// let table = TableId::new(0);
/// let mut rng = TableRng::new(1);
/// let mut manager = StackManager::new();
///
/// let deck = StackId::new(0);
/// manager.add_stack(NewStack::new("Deck", 0, 0).into_stack(deck, table).unwrap()).unwrap();
///
/// for i in 0..3 {
///     let card = StackCard::new(StackCardId::new(i), table, CardId::new(i));
///     manager.insert(card, deck, StackPosition::Top, &mut rng).unwrap();
/// }
///
/// assert_eq!(manager.top_card(deck), Some(StackCardId::new(2)));
/// assert_eq!(manager.stack_card(StackCardId::new(2)).unwrap().order, 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackManager {
    stacks: OrdMap<StackId, Stack>,
    cards: OrdMap<StackCardId, StackCard>,
    /// Card ids per stack, bottom first.
    order: OrdMap<StackId, Vector<StackCardId>>,
}

impl StackManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Stacks ===

    /// Add an empty stack.
    pub fn add_stack(&mut self, stack: Stack) -> Result<()> {
        stack.validate()?;
        self.order.insert(stack.id, Vector::new());
        self.stacks.insert(stack.id, stack);
        Ok(())
    }

    /// Remove an empty stack.
    pub fn remove_stack(&mut self, id: StackId) -> Result<Stack> {
        if self.stack_len(id)? > 0 {
            return Err(ValidationError::StackNotEmpty(id).into());
        }
        self.order.remove(&id);
        self.stacks
            .remove(&id)
            .ok_or_else(|| ReferenceError::UnknownStack(id).into())
    }

    /// Get a stack.
    pub fn stack(&self, id: StackId) -> Result<&Stack> {
        self.stacks
            .get(&id)
            .ok_or_else(|| ReferenceError::UnknownStack(id).into())
    }

    /// Get a stack mutably.
    pub fn stack_mut(&mut self, id: StackId) -> Result<&mut Stack> {
        self.stacks
            .get_mut(&id)
            .ok_or_else(|| ReferenceError::UnknownStack(id).into())
    }

    /// Iterate over stacks by id.
    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.values()
    }

    /// Number of stacks.
    #[must_use]
    pub fn stack_count(&self) -> usize {
        self.stacks.len()
    }

    // === Cards ===

    /// Get a stack card.
    pub fn stack_card(&self, id: StackCardId) -> Result<&StackCard> {
        self.cards
            .get(&id)
            .ok_or_else(|| ReferenceError::UnknownStackCard(id).into())
    }

    /// Get a stack card mutably.
    ///
    /// Callers must not change `stack` or `order` through this reference.
    pub fn stack_card_mut(&mut self, id: StackCardId) -> Result<&mut StackCard> {
        self.cards
            .get_mut(&id)
            .ok_or_else(|| ReferenceError::UnknownStackCard(id).into())
    }

    /// Check if a stack card is on the table.
    #[must_use]
    pub fn contains(&self, id: StackCardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Card ids in a stack, bottom first.
    pub fn ids_in_stack(&self, stack: StackId) -> Result<&Vector<StackCardId>> {
        self.order
            .get(&stack)
            .ok_or_else(|| ReferenceError::UnknownStack(stack).into())
    }

    /// Cards in a stack, bottom first.
    pub fn cards_in_stack(&self, stack: StackId) -> Result<Vec<&StackCard>> {
        self.ids_in_stack(stack)?
            .iter()
            .map(|id| self.stack_card(*id))
            .collect()
    }

    /// Number of cards in a stack.
    pub fn stack_len(&self, stack: StackId) -> Result<usize> {
        Ok(self.ids_in_stack(stack)?.len())
    }

    /// Top card of a stack.
    #[must_use]
    pub fn top_card(&self, stack: StackId) -> Option<StackCardId> {
        self.order.get(&stack)?.last().copied()
    }

    /// Bottom card of a stack.
    #[must_use]
    pub fn bottom_card(&self, stack: StackId) -> Option<StackCardId> {
        self.order.get(&stack)?.front().copied()
    }

    /// Card at a given order.
    #[must_use]
    pub fn card_at(&self, stack: StackId, order: usize) -> Option<StackCardId> {
        self.order.get(&stack)?.get(order).copied()
    }

    /// Total cards on the table.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    // === Placement ===

    /// Put a new stack card into a stack.
    pub fn insert(
        &mut self,
        mut card: StackCard,
        stack: StackId,
        position: StackPosition,
        rng: &mut TableRng,
    ) -> Result<()> {
        if self.cards.contains_key(&card.id) {
            return Err(integrity(stack, format!("{} is already on the table", card.id)));
        }
        let ids = self
            .order
            .get_mut(&stack)
            .ok_or(ReferenceError::UnknownStack(stack))?;
        let index = position.index_for(ids.len(), rng);
        ids.insert(index, card.id);

        card.stack = stack;
        self.cards.insert(card.id, card);
        self.reindex(stack);
        Ok(())
    }

    /// Move a stack card to another stack (or another position in its own).
    ///
    /// Returns the stack it came from.
    pub fn relocate(
        &mut self,
        id: StackCardId,
        dest: StackId,
        position: StackPosition,
        rng: &mut TableRng,
    ) -> Result<StackId> {
        if !self.order.contains_key(&dest) {
            return Err(ReferenceError::UnknownStack(dest).into());
        }
        let from = self.stack_card(id)?.stack;
        self.unlist(id, from)?;

        if let Some(ids) = self.order.get_mut(&dest) {
            let index = position.index_for(ids.len(), rng);
            ids.insert(index, id);
        }
        if let Some(card) = self.cards.get_mut(&id) {
            card.stack = dest;
        }

        self.reindex(from);
        if dest != from {
            self.reindex(dest);
        }
        Ok(from)
    }

    /// Take a stack card off the table.
    pub fn remove(&mut self, id: StackCardId) -> Result<StackCard> {
        let from = self.stack_card(id)?.stack;
        self.unlist(id, from)?;
        let card = self
            .cards
            .remove(&id)
            .ok_or(ReferenceError::UnknownStackCard(id))?;
        self.reindex(from);
        Ok(card)
    }

    /// Randomly permute a stack.
    pub fn shuffle(&mut self, stack: StackId, rng: &mut TableRng) -> Result<()> {
        let ids = self
            .order
            .get_mut(&stack)
            .ok_or(ReferenceError::UnknownStack(stack))?;
        let mut shuffled: Vec<_> = ids.iter().copied().collect();
        rng.shuffle(&mut shuffled);
        *ids = shuffled.into_iter().collect();
        self.reindex(stack);
        Ok(())
    }

    /// Resolve a selection against a stack.
    pub fn select(
        &self,
        stack: StackId,
        selection: &Selection,
        rng: &mut TableRng,
    ) -> Result<Vec<StackCardId>> {
        let ids = self.ids_in_stack(stack)?;
        let take = |n: usize| -> Result<usize> {
            if n == 0 {
                return Err(ValidationError::EmptySelection.into());
            }
            if n > ids.len() {
                return Err(ValidationError::NotEnoughCards {
                    stack,
                    requested: n,
                    available: ids.len(),
                }
                .into());
            }
            Ok(n)
        };

        match selection {
            Selection::Top(n) => {
                let n = take(*n)?;
                Ok(ids.iter().rev().take(n).copied().collect())
            }
            Selection::Bottom(n) => {
                let n = take(*n)?;
                Ok(ids.iter().take(n).copied().collect())
            }
            Selection::Random(n) => {
                let n = take(*n)?;
                let mut pool: Vec<_> = ids.iter().copied().collect();
                rng.shuffle(&mut pool);
                pool.truncate(n);
                Ok(pool)
            }
            Selection::Specific(chosen) => {
                if chosen.is_empty() {
                    return Err(ValidationError::EmptySelection.into());
                }
                let mut picked: Vec<StackCardId> = Vec::with_capacity(chosen.len());
                for &id in chosen {
                    if self.stack_card(id)?.stack != stack {
                        return Err(ReferenceError::NotInStack {
                            stack_card: id,
                            stack,
                        }
                        .into());
                    }
                    if picked.contains(&id) {
                        return Err(ValidationError::DuplicateSelection { stack_card: id }.into());
                    }
                    picked.push(id);
                }
                Ok(picked)
            }
        }
    }

    // === Invariants ===

    /// Verify that every stack's orders are exactly `0..n` and that every
    /// card is listed in the stack it points to.
    pub fn check_integrity(&self) -> Result<()> {
        let mut listed = 0usize;
        for (stack, ids) in self.order.iter() {
            if !self.stacks.contains_key(stack) {
                return Err(integrity(*stack, "order kept for a missing stack".into()));
            }
            for (index, id) in ids.iter().enumerate() {
                let card = self
                    .cards
                    .get(id)
                    .ok_or_else(|| integrity(*stack, format!("{id} listed but not on the table")))?;
                if card.stack != *stack {
                    return Err(integrity(
                        *stack,
                        format!("{id} listed here but points to {}", card.stack),
                    ));
                }
                if card.order as usize != index {
                    return Err(integrity(
                        *stack,
                        format!("{id} has order {} at position {index}", card.order),
                    ));
                }
            }
            listed += ids.len();
        }

        if listed != self.cards.len() {
            let stray = self.cards.values().find(|card| {
                self.order
                    .get(&card.stack)
                    .map_or(true, |ids| !ids.contains(&card.id))
            });
            let (stack, detail) = match stray {
                Some(card) => (card.stack, format!("{} is not listed in its stack", card.id)),
                None => (StackId::default(), format!("{listed} listed, {} on table", self.cards.len())),
            };
            return Err(integrity(stack, detail));
        }

        for stack in self.stacks.values() {
            if !self.order.contains_key(&stack.id) {
                return Err(integrity(stack.id, "stack has no order list".into()));
            }
            stack.validate()?;
        }
        Ok(())
    }

    fn unlist(&mut self, id: StackCardId, from: StackId) -> Result<()> {
        let ids = self
            .order
            .get_mut(&from)
            .ok_or_else(|| integrity(from, format!("{id} points to a missing stack")))?;
        let index = ids
            .index_of(&id)
            .ok_or_else(|| integrity(from, format!("{id} is not listed in its stack")))?;
        ids.remove(index);
        Ok(())
    }

    fn reindex(&mut self, stack: StackId) {
        if let Some(ids) = self.order.get(&stack) {
            for (index, id) in ids.iter().enumerate() {
                if let Some(card) = self.cards.get_mut(id) {
                    card.order = index as u32;
                }
            }
        }
    }
}
