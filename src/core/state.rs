//! Table state: everything one live table holds.
//!
//! ## TableState
//!
//! - Table identity and the seated players
//! - Stacks and the cards in them (`StackManager`)
//! - The action log
//! - The shuffle RNG position
//! - A version number used for optimistic commits
//!
//! All collections are `im` persistent structures, so `clone()` is O(1). The
//! store runs each operation on a clone and swaps it in on success; an
//! operation that fails part-way leaves the committed state untouched.
//!
//! ## Example
//!
//! ```
//! use tabletop_stacks::catalog::{Catalog, NewCard, NewGame};
//! use tabletop_stacks::core::{Actor, PlayerBounds, TableId, TableState};
//! use tabletop_stacks::session::Table;
//! use tabletop_stacks::stacks::{Destination, NewStack, Selection, StackPosition};
//!
//! let mut catalog = Catalog::new();
//! let game = catalog.register_game(NewGame::new("Rummy", 2, 4)).unwrap();
//! let ace = catalog.register_card(game, NewCard::new("Ace", 1)).unwrap();
//!
//! let bounds = PlayerBounds::new(2, 4).unwrap();
//! let mut state = TableState::new(Table::new(TableId::new(0), game), bounds, 7);
//! let deck = state.create_stack(NewStack::new("Deck", 0, 0)).unwrap();
//! let discard = state.create_stack(NewStack::new("Discard", 1, 0)).unwrap();
//!
//! state.place_card(&catalog, Actor::Setup, ace, deck, StackPosition::Top).unwrap();
//! state.move_cards(Actor::Setup, deck, Selection::Top(1), Destination::top_of(discard)).unwrap();
//!
//! assert_eq!(state.stack_len(discard).unwrap(), 1);
//! assert_eq!(state.log().len(), 2);
//! ```

use serde::{Deserialize, Serialize};

use super::action::{ActionKind, ActionLog, TableAction};
use super::entity::{CardId, GameId, StackCardId, StackId, TableId, TokenId};
use super::player::{PlayerBounds, PlayerRoster, UserId};
use super::rng::{TableRng, TableRngState};
use crate::catalog::Catalog;
use crate::error::{ReferenceError, Result, TabletopError, ValidationError};
use crate::session::table::Table;
use crate::stacks::{
    CardMeta, Destination, Facing, NewStack, Orientation, Selection, Stack, StackCard,
    StackManager, StackPosition, TokenTarget,
};

/// Who performs an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// A seated player.
    Player(UserId),
    /// Setup automation; logged with no player.
    Setup,
}

impl Actor {
    /// The acting user, if any.
    #[must_use]
    pub const fn user(self) -> Option<UserId> {
        match self {
            Actor::Player(user) => Some(user),
            Actor::Setup => None,
        }
    }
}

impl From<UserId> for Actor {
    fn from(user: UserId) -> Self {
        Actor::Player(user)
    }
}

/// Complete state of one table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    table: Table,
    roster: PlayerRoster,
    stacks: StackManager,
    log: ActionLog,
    rng: TableRngState,
    version: u64,
    next_stack: StackId,
    next_stack_card: StackCardId,
}

impl TableState {
    /// Create an empty table. The shuffle stream is derived from `seed` and
    /// the table id.
    #[must_use]
    pub fn new(table: Table, bounds: PlayerBounds, seed: u64) -> Self {
        Self {
            table,
            roster: PlayerRoster::new(bounds),
            stacks: StackManager::new(),
            log: ActionLog::new(table.id),
            rng: TableRng::for_table(seed, table.id).state(),
            version: 0,
            next_stack: StackId::new(0),
            next_stack_card: StackCardId::new(0),
        }
    }

    // === Accessors ===

    /// Table identity.
    #[must_use]
    pub fn table(&self) -> Table {
        self.table
    }

    /// Table id.
    #[must_use]
    pub fn id(&self) -> TableId {
        self.table.id
    }

    /// Game being played.
    #[must_use]
    pub fn game(&self) -> GameId {
        self.table.game
    }

    /// Seated players.
    #[must_use]
    pub fn roster(&self) -> &PlayerRoster {
        &self.roster
    }

    /// Stacks and stack cards.
    #[must_use]
    pub fn stacks(&self) -> &StackManager {
        &self.stacks
    }

    /// The action log.
    #[must_use]
    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    /// Logged actions, oldest first.
    pub fn actions(&self) -> impl Iterator<Item = &TableAction> {
        self.log.iter()
    }

    /// Committed version. Bumped on every successful commit.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get a stack.
    pub fn stack(&self, id: StackId) -> Result<&Stack> {
        self.stacks.stack(id)
    }

    /// Get a stack card.
    pub fn stack_card(&self, id: StackCardId) -> Result<&StackCard> {
        self.stacks.stack_card(id)
    }

    /// Cards in a stack, bottom first.
    pub fn stack_cards(&self, stack: StackId) -> Result<Vec<&StackCard>> {
        self.stacks.cards_in_stack(stack)
    }

    /// Number of cards in a stack.
    pub fn stack_len(&self, stack: StackId) -> Result<usize> {
        self.stacks.stack_len(stack)
    }

    /// Facing of a card after applying its stack's default.
    pub fn effective_facing(&self, id: StackCardId) -> Result<Facing> {
        let card = self.stacks.stack_card(id)?;
        Ok(card.effective_facing(self.stacks.stack(card.stack)?))
    }

    /// Orientation of a card after applying its stack's default.
    pub fn effective_orientation(&self, id: StackCardId) -> Result<Orientation> {
        let card = self.stacks.stack_card(id)?;
        Ok(card.effective_orientation(self.stacks.stack(card.stack)?))
    }

    // === Players ===

    /// Seat a user. Returns the seat index.
    pub fn join(&mut self, user: UserId) -> Result<usize> {
        self.roster.join(user)
    }

    /// Unseat a user. Stacks they own stay on the table.
    pub fn leave(&mut self, user: UserId) -> Result<()> {
        if self.roster.leave(user) {
            Ok(())
        } else {
            Err(ReferenceError::NotSeated(user).into())
        }
    }

    fn acting(&self, actor: Actor) -> Result<Option<UserId>> {
        match actor {
            Actor::Player(user) if !self.roster.contains(user) => {
                Err(ReferenceError::NotSeated(user).into())
            }
            _ => Ok(actor.user()),
        }
    }

    // === Stacks ===

    /// Create an empty stack. An owner must be seated.
    pub fn create_stack(&mut self, draft: NewStack) -> Result<StackId> {
        if let Some(owner) = draft.player {
            if !self.roster.contains(owner) {
                return Err(ReferenceError::NotSeated(owner).into());
            }
        }
        let id = self.next_stack;
        let stack = draft.into_stack(id, self.table.id)?;
        self.stacks.add_stack(stack)?;
        self.next_stack = id.next();
        Ok(id)
    }

    /// Remove an empty stack.
    pub fn remove_stack(&mut self, stack: StackId) -> Result<Stack> {
        self.stacks.remove_stack(stack)
    }

    // === Card movement ===

    /// Bring a catalog card into play.
    pub fn place_card(
        &mut self,
        catalog: &Catalog,
        actor: Actor,
        card: CardId,
        stack: StackId,
        position: StackPosition,
    ) -> Result<StackCardId> {
        let player = self.acting(actor)?;
        catalog.card_in_game(card, self.table.game)?;

        let id = self.next_stack_card;
        let mut rng = self.rng();
        self.stacks.insert(
            StackCard::new(id, self.table.id, card),
            stack,
            position,
            &mut rng,
        )?;
        self.rng = rng.state();
        self.next_stack_card = id.next();

        self.log
            .record(ActionKind::MoveCard, player, id, card, None, Some(stack));
        Ok(id)
    }

    /// Move selected cards out of `from`.
    ///
    /// Cards move one at a time in selection order, so `Top(n)` onto the
    /// top of another stack reverses them, as when dealing. One action is
    /// logged per card. Returns the moved cards.
    pub fn move_cards(
        &mut self,
        actor: Actor,
        from: StackId,
        selection: Selection,
        dest: Destination,
    ) -> Result<Vec<StackCardId>> {
        let player = self.acting(actor)?;
        if let Some(stack) = dest.stack() {
            self.stacks.stack(stack)?;
        }

        let mut rng = self.rng();
        let ids = self.stacks.select(from, &selection, &mut rng)?;

        for &id in &ids {
            match dest {
                Destination::Stack { stack, position } => {
                    let card = self.stacks.stack_card(id)?.card;
                    let old = self.stacks.relocate(id, stack, position, &mut rng)?;
                    self.log
                        .record(ActionKind::MoveCard, player, id, card, Some(old), Some(stack));
                }
                Destination::OffTable => {
                    let removed = self.stacks.remove(id)?;
                    self.log.record(
                        ActionKind::MoveCard,
                        player,
                        id,
                        removed.card,
                        Some(removed.stack),
                        None,
                    );
                }
            }
        }

        self.rng = rng.state();
        Ok(ids)
    }

    /// Split the top `count` cards of `stack` into a new stack, keeping
    /// their relative order.
    pub fn split_stack(
        &mut self,
        actor: Actor,
        stack: StackId,
        count: usize,
        draft: NewStack,
    ) -> Result<StackId> {
        let player = self.acting(actor)?;
        let mut rng = self.rng();
        let mut ids = self.stacks.select(stack, &Selection::Top(count), &mut rng)?;
        ids.reverse();

        let new_stack = self.create_stack(draft)?;
        for id in ids {
            let card = self.stacks.stack_card(id)?.card;
            self.stacks
                .relocate(id, new_stack, StackPosition::Top, &mut rng)?;
            self.log.record(
                ActionKind::MoveCard,
                player,
                id,
                card,
                Some(stack),
                Some(new_stack),
            );
        }
        self.rng = rng.state();
        Ok(new_stack)
    }

    /// Randomly reorder a stack. Logs one `shuffle` action per card.
    pub fn shuffle_stack(&mut self, actor: Actor, stack: StackId) -> Result<()> {
        let player = self.acting(actor)?;
        let mut rng = self.rng();
        self.stacks.shuffle(stack, &mut rng)?;
        self.rng = rng.state();

        for card in self.stacks.cards_in_stack(stack)? {
            self.log.record(
                ActionKind::Shuffle,
                player,
                card.id,
                card.card,
                Some(stack),
                Some(stack),
            );
        }
        Ok(())
    }

    // === Physical state ===

    /// Turn cards over by overriding their facing. Every id is checked
    /// before any card changes.
    pub fn flip_cards(&mut self, actor: Actor, ids: &[StackCardId]) -> Result<()> {
        self.turn_cards(actor, ids, ActionKind::Flip, |card, stack| StackCard {
            facing: Some(card.effective_facing(stack).flipped()),
            ..card.clone()
        })
    }

    /// Turn cards sideways (or back) by overriding their orientation.
    /// Every id is checked before any card changes.
    pub fn rotate_cards(&mut self, actor: Actor, ids: &[StackCardId]) -> Result<()> {
        self.turn_cards(actor, ids, ActionKind::Rotate, |card, stack| StackCard {
            orientation: Some(card.effective_orientation(stack).rotated()),
            ..card.clone()
        })
    }

    fn turn_cards(
        &mut self,
        actor: Actor,
        ids: &[StackCardId],
        kind: ActionKind,
        turned: impl Fn(&StackCard, &Stack) -> StackCard,
    ) -> Result<()> {
        let player = self.acting(actor)?;
        if ids.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        let mut updates: Vec<StackCard> = Vec::with_capacity(ids.len());
        for &id in ids {
            if updates.iter().any(|card| card.id == id) {
                return Err(ValidationError::DuplicateSelection { stack_card: id }.into());
            }
            let card = self.stacks.stack_card(id)?;
            updates.push(turned(card, self.stacks.stack(card.stack)?));
        }

        for update in updates {
            let (id, card, stack) = (update.id, update.card, update.stack);
            *self.stacks.stack_card_mut(id)? = update;
            self.log
                .record(kind, player, id, card, Some(stack), Some(stack));
        }
        Ok(())
    }

    /// Flip a stack's default facing. Cards with their own facing keep it
    /// and are not logged.
    pub fn flip_stack(&mut self, actor: Actor, stack: StackId) -> Result<()> {
        let player = self.acting(actor)?;
        let target = self.stacks.stack_mut(stack)?;
        target.facing = target.facing.flipped();
        self.log_following(ActionKind::Flip, player, stack, |card| card.facing.is_none())
    }

    /// Rotate a stack's default orientation. Cards with their own
    /// orientation keep it and are not logged.
    pub fn rotate_stack(&mut self, actor: Actor, stack: StackId) -> Result<()> {
        let player = self.acting(actor)?;
        let target = self.stacks.stack_mut(stack)?;
        target.orientation = target.orientation.rotated();
        self.log_following(ActionKind::Rotate, player, stack, |card| {
            card.orientation.is_none()
        })
    }

    fn log_following(
        &mut self,
        kind: ActionKind,
        player: Option<UserId>,
        stack: StackId,
        follows: impl Fn(&StackCard) -> bool,
    ) -> Result<()> {
        for card in self.stacks.cards_in_stack(stack)? {
            if follows(card) {
                self.log
                    .record(kind, player, card.id, card.card, Some(stack), Some(stack));
            }
        }
        Ok(())
    }

    // === Tokens ===

    /// Attach a token. Returns `false` if it was already attached.
    pub fn attach_token(
        &mut self,
        catalog: &Catalog,
        target: TokenTarget,
        token: TokenId,
    ) -> Result<bool> {
        catalog.token_in_game(token, self.table.game)?;
        Ok(self.meta_mut(target)?.tokens_mut().insert(token))
    }

    /// Detach a token. Returns `false` if it was not attached.
    pub fn detach_token(&mut self, target: TokenTarget, token: TokenId) -> Result<bool> {
        Ok(self.meta_mut(target)?.tokens_mut().remove(token))
    }

    /// Tokens attached to a stack or card.
    pub fn tokens(&self, target: TokenTarget) -> Result<Vec<TokenId>> {
        let meta: &dyn CardMeta = match target {
            TokenTarget::Stack(id) => self.stacks.stack(id)? as &dyn CardMeta,
            TokenTarget::Card(id) => self.stacks.stack_card(id)? as &dyn CardMeta,
        };
        Ok(meta.tokens().iter().collect())
    }

    fn meta_mut(&mut self, target: TokenTarget) -> Result<&mut dyn CardMeta> {
        let meta: &mut dyn CardMeta = match target {
            TokenTarget::Stack(id) => self.stacks.stack_mut(id)? as &mut dyn CardMeta,
            TokenTarget::Card(id) => self.stacks.stack_card_mut(id)?,
        };
        Ok(meta)
    }

    // === Integrity ===

    /// Check that every stack is densely ordered and belongs to this table.
    pub fn check_integrity(&self) -> Result<()> {
        self.stacks.check_integrity()?;
        for stack in self.stacks.stacks() {
            if stack.table != self.table.id {
                return Err(TabletopError::OrderingIntegrity {
                    stack: stack.id,
                    detail: format!("stack belongs to {}", stack.table),
                });
            }
            for card in self.stacks.cards_in_stack(stack.id)? {
                if card.table != self.table.id {
                    return Err(TabletopError::OrderingIntegrity {
                        stack: stack.id,
                        detail: format!("{} belongs to {}", card.id, card.table),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check that the game, every placed card and every attached token
    /// exist in `catalog`, and that the roster fits the game's seat limit.
    pub fn check_references(&self, catalog: &Catalog) -> Result<()> {
        let game = self.table.game;
        catalog.game(game)?.players.check_max(self.roster.len())?;
        for stack in self.stacks.stacks() {
            for token in stack.tokens.iter() {
                catalog.token_in_game(token, game)?;
            }
            for card in self.stacks.cards_in_stack(stack.id)? {
                catalog.card_in_game(card.card, game)?;
                for token in card.tokens.iter() {
                    catalog.token_in_game(token, game)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    fn rng(&self) -> TableRng {
        TableRng::from_state(&self.rng)
    }
}
