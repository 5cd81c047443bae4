//! Catalog of games, cards and tokens.
//!
//! The `Catalog` validates new entries, assigns their ids and answers
//! lookups. Once play starts it is shared read-only (behind an `Arc`) by
//! the `TableStore`.

use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use super::definition::{Card, CardBack, Game, NewCard, NewGame, NewToken, Token};
use crate::core::config::TableConfig;
use crate::core::entity::{CardId, GameId, TokenId};
use crate::error::{ReferenceError, Result, ValidationError};

/// Registry of catalog entries.
///
/// ## Example
///
/// ```
/// use tabletop_stacks::catalog::{Catalog, NewCard, NewGame};
///
/// let mut catalog = Catalog::new();
/// let poker = catalog.register_game(NewGame::new("Poker", 2, 10)).unwrap();
/// let ace = catalog.register_card(poker, NewCard::new("Ace of Spades", 1)).unwrap();
///
/// assert_eq!(catalog.card(ace).unwrap().name, "Ace of Spades");
/// assert_eq!(catalog.card_by_number(poker, 1), Some(ace));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    games: FxHashMap<GameId, Game>,
    cards: FxHashMap<CardId, Card>,
    tokens: FxHashMap<TokenId, Token>,
    cards_by_game: FxHashMap<GameId, Vec<CardId>>,
    tokens_by_game: FxHashMap<GameId, Vec<TokenId>>,
    card_numbers: FxHashMap<(GameId, i32), CardId>,
    next_game: GameId,
    next_card: CardId,
    next_token: TokenId,
    allow_duplicate_numbers: bool,
}

impl Catalog {
    /// Create an empty catalog with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog honoring `config.unique_card_numbers`.
    #[must_use]
    pub fn with_config(config: &TableConfig) -> Self {
        Self {
            allow_duplicate_numbers: !config.unique_card_numbers,
            ..Self::default()
        }
    }

    /// Whether card numbers must be unique within a game.
    #[must_use]
    pub fn unique_card_numbers(&self) -> bool {
        !self.allow_duplicate_numbers
    }

    /// Register a game and return its id.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub fn register_game(&mut self, new: NewGame) -> Result<GameId> {
        let id = self.next_game;
        let game = new.into_game(id)?;
        self.next_game = id.next();
        self.games.insert(id, game);
        self.cards_by_game.entry(id).or_default();
        self.tokens_by_game.entry(id).or_default();
        debug!(game = %id, "Game registered");
        Ok(id)
    }

    /// Register a card under a game and return its id.
    ///
    /// Rejects a number already used in the same game unless duplicates
    /// were allowed in the configuration.
    #[instrument(skip(self, new), fields(name = %new.name, number = new.number))]
    pub fn register_card(&mut self, game: GameId, new: NewCard) -> Result<CardId> {
        self.game(game)?;
        if !self.allow_duplicate_numbers && self.card_numbers.contains_key(&(game, new.number)) {
            return Err(ValidationError::DuplicateCardNumber {
                game,
                number: new.number,
            }
            .into());
        }

        let id = self.next_card;
        let card = new.into_card(id, game)?;
        self.next_card = id.next();
        self.card_numbers.entry((game, card.number)).or_insert(id);
        self.cards_by_game.entry(game).or_default().push(id);
        self.cards.insert(id, card);
        debug!(card = %id, "Card registered");
        Ok(id)
    }

    /// Register a token under a game and return its id.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub fn register_token(&mut self, game: GameId, new: NewToken) -> Result<TokenId> {
        self.game(game)?;
        let id = self.next_token;
        let token = new.into_token(id, game)?;
        self.next_token = id.next();
        self.tokens_by_game.entry(game).or_default().push(id);
        self.tokens.insert(id, token);
        debug!(token = %id, "Token registered");
        Ok(id)
    }

    /// Get a game.
    pub fn game(&self, id: GameId) -> Result<&Game> {
        self.games
            .get(&id)
            .ok_or_else(|| ReferenceError::UnknownGame(id).into())
    }

    /// Get a card.
    pub fn card(&self, id: CardId) -> Result<&Card> {
        self.cards
            .get(&id)
            .ok_or_else(|| ReferenceError::UnknownCard(id).into())
    }

    /// Get a token.
    pub fn token(&self, id: TokenId) -> Result<&Token> {
        self.tokens
            .get(&id)
            .ok_or_else(|| ReferenceError::UnknownToken(id).into())
    }

    /// Get a card, requiring it to belong to `game`.
    pub fn card_in_game(&self, id: CardId, game: GameId) -> Result<&Card> {
        let card = self.card(id)?;
        if card.game != game {
            return Err(ReferenceError::CardOfOtherGame {
                card: id,
                expected: game,
                actual: card.game,
            }
            .into());
        }
        Ok(card)
    }

    /// Get a token, requiring it to belong to `game`.
    pub fn token_in_game(&self, id: TokenId, game: GameId) -> Result<&Token> {
        let token = self.token(id)?;
        if token.game != game {
            return Err(ReferenceError::TokenOfOtherGame {
                token: id,
                expected: game,
                actual: token.game,
            }
            .into());
        }
        Ok(token)
    }

    /// Cards of a game in registration order.
    pub fn cards_of(&self, game: GameId) -> impl Iterator<Item = &Card> {
        self.cards_by_game
            .get(&game)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.cards.get(id))
    }

    /// Tokens of a game in registration order.
    pub fn tokens_of(&self, game: GameId) -> impl Iterator<Item = &Token> {
        self.tokens_by_game
            .get(&game)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.tokens.get(id))
    }

    /// Find a card by its printed number.
    ///
    /// With duplicates allowed, returns the first card registered with it.
    #[must_use]
    pub fn card_by_number(&self, game: GameId, number: i32) -> Option<CardId> {
        self.card_numbers.get(&(game, number)).copied()
    }

    /// Resolve a card's back face against its game's defaults.
    pub fn card_back(&self, id: CardId) -> Result<CardBack<'_>> {
        let card = self.card(id)?;
        let game = self.game(card.game)?;
        Ok(CardBack::resolve(card, game))
    }

    /// Number of registered games.
    #[must_use]
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Number of registered cards across all games.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}
