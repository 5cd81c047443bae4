//! Catalog definitions: games, cards and tokens.
//!
//! These describe what *can* appear on a table. They are authored before
//! play and never change while a table is running. Placement on a table is
//! tracked separately by `StackCard`.
//!
//! New entries are described with `NewGame`, `NewCard` and `NewToken` and
//! handed to the `Catalog`, which validates them and assigns ids.

use serde::{Deserialize, Serialize};

use crate::core::entity::{CardId, GameId, TokenId};
use crate::core::player::PlayerBounds;
use crate::error::{Result, ValidationError};

/// Maximum length of a game name.
pub const GAME_NAME_MAX: usize = 50;
/// Maximum length of a card or token name.
pub const PIECE_NAME_MAX: usize = 100;

/// Reference to an image held by an external asset store.
///
/// Only the path is stored; image bytes are never read.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef(pub String);

impl AssetRef {
    /// Create a reference from a path or URL.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The stored path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn check_name(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field }.into());
    }
    check_len(field, value, max)
}

pub(crate) fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, max, len }.into());
    }
    Ok(())
}

/// A registered game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub description: String,
    pub players: PlayerBounds,
    /// Back text used by cards that don't define their own.
    pub card_back_text_default: String,
    /// Back image used by cards that don't define their own.
    pub card_back_image_default: Option<AssetRef>,
}

/// Description of a game to register.
///
/// ```
/// use tabletop_stacks::catalog::NewGame;
///
/// let poker = NewGame::new("Poker", 2, 10)
///     .with_description("Texas hold'em")
///     .with_card_back("Standard back", None);
/// assert_eq!(poker.min_players, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGame {
    pub name: String,
    pub description: String,
    pub min_players: u32,
    pub max_players: u32,
    pub card_back_text_default: String,
    pub card_back_image_default: Option<AssetRef>,
}

impl NewGame {
    /// Describe a game with its player-count bounds.
    pub fn new(name: impl Into<String>, min_players: u32, max_players: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            min_players,
            max_players,
            card_back_text_default: String::new(),
            card_back_image_default: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the default card back.
    #[must_use]
    pub fn with_card_back(mut self, text: impl Into<String>, image: Option<AssetRef>) -> Self {
        self.card_back_text_default = text.into();
        self.card_back_image_default = image;
        self
    }

    pub(crate) fn into_game(self, id: GameId) -> Result<Game> {
        check_name("game name", &self.name, GAME_NAME_MAX)?;
        let players = PlayerBounds::new(self.min_players, self.max_players)?;
        Ok(Game {
            id,
            name: self.name,
            description: self.description,
            players,
            card_back_text_default: self.card_back_text_default,
            card_back_image_default: self.card_back_image_default,
        })
    }
}

/// A registered card definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub game: GameId,
    pub name: String,
    pub description: String,
    /// Number printed on the card, unique within its game by default.
    pub number: i32,
    pub front_text: String,
    pub back_text: String,
    pub front_image: Option<AssetRef>,
    pub back_image: Option<AssetRef>,
}

/// Description of a card to register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCard {
    pub name: String,
    pub description: String,
    pub number: i32,
    pub front_text: String,
    pub back_text: String,
    pub front_image: Option<AssetRef>,
    pub back_image: Option<AssetRef>,
}

impl NewCard {
    /// Describe a card by name and number.
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            number,
            front_text: String::new(),
            back_text: String::new(),
            front_image: None,
            back_image: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the front face.
    #[must_use]
    pub fn with_front(mut self, text: impl Into<String>, image: Option<AssetRef>) -> Self {
        self.front_text = text.into();
        self.front_image = image;
        self
    }

    /// Set a card-specific back, overriding the game default.
    #[must_use]
    pub fn with_back(mut self, text: impl Into<String>, image: Option<AssetRef>) -> Self {
        self.back_text = text.into();
        self.back_image = image;
        self
    }

    pub(crate) fn into_card(self, id: CardId, game: GameId) -> Result<Card> {
        check_name("card name", &self.name, PIECE_NAME_MAX)?;
        Ok(Card {
            id,
            game,
            name: self.name,
            description: self.description,
            number: self.number,
            front_text: self.front_text,
            back_text: self.back_text,
            front_image: self.front_image,
            back_image: self.back_image,
        })
    }
}

/// A registered token definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub game: GameId,
    pub name: String,
    pub description: String,
    pub image: Option<AssetRef>,
}

/// Description of a token to register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewToken {
    pub name: String,
    pub description: String,
    pub image: Option<AssetRef>,
}

impl NewToken {
    /// Describe a token by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            image: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the image.
    #[must_use]
    pub fn with_image(mut self, image: AssetRef) -> Self {
        self.image = Some(image);
        self
    }

    pub(crate) fn into_token(self, id: TokenId, game: GameId) -> Result<Token> {
        check_name("token name", &self.name, PIECE_NAME_MAX)?;
        Ok(Token {
            id,
            game,
            name: self.name,
            description: self.description,
            image: self.image,
        })
    }
}

/// Resolved back face of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardBack<'a> {
    pub text: &'a str,
    pub image: Option<&'a AssetRef>,
}

impl<'a> CardBack<'a> {
    /// A card's own back where set, the game default elsewhere.
    #[must_use]
    pub fn resolve(card: &'a Card, game: &'a Game) -> Self {
        let text = if card.back_text.is_empty() {
            game.card_back_text_default.as_str()
        } else {
            card.back_text.as_str()
        };
        let image = card
            .back_image
            .as_ref()
            .or(game.card_back_image_default.as_ref());
        Self { text, image }
    }
}
