//! Entity identification.
//!
//! Every persisted entity has its own typed identifier so a `StackId` can
//! never be passed where a `CardId` is expected.
//!
//! ## Allocation
//!
//! - `GameId`, `CardId`, `TokenId`: allocated by the `Catalog`
//! - `TableId`: allocated by the `TableStore`
//! - `StackId`, `StackCardId`, `ActionId`: allocated per table by `TableState`
//!
//! Stack-level ids are only meaningful inside the table that issued them.
//!
//! ```
//! use tabletop_stacks::core::{StackId, StackCardId};
//!
//! let deck = StackId::new(0);
//! assert_eq!(deck.raw(), 0);
//! assert_eq!(format!("{}", StackCardId::new(7)), "StackCard(7)");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an id from its raw value.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw id value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// The id following this one.
            #[must_use]
            pub(crate) const fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a catalog game.
    GameId,
    "Game"
);

entity_id!(
    /// Identifier of a catalog card definition (not a card on a table).
    CardId,
    "Card"
);

entity_id!(
    /// Identifier of a catalog token definition.
    TokenId,
    "Token"
);

entity_id!(
    /// Identifier of a live play session.
    TableId,
    "Table"
);

entity_id!(
    /// Identifier of a stack, unique within its table.
    StackId,
    "Stack"
);

entity_id!(
    /// Identifier of one card placed in a stack, unique within its table.
    ///
    /// The same catalog card can be placed several times; each placement
    /// gets its own `StackCardId`.
    StackCardId,
    "StackCard"
);

entity_id!(
    /// Sequence number of a table action within its table.
    ActionId,
    "Action"
);
