//! Single-deck setup, as for poker.
//!
//! - Every card of the game goes into one face-down "Deck" stack, shuffled
//! - Each seated player gets a "Chips" stack holding the game's tokens
//! - Optionally, each player is dealt a hand from the top of the deck
//!
//! Works for any player count the game allows.

mod setup;

pub use setup::SingleDeckSetup;
