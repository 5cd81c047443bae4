//! Players and table membership.
//!
//! ## UserId
//!
//! Opaque identity issued by an external identity provider. The crate only
//! stores and compares it.
//!
//! ## PlayerRoster
//!
//! The players seated at one table (the TablePlayers relation), in seating
//! order. A user is seated at most once and the roster never grows past the
//! game's `max_players`.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// External user identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// Create a user id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User({})", self.0)
    }
}

/// Allowed player count for a game (inclusive on both ends).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerBounds {
    pub min: u32,
    pub max: u32,
}

impl PlayerBounds {
    /// Create bounds, rejecting `min == 0` or `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min == 0 || min > max {
            return Err(ValidationError::PlayerBounds { min, max }.into());
        }
        Ok(Self { min, max })
    }

    /// Reject a count above `max`.
    pub fn check_max(&self, count: usize) -> Result<()> {
        if count > self.max as usize {
            return Err(ValidationError::TooManyPlayers {
                max: self.max,
                count,
            }
            .into());
        }
        Ok(())
    }

    /// Reject a count below `min`.
    pub fn check_min(&self, count: usize) -> Result<()> {
        if count < self.min as usize {
            return Err(ValidationError::TooFewPlayers {
                min: self.min,
                count,
            }
            .into());
        }
        Ok(())
    }
}

/// Users seated at a table, in seating order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRoster {
    bounds: PlayerBounds,
    seats: Vector<UserId>,
}

impl PlayerRoster {
    /// Create an empty roster for a game with the given bounds.
    #[must_use]
    pub fn new(bounds: PlayerBounds) -> Self {
        Self {
            bounds,
            seats: Vector::new(),
        }
    }

    /// Seat a user.
    ///
    /// Fails if the user is already seated or the table is full.
    pub fn join(&mut self, user: UserId) -> Result<usize> {
        if self.contains(user) {
            return Err(ValidationError::AlreadySeated(user).into());
        }
        self.bounds.check_max(self.seats.len() + 1)?;
        self.seats.push_back(user);
        Ok(self.seats.len() - 1)
    }

    /// Remove a user. Returns `false` if they were not seated.
    pub fn leave(&mut self, user: UserId) -> bool {
        match self.seat_of(user) {
            Some(seat) => {
                self.seats.remove(seat);
                true
            }
            None => false,
        }
    }

    /// Check whether a user is seated.
    #[must_use]
    pub fn contains(&self, user: UserId) -> bool {
        self.seats.contains(&user)
    }

    /// Seat index of a user.
    #[must_use]
    pub fn seat_of(&self, user: UserId) -> Option<usize> {
        self.seats.index_of(&user)
    }

    /// Number of seated players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Check whether nobody is seated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// The game's player bounds.
    #[must_use]
    pub fn bounds(&self) -> PlayerBounds {
        self.bounds
    }

    /// Iterate over seated users in seating order.
    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.seats.iter().copied()
    }
}
