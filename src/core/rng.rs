//! Deterministic random number generation for shuffles and random picks.
//!
//! Each table owns one RNG stream derived from the store seed and the
//! table id, so two tables created from the same seed still shuffle
//! differently, and replaying a table from its seed reproduces every
//! shuffle.
//!
//! The RNG is stored inside `TableState` as a `TableRngState`, which keeps
//! the state serializable and lets a discarded transaction roll back its
//! random draws along with everything else.
//!
//! ```
//! use tabletop_stacks::core::{TableRng, TableId};
//!
//! let mut a = TableRng::for_table(42, TableId::new(1));
//! let mut b = TableRng::for_table(42, TableId::new(1));
//! assert_eq!(a.gen_range_usize(0..100), b.gen_range_usize(0..100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::entity::TableId;

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct TableRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl TableRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Derive the stream for one table from a store-wide seed.
    #[must_use]
    pub fn for_table(seed: u64, table: TableId) -> Self {
        let table_seed = seed ^ u64::from(table.raw()).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self::new(table_seed)
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Generate a random index into a collection of `len` items.
    ///
    /// Returns `None` for an empty collection.
    pub fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> TableRngState {
        TableRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &TableRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state.
///
/// ChaCha8's word position makes save/restore O(1) regardless of how many
/// values were drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRngState {
    /// Seed of the stream.
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter).
    pub word_pos: u128,
}
