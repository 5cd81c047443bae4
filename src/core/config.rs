//! Engine configuration.
//!
//! `TableConfig` is handed to the `TableStore` at startup. The card number
//! rule belongs to the catalog and takes effect through
//! `Catalog::with_config`. It derives `Deserialize` so a host can load it from whatever
//! configuration format it already uses.

use serde::{Deserialize, Serialize};

/// Configuration shared by the catalog and the table store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// How many times `TableStore::execute` retries after losing a
    /// concurrent commit before reporting `ConcurrencyConflict`.
    pub max_retries: u32,

    /// Store-wide seed. Each table derives its own stream from it.
    pub seed: u64,

    /// Reject table creation with fewer than the game's `min_players`.
    ///
    /// Joining past `max_players` is always rejected.
    pub enforce_player_bounds: bool,

    /// Reject a second card with the same `number` in one game.
    ///
    /// Read only by `Catalog::with_config`; the store never re-checks it.
    pub unique_card_numbers: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_retries: 8,
            seed: 42,
            enforce_player_bounds: true,
            unique_card_numbers: true,
        }
    }
}

impl TableConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry budget for conflicting transactions.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the store-wide seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Allow tables to start below `min_players`.
    #[must_use]
    pub fn allow_short_tables(mut self) -> Self {
        self.enforce_player_bounds = false;
        self
    }

    /// Allow duplicate card numbers within a game.
    #[must_use]
    pub fn allow_duplicate_card_numbers(mut self) -> Self {
        self.unique_card_numbers = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.max_retries, 8);
        assert!(config.enforce_player_bounds);
        assert!(config.unique_card_numbers);
    }

    #[test]
    fn test_builder() {
        let config = TableConfig::new()
            .with_max_retries(2)
            .with_seed(7)
            .allow_short_tables()
            .allow_duplicate_card_numbers();

        assert_eq!(config.max_retries, 2);
        assert_eq!(config.seed, 7);
        assert!(!config.enforce_player_bounds);
        assert!(!config.unique_card_numbers);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{"max_retries": 3}"#).unwrap();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.seed, 42);
        assert!(config.unique_card_numbers);
    }
}
