//! Storage for solved subgames.
//!
//! A subgame is identified by which of the original rows and columns are
//! still in play, plus the end condition. Its value never changes within a
//! solve, so each one only needs to be computed once.

use std::sync::{PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identifies a subgame by the original decks still in play.
///
/// Bit `i` of `rows` is set while player 1's deck `i` is in the pool; the
/// same for `columns` and player 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubgameKey {
    /// Remaining row indices as a bitset.
    pub rows: u64,
    /// Remaining column indices as a bitset.
    pub columns: u64,
    /// Decks held in reserve when the series ends.
    pub reserve: usize,
}

impl SubgameKey {
    /// Build a key from remaining original indices.
    ///
    /// Indices must be below 64.
    pub fn new(rows: &[usize], columns: &[usize], reserve: usize) -> Self {
        Self {
            rows: bitset(rows),
            columns: bitset(columns),
            reserve,
        }
    }

    /// Number of player 1 decks in play.
    pub fn num_rows(&self) -> u32 {
        self.rows.count_ones()
    }

    /// Number of player 2 decks in play.
    pub fn num_columns(&self) -> u32 {
        self.columns.count_ones()
    }
}

fn bitset(indices: &[usize]) -> u64 {
    indices.iter().fold(0u64, |bits, &i| bits | (1u64 << i))
}

/// Thread-safe map from subgame to player 1's win probability.
///
/// Uses `RwLock` so parallel stage evaluation can share one cache: lookups
/// take the read lock, new results the write lock.
#[derive(Debug)]
pub struct SubgameCache {
    values: RwLock<FxHashMap<SubgameKey, f64>>,
}

impl Default for SubgameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SubgameCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create a cache with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    /// Cached win probability for `key`.
    pub fn get(&self, key: &SubgameKey) -> Option<f64> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    /// Store a win probability; an existing entry is kept.
    pub fn insert(&self, key: SubgameKey, value: f64) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(value);
    }

    /// Number of subgames stored.
    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Export every stored subgame, ordered by remaining deck count then key.
    pub fn export(&self) -> Vec<(SubgameKey, f64)> {
        let mut entries: Vec<(SubgameKey, f64)> = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(&k, &v)| (k, v))
            .collect();
        entries.sort_by_key(|(k, _)| (k.num_rows() + k.num_columns(), k.rows, k.columns));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bits() {
        let key = SubgameKey::new(&[0, 2], &[1, 3, 4], 1);
        assert_eq!(key.rows, 0b101);
        assert_eq!(key.columns, 0b11010);
        assert_eq!(key.num_rows(), 2);
        assert_eq!(key.num_columns(), 3);

        // Order of indices is irrelevant
        assert_eq!(key, SubgameKey::new(&[2, 0], &[4, 3, 1], 1));
        assert_ne!(key, SubgameKey::new(&[0, 2], &[1, 3, 4], 0));
    }

    #[test]
    fn test_insert_and_get() {
        let cache = SubgameCache::with_capacity(8);
        assert!(cache.is_empty());

        let key = SubgameKey::new(&[0], &[0, 1], 0);
        assert_eq!(cache.get(&key), None);

        cache.insert(key, 0.75);
        assert_eq!(cache.get(&key), Some(0.75));

        // First result wins
        cache.insert(key, 0.25);
        assert_eq!(cache.get(&key), Some(0.75));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_export_order() {
        let cache = SubgameCache::new();
        cache.insert(SubgameKey::new(&[0, 1], &[0, 1], 0), 0.5);
        cache.insert(SubgameKey::new(&[1], &[0], 0), 0.3);
        cache.insert(SubgameKey::new(&[0], &[1], 0), 0.6);

        let exported = cache.export();
        assert_eq!(exported.len(), 3);
        // rows 0b01 sorts before rows 0b10
        assert_eq!(exported[0].1, 0.6);
        assert_eq!(exported[1].1, 0.3);
        assert_eq!(exported[2].1, 0.5);
    }
}
