use std::hash::Hash;
use std::sync::Arc;
use ahash::RandomState;
use parking_lot::Mutex;

use super::{effective_capacity, Store, UNBOUNDED};
use crate::error::Result;
use crate::policy::Policy;

// ---------------------------------------------------------------------------
// Shard
// ---------------------------------------------------------------------------

/// Cache-line padding to prevent false sharing between shards.
#[repr(align(64))]
pub(crate) struct Shard<K, V, P>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    pub(crate) store: Mutex<Store<K, V, P>>,
}

// ---------------------------------------------------------------------------
// ShardedStore
// ---------------------------------------------------------------------------

/// `N` independently-locked [`Store`]s, each with its own policy.
///
/// A key always maps to the same shard, so per-key operations stay atomic
/// and the store/policy pairing holds shard by shard. Shard capacities add
/// up to exactly the configured capacity.
pub struct ShardedStore<K, V, P>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    shards: Box<[Shard<K, V, P>]>,
    /// Always `shards.len() - 1`; shards.len() is a power of two.
    shard_mask: usize,
    /// Hasher used only to compute shard indices.
    build_hasher: RandomState,
    /// Normalized total capacity.
    capacity: usize,
}

/// Largest power of two that is `<= n` (`n` must be non-zero).
#[inline]
fn prev_power_of_two(n: usize) -> usize {
    1 << (usize::BITS - 1 - n.leading_zeros())
}

impl<K, V, P> ShardedStore<K, V, P>
where
    K: Hash + Eq + Clone,
    P: Policy<K>,
{
    /// Builds the shards, calling `make_policy` once per shard.
    ///
    /// When bounded, `num_shards` is lowered to the largest power of two not
    /// above `capacity` so that no shard ends up with zero capacity.
    pub fn new<F>(capacity: usize, num_shards: usize, mut make_policy: F) -> Self
    where
        F: FnMut() -> P,
    {
        assert!(num_shards.is_power_of_two(), "num_shards must be a power of two");
        let capacity = effective_capacity(capacity);
        let num_shards = if capacity == UNBOUNDED {
            num_shards
        } else {
            num_shards.min(prev_power_of_two(capacity))
        };

        let shards = (0..num_shards)
            .map(|i| Shard {
                store: Mutex::new(Store::new(
                    shard_capacity(capacity, num_shards, i),
                    make_policy(),
                )),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        ShardedStore {
            shards,
            shard_mask: num_shards - 1,
            build_hasher: RandomState::new(),
            capacity,
        }
    }

    #[inline]
    fn shard_index(&self, key: &K) -> usize {
        let h = self.build_hasher.hash_one(key);
        // Use the high bits (better avalanche from ahash).
        ((h >> 32) as usize) & self.shard_mask
    }

    #[inline]
    fn shard(&self, key: &K) -> &Shard<K, V, P> {
        &self.shards[self.shard_index(key)]
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    pub fn put(&self, key: K, value: V) {
        self.shard(&key).store.lock().put(key, value);
    }

    pub fn get(&self, key: &K) -> Result<Arc<V>> {
        self.shard(key).store.lock().get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.shard(key).store.lock().contains(key)
    }

    pub fn remove(&self, key: &K) -> bool {
        self.shard(key).store.lock().remove(key)
    }

    /// Returns the total number of entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.store.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.store.lock().is_empty())
    }

    /// Clears every shard in turn. Returns the number of entries dropped.
    pub fn clear(&self) -> usize {
        self.shards.iter().map(|s| s.store.lock().clear()).sum()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Returns a reference to the raw shard slice.
    #[cfg(test)]
    pub(crate) fn shards(&self) -> &[Shard<K, V, P>] {
        &self.shards
    }
}

/// Capacity of shard `index` when `capacity` is split over `num_shards`.
///
/// The remainder goes to the lowest-indexed shards, so the sum is exact.
fn shard_capacity(capacity: usize, num_shards: usize, index: usize) -> usize {
    if capacity == UNBOUNDED {
        return UNBOUNDED;
    }
    let base = capacity / num_shards;
    let extra = usize::from(index < capacity % num_shards);
    base + extra
}
