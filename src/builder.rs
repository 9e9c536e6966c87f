use std::hash::Hash;
use std::marker::PhantomData;
use crate::cache::Cache;
use crate::policy::{NoTrackingPolicy, Policy};
use crate::sharded::{ShardedCache, DEFAULT_SHARDS};

/// Builder for configuring and constructing a [`Cache`] or [`ShardedCache`].
///
/// Capacity is the only setting of a plain cache; `0` means unbounded. The
/// policy type is chosen through the third type parameter, or passed in as
/// an instance with [`build_with`](Self::build_with).
///
/// # Example
/// ```
/// use policache::CacheBuilder;
///
/// let cache: policache::Cache<String, String> = CacheBuilder::new(1_000).build();
/// assert_eq!(cache.capacity(), 1_000);
/// ```
pub struct CacheBuilder<K, V, P = NoTrackingPolicy<K>> {
    capacity: usize,
    num_shards: usize,
    _marker: PhantomData<fn() -> (K, V, P)>,
}

impl<K, V, P> CacheBuilder<K, V, P> {
    pub fn new(capacity: usize) -> Self {
        CacheBuilder {
            capacity,
            num_shards: DEFAULT_SHARDS,
            _marker: PhantomData,
        }
    }

    /// Set the number of shards used by
    /// [`build_sharded`](Self::build_sharded) (power of two; default: 16).
    pub fn num_shards(mut self, n: usize) -> Self {
        assert!(n > 0 && n.is_power_of_two(), "num_shards must be a power of two");
        self.num_shards = n;
        self
    }
}

impl<K, V, P> CacheBuilder<K, V, P>
where
    K: Hash + Eq + Clone,
    P: Policy<K>,
{
    /// Builds a cache around the given policy instance.
    pub fn build_with(self, policy: P) -> Cache<K, V, P> {
        Cache::with_policy(self.capacity, policy)
    }

    /// Builds a sharded cache, calling `make_policy` once per shard.
    pub fn build_sharded_with<F>(self, make_policy: F) -> ShardedCache<K, V, P>
    where
        F: FnMut() -> P,
    {
        ShardedCache::with_policy_factory(self.capacity, self.num_shards, make_policy)
    }
}

impl<K, V, P> CacheBuilder<K, V, P>
where
    K: Hash + Eq + Clone,
    P: Policy<K> + Default,
{
    pub fn build(self) -> Cache<K, V, P> {
        self.build_with(P::default())
    }

    pub fn build_sharded(self) -> ShardedCache<K, V, P> {
        self.build_sharded_with(P::default)
    }
}
