pub mod none;

pub use none::NoTrackingPolicy;

use std::hash::Hash;

/// Replacement strategy consulted by the cache when it runs out of room.
///
/// A policy tracks keys only, never values. The cache pairs every store
/// mutation with exactly one notification, so the set of keys a policy has
/// been told about always equals the set of keys held by the cache.
///
/// All methods are called while the owning cache (or shard) lock is held.
/// Implementors only need to be `Send`; `Sync` is not required because the
/// policy is never reached except through that lock. A policy must never
/// call back into the cache that owns it: the lock is not reentrant and the
/// call would deadlock.
pub trait Policy<K: Hash + Eq>: Send {
    /// Called when a brand-new key has been added to the cache.
    fn insert(&mut self, key: K);

    /// Called when an existing key is read or overwritten.
    ///
    /// `key` is guaranteed to be tracked.
    fn touch(&mut self, key: &K);

    /// Called when a key leaves the cache (explicit removal, clear or
    /// eviction).
    ///
    /// Must tolerate keys whose tracking state was never touched.
    fn erase(&mut self, key: &K);

    /// Names the key that should be evicted next.
    ///
    /// Only asked for when the cache holds at least one entry. The returned
    /// key **must** be currently tracked: the cache trusts this answer and
    /// panics if it names a key it does not hold, or if `None` is returned
    /// while keys are tracked.
    fn replacement_candidate(&self) -> Option<K>;
}
