use std::hash::Hash;
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::debug;

use crate::builder::CacheBuilder;
use crate::error::Result;
use crate::policy::{NoTrackingPolicy, Policy};
use crate::store::Store;

// ---------------------------------------------------------------------------
// Cache handle
// ---------------------------------------------------------------------------

/// A bounded, thread-safe cache whose evictions are chosen by a [`Policy`].
///
/// Every operation runs under a single exclusive lock, so no caller ever
/// sees the store and the policy disagree. Cloning the handle is cheap and
/// all clones share the same entries; the entries are released (and reported
/// to the policy) when the last handle is dropped.
///
/// # Example
/// ```
/// use policache::Cache;
///
/// let cache: Cache<String, String> = Cache::new(100);
/// cache.put("hello".to_string(), "world".to_string());
/// assert_eq!(*cache.get(&"hello".to_string()).unwrap(), "world");
/// ```
pub struct Cache<K, V, P = NoTrackingPolicy<K>>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    inner: Arc<Mutex<Store<K, V, P>>>,
    /// Normalized; fixed for the lifetime of the cache.
    capacity: usize,
}

impl<K, V, P> Clone for Cache<K, V, P>
where
    K: Hash + Eq,
    P: Policy<K>,
{
    fn clone(&self) -> Self {
        Cache {
            inner: Arc::clone(&self.inner),
            capacity: self.capacity,
        }
    }
}

impl<K, V, P> Cache<K, V, P>
where
    K: Hash + Eq + Clone,
    P: Policy<K> + Default,
{
    /// Creates a cache holding at most `capacity` entries (`0` = unbounded).
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, P::default())
    }

    /// Returns a [`CacheBuilder`] for constructing a new cache.
    pub fn builder(capacity: usize) -> CacheBuilder<K, V, P> {
        CacheBuilder::new(capacity)
    }
}

impl<K, V, P> Cache<K, V, P>
where
    K: Hash + Eq + Clone,
    P: Policy<K>,
{
    /// Creates a cache that uses an already constructed `policy`.
    pub fn with_policy(capacity: usize, policy: P) -> Self {
        let store = Store::new(capacity, policy);
        let capacity = store.capacity();
        debug!(capacity, "created cache");
        Cache {
            inner: Arc::new(Mutex::new(store)),
            capacity,
        }
    }

    /// Inserts `value` for `key`, replacing any previous value.
    ///
    /// Replacing counts as an access. Adding a new key to a full cache
    /// silently evicts the entry named by the policy.
    ///
    /// # Panics
    ///
    /// Panics if the policy names an eviction candidate that is not cached.
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Returns the value for `key`, or [`CacheError::NotFound`].
    ///
    /// A hit is reported to the policy as an access.
    ///
    /// [`CacheError::NotFound`]: crate::CacheError::NotFound
    pub fn get(&self, key: &K) -> Result<Arc<V>> {
        self.inner.lock().get(key)
    }

    /// Returns `true` if `key` is present. Does not count as an access.
    pub fn cached(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Current number of entries.
    pub fn size(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum number of entries; `usize::MAX` when constructed unbounded.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes `key`. Returns `false` if it was not present.
    pub fn remove(&self, key: &K) -> bool {
        self.inner.lock().remove(key)
    }

    /// Removes every entry, reporting each key to the policy.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
