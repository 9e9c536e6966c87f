//! A bounded, thread-safe key/value cache with pluggable replacement policies.
//!
//! [`Cache`] holds at most `capacity` entries behind a single lock. When a
//! new key would overflow it, the cache asks its [`Policy`] which key to
//! evict. Policies only track keys; see [`policy`] for the call protocol.

mod builder;
mod cache;
mod error;
mod sharded;
mod store;
pub mod policy;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::{CacheError, Result};
pub use policy::{NoTrackingPolicy, Policy};
pub use sharded::{ShardedCache, DEFAULT_SHARDS};
pub use store::UNBOUNDED;
