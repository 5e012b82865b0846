//! In-memory resource cache keyed by resource identity.
//!
//! This module provides the memoization table behind the loader:
//! - Keys are `(type, id, include)` with type aliases folded to one canonical label
//! - Entries never expire unless a capacity or TTL bound is configured
//! - Priming overwrites whatever was stored for the same key

mod key;
mod store;

pub use key::{ResourceKey, TypeAliases};
pub use store::{CacheConfig, CachedResource, ResourceCache};
