//! Memoizing cache for content-service calls.
//!
//! [`CachedService`] wraps any [`mfnf_shared::ContentService`] and keys each
//! call by a [`StableHash`] of its function name and arguments. Results live
//! in a [`CacheStore`]: [`MemoryStore`] for a single run, [`SqliteStore`]
//! (libSQL) across runs.

mod cached;
mod hash;
mod migrations;
mod sqlite;
mod store;

pub use cached::{CacheStats, CachedService};
pub use hash::{StableHash, call_key, hash_sequence};
pub use sqlite::SqliteStore;
pub use store::{CacheStore, MemoryStore};
