//! Cache store trait
//!
//! Defines the interface for loading and persisting the path→record cache.
//! Keeping this behind a trait lets the engine be tested against an
//! in-memory store while the CLI uses a file-backed, flock-guarded one.

use crate::domain::entities::CacheTree;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheStoreError {
    #[error("cache file is corrupt or an unsupported version: {0}")]
    BadCache(String),

    #[error("cache is locked by another session")]
    Locked,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Loads and persists a [`CacheTree`].
///
/// Implementations must guard against concurrent sessions sharing the same
/// backing store: `lock` is called before `load` and held until the
/// matching `unlock`/drop, returning [`CacheStoreError::Locked`] if another
/// session already holds it.
pub trait CacheStore {
    /// Acquires an exclusive advisory lock on the backing store.
    fn lock(&mut self) -> Result<(), CacheStoreError>;

    /// Loads the persisted tree, or an empty one if none exists yet.
    fn load(&self) -> Result<CacheTree, CacheStoreError>;

    /// Persists the tree, replacing any prior contents atomically.
    fn save(&self, tree: &CacheTree) -> Result<(), CacheStoreError>;
}
