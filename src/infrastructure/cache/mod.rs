//! File-backed, flock-guarded persistence for the path→record cache.

mod file_cache_store;

pub use file_cache_store::FileCacheStore;
