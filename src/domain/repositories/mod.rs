//! Repository traits (interfaces)
//!
//! These traits define the contracts for external dependencies.
//! They follow the Dependency Inversion Principle (DIP) from SOLID.

mod block_device;
mod cache_store;

pub use block_device::{BlockReader, BlockReaderError, DeviceInfo};
pub use cache_store::{CacheStore, CacheStoreError};
