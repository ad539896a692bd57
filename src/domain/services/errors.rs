//! Engine-wide error taxonomy.
//!
//! Every NTFS-decoding component surfaces one of these variants; the
//! application layer decides, per variant, whether to abort the session
//! or log-and-continue (see [`EngineError::aborts_session`]).

use thiserror::Error;

use crate::domain::repositories::{BlockReaderError, CacheStoreError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("bad volume: {0}")]
    BadVolume(String),

    #[error("corrupt record {record_number}: {reason}")]
    CorruptRecord { record_number: u64, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("read short: {0}")]
    ReadShort(#[from] BlockReaderError),

    #[error("bad cache: {0}")]
    BadCache(String),

    #[error("cache is locked by another session")]
    CacheLocked,

    #[error("output I/O error: {0}")]
    OutputIo(#[from] std::io::Error),
}

impl From<CacheStoreError> for EngineError {
    fn from(err: CacheStoreError) -> Self {
        match err {
            CacheStoreError::BadCache(msg) => EngineError::BadCache(msg),
            CacheStoreError::Locked => EngineError::CacheLocked,
            CacheStoreError::IoError(e) => EngineError::OutputIo(e),
        }
    }
}

impl EngineError {
    /// `true` for errors that invalidate the whole session; `false` for
    /// per-file errors that should be logged and skipped so the rest of a
    /// wildcard/recursive copy can proceed.
    pub fn aborts_session(&self) -> bool {
        matches!(
            self,
            EngineError::BadVolume(_) | EngineError::BadCache(_) | EngineError::CacheLocked
        )
    }
}
