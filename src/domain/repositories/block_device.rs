//! Block reader trait
//!
//! Defines the interface for reading raw bytes from a volume or image.
//! This abstraction lets the NTFS engine stay platform-agnostic: the same
//! record/attribute decoding runs whether the bytes come from a Linux
//! raw device, an mmap'd image file, or a Windows `\\.\C:` handle.

use std::io;
use thiserror::Error;

/// Errors that can occur when reading from a block reader
#[derive(Error, Debug)]
pub enum BlockReaderError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid offset: {offset} exceeds device size {device_size}")]
    InvalidOffset { offset: u64, device_size: u64 },

    #[error("Read short at offset {offset}: expected {expected} bytes, got {got}")]
    ReadShort {
        offset: u64,
        expected: usize,
        got: usize,
    },

    #[error("Device error: {0}")]
    Other(String),
}

/// Information about the opened volume or image.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Path or device target used to open this reader.
    pub path: String,
    /// Total size in bytes.
    pub size: u64,
    /// Block size in bytes (typically 512 or 4096), used only for diagnostics;
    /// the engine derives its own cluster/sector sizes from the boot sector.
    pub block_size: u32,
}

/// Trait for byte-addressable, random-access reading of a volume or image.
///
/// Implementations are not required to be safe for concurrent use by
/// multiple threads issuing overlapping reads; a `Session` owns exactly one
/// reader for the lifetime of a copy operation.
///
/// # Example
///
/// ```ignore
/// let reader = LinuxBlockDevice::open("/dev/sda1")?;
/// let boot_sector = reader.read_at(0, 512)?;
/// ```
pub trait BlockReader: Send + Sync {
    /// Opens the device or image file for reading.
    fn open(path: &str) -> Result<Self, BlockReaderError>
    where
        Self: Sized;

    /// Returns information about the opened target.
    fn device_info(&self) -> Result<DeviceInfo, BlockReaderError>;

    /// Reads exactly `length` bytes starting at `offset`, or fails.
    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>, BlockReaderError>;

    /// Returns the path or device target this reader was opened against.
    fn path(&self) -> &str;

    /// Returns the total size in bytes.
    fn size(&self) -> u64;
}
