//! Linux block reader implementation
//!
//! Provides raw read access to block devices on Linux systems.
//! Supports both actual devices (/dev/sdX) and image files.

use crate::domain::repositories::{BlockReader, BlockReaderError, DeviceInfo};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

/// Linux block reader implementation.
///
/// Provides read access to block devices and disk images on Linux using
/// standard file I/O for broad compatibility.
///
/// # Example
///
/// ```ignore
/// let reader = LinuxBlockDevice::open("/dev/sda1")?;
/// let data = reader.read_at(0, 512)?;
/// ```
pub struct LinuxBlockDevice {
    file: Mutex<File>,
    path: String,
    size: u64,
}

impl LinuxBlockDevice {
    /// Gets the device/file size.
    fn get_size(file: &File, path: &Path) -> Result<u64, BlockReaderError> {
        let metadata = file.metadata().map_err(BlockReaderError::IoError)?;

        if metadata.is_file() {
            Ok(metadata.len())
        } else {
            // For block devices, seek to the end; real implementations would
            // prefer BLKGETSIZE64 via ioctl.
            let mut f = file.try_clone().map_err(BlockReaderError::IoError)?;
            let size = f.seek(SeekFrom::End(0)).map_err(BlockReaderError::IoError)?;
            f.seek(SeekFrom::Start(0))
                .map_err(BlockReaderError::IoError)?;

            if size == 0 {
                Err(BlockReaderError::Other(format!(
                    "Could not determine size of {}",
                    path.display()
                )))
            } else {
                Ok(size)
            }
        }
    }
}

impl BlockReader for LinuxBlockDevice {
    fn open(path: &str) -> Result<Self, BlockReaderError> {
        let path_obj = Path::new(path);

        if !path_obj.exists() {
            return Err(BlockReaderError::DeviceNotFound(path.to_string()));
        }

        let file = OpenOptions::new().read(true).open(path_obj).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                BlockReaderError::PermissionDenied(format!("{} - try running with sudo", path))
            } else {
                BlockReaderError::IoError(e)
            }
        })?;

        let size = Self::get_size(&file, path_obj)?;

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_string(),
            size,
        })
    }

    fn device_info(&self) -> Result<DeviceInfo, BlockReaderError> {
        Ok(DeviceInfo {
            path: self.path.clone(),
            size: self.size,
            block_size: 512,
        })
    }

    fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>, BlockReaderError> {
        if offset >= self.size {
            return Err(BlockReaderError::InvalidOffset {
                offset,
                device_size: self.size,
            });
        }

        let available = (self.size - offset) as usize;
        if available < length {
            return Err(BlockReaderError::ReadShort {
                offset,
                expected: length,
                got: available,
            });
        }

        let mut file = self
            .file
            .lock()
            .map_err(|_| BlockReaderError::Other("Failed to acquire lock".to_string()))?;

        file.seek(SeekFrom::Start(offset))
            .map_err(BlockReaderError::IoError)?;

        let mut buffer = vec![0u8; length];
        file.read_exact(&mut buffer).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                BlockReaderError::ReadShort {
                    offset,
                    expected: length,
                    got: 0,
                }
            } else {
                BlockReaderError::IoError(e)
            }
        })?;

        Ok(buffer)
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn size(&self) -> u64 {
        self.size
    }
}

// Ensure LinuxBlockDevice is Send + Sync as required by the trait
unsafe impl Send for LinuxBlockDevice {}
unsafe impl Sync for LinuxBlockDevice {}
