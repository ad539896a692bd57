//! Windows block reader implementation
//!
//! Reads a live volume through its raw device handle (e.g. `\\.\C:`)
//! without going through the file system driver. Gated to Windows builds;
//! Linux/mmap readers cover everything else.

#![cfg(windows)]

use crate::domain::repositories::{BlockReader, BlockReaderError, DeviceInfo};
use std::ffi::OsStr;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::ptr;
use std::sync::Mutex;

use windows_sys::Win32::Foundation::{CloseHandle, GENERIC_READ, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    CreateFileW, GetFileSizeEx, ReadFile, SetFilePointerEx, FILE_BEGIN, FILE_SHARE_READ,
    FILE_SHARE_WRITE, OPEN_EXISTING,
};

struct RawHandle(HANDLE);

// The handle is only ever used behind a `Mutex`, one operation at a time.
unsafe impl Send for RawHandle {}

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

/// Block reader backed by a raw Windows device handle, opened with
/// `FILE_SHARE_READ | FILE_SHARE_WRITE` so a mounted volume stays usable
/// by the OS while this reader pulls bytes out from under it.
pub struct WindowsBlockDevice {
    handle: Mutex<RawHandle>,
    path: String,
    size: u64,
}

impl WindowsBlockDevice {
    fn query_size(handle: HANDLE) -> Result<u64, BlockReaderError> {
        let mut size: i64 = 0;
        let ok = unsafe { GetFileSizeEx(handle, &mut size) };
        if ok == 0 {
            return Err(BlockReaderError::IoError(io::Error::last_os_error()));
        }
        Ok(size as u64)
    }
}

impl BlockReader for WindowsBlockDevice {
    fn open(path: &str) -> Result<Self, BlockReaderError> {
        let wide = to_wide(path);
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                0,
                ptr::null_mut(),
            )
        };

        if handle == INVALID_HANDLE_VALUE {
            let err = io::Error::last_os_error();
            return Err(if err.kind() == io::ErrorKind::PermissionDenied {
                BlockReaderError::PermissionDenied(format!("{} - run elevated", path))
            } else {
                BlockReaderError::IoError(err)
            });
        }

        let size = Self::query_size(handle)?;
        if size == 0 {
            unsafe { CloseHandle(handle) };
            return Err(BlockReaderError::DeviceNotFound(path.to_string()));
        }

        Ok(Self {
            handle: Mutex::new(RawHandle(handle)),
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

        let guard = self
            .handle
            .lock()
            .map_err(|_| BlockReaderError::Other("Failed to acquire lock".to_string()))?;
        let handle = guard.0;

        let ok = unsafe {
            SetFilePointerEx(handle, offset as i64, ptr::null_mut(), FILE_BEGIN as u32)
        };
        if ok == 0 {
            return Err(BlockReaderError::IoError(io::Error::last_os_error()));
        }

        let mut buffer = vec![0u8; length];
        let mut read: u32 = 0;
        let ok = unsafe {
            ReadFile(
                handle,
                buffer.as_mut_ptr(),
                length as u32,
                &mut read,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(BlockReaderError::IoError(io::Error::last_os_error()));
        }
        if (read as usize) < length {
            return Err(BlockReaderError::ReadShort {
                offset,
                expected: length,
                got: read as usize,
            });
        }

        Ok(buffer)
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for WindowsBlockDevice {
    fn drop(&mut self) {
        if let Ok(guard) = self.handle.lock() {
            unsafe { CloseHandle(guard.0) };
        }
    }
}

unsafe impl Sync for WindowsBlockDevice {}
