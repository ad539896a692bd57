//! Block reader implementations

mod linux_block_device;
mod mmap_block_device;
#[cfg(windows)]
mod windows_block_device;

pub use linux_block_device::LinuxBlockDevice;
pub use mmap_block_device::MmapBlockDevice;
#[cfg(windows)]
pub use windows_block_device::WindowsBlockDevice;
