//! ntfs-reach - live NTFS volume extraction
//!
//! Reads files straight off the raw block device or disk image underlying
//! an NTFS volume, bypassing the operating system's file API.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
