//! Domain entities
//!
//! Core business objects that represent the fundamental concepts of the
//! NTFS extraction domain: on-disk structures decoded from a volume, and
//! the cache that remembers how to find them again.

mod attribute;
mod boot_sector;
mod cache_tree;
mod index_entry;
mod mft_record;

pub use attribute::{
    attribute_type, Attribute, AttributeListEntry, AttributeListValue, AttributeValue,
    DataContent, DataRun,
};
pub use boot_sector::BootSector;
pub use cache_tree::{CacheNode, CacheTree};
pub use index_entry::IndexEntry;
pub use mft_record::{MftRecord, RecordFlags, MFT_RECORD_MAGIC, ROOT_DIRECTORY_RECORD};
