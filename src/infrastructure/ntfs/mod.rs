//! NTFS engine: boot sector parsing, MFT record/attribute decoding,
//! directory enumeration, path resolution, and data extraction.

mod attribute_codec;
mod boot_sector_codec;
mod data_run_codec;
mod directory_index;
mod extractor;
mod index_entry_codec;
mod mft_locator;
mod path_resolver;
mod record_codec;
mod run_reader;
mod volume;

pub use boot_sector_codec::decode as decode_boot_sector;
pub use directory_index::enumerate as enumerate_directory;
pub use extractor::extract;
pub use mft_locator::MftLocator;
pub use path_resolver::{expand_wildcards, glob_match, resolve_concrete, VolumeGeometry};
pub use record_codec::decode as decode_record;
pub use volume::Volume;
