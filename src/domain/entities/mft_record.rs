//! Decoded view of one MFT record.

use super::attribute::Attribute;

pub const MFT_RECORD_MAGIC: &[u8; 4] = b"FILE";

/// Well-known record number of the volume root directory.
pub const ROOT_DIRECTORY_RECORD: u64 = 5;

bitflags::bitflags! {
    /// MFT record header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RecordFlags: u16 {
        const IN_USE = 0x0001;
        const IS_DIRECTORY = 0x0002;
    }
}

/// A decoded MFT record: header fields plus its attribute list.
#[derive(Debug, Clone)]
pub struct MftRecord {
    pub record_number: u64,
    pub sequence_number: u16,
    pub flags: RecordFlags,
    pub base_file_reference: u64,
    pub attributes: Vec<Attribute>,
}

impl MftRecord {
    pub fn is_in_use(&self) -> bool {
        self.flags.contains(RecordFlags::IN_USE)
    }

    pub fn is_directory(&self) -> bool {
        self.flags.contains(RecordFlags::IS_DIRECTORY)
    }

    /// Attributes of the record, plus any carried in other base records
    /// this record points to via `$ATTRIBUTE_LIST`, are resolved elsewhere
    /// (`DirectoryIndex`/`Extractor`); this accessor only looks at what is
    /// physically present in this record's buffer.
    pub fn attributes_of_type(&self, attribute_type: u32) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(move |a| a.attribute_type == attribute_type)
    }
}
