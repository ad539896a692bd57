//! Directory index entry decoding, shared by `$INDEX_ROOT` and INDX blocks.
//!
//! Both structures carry the same index header shape (a relative offset to
//! the first entry) followed by a flat list of entries, each embedding a
//! `$FILE_NAME`-shaped key and terminated by a zero-length, flagged entry.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::domain::entities::IndexEntry;
use crate::domain::services::EngineError;

const FLAG_HAS_SUBNODE: u16 = 0x0001;
const FLAG_IS_LAST: u16 = 0x0002;

/// Decodes the entry list out of a raw `$INDEX_ROOT` attribute value.
pub fn decode_index_root_entries(
    value: &[u8],
    record_number: u64,
) -> Result<Vec<IndexEntry>, EngineError> {
    if value.len() < 32 {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "$INDEX_ROOT too short".to_string(),
        });
    }
    let mut cursor = Cursor::new(&value[16..]);
    let first_entry_offset = cursor.read_u32::<LittleEndian>().map_err(io_err(record_number))?;
    let start = 16 + first_entry_offset as usize;
    walk_entries(value, start, record_number)
}

/// Decodes the entry list out of one fixed-up INDX block (the bytes
/// starting at the `INDX` magic).
pub fn decode_indx_block_entries(
    block: &[u8],
    record_number: u64,
) -> Result<Vec<IndexEntry>, EngineError> {
    if block.len() < 40 || &block[0..4] != b"INDX" {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "missing INDX magic".to_string(),
        });
    }
    let mut cursor = Cursor::new(&block[24..]);
    let first_entry_offset = cursor.read_u32::<LittleEndian>().map_err(io_err(record_number))?;
    let start = 24 + first_entry_offset as usize;
    walk_entries(block, start, record_number)
}

fn walk_entries(
    data: &[u8],
    mut pos: usize,
    record_number: u64,
) -> Result<Vec<IndexEntry>, EngineError> {
    let mut entries = Vec::new();

    while pos + 16 <= data.len() {
        let child_record_number =
            u64::from_le_bytes(data[pos..pos + 8].try_into().unwrap()) & 0x0000_FFFF_FFFF_FFFF;
        let entry_length = u16::from_le_bytes(data[pos + 8..pos + 10].try_into().unwrap()) as usize;
        let flags = u16::from_le_bytes(data[pos + 12..pos + 14].try_into().unwrap());

        if entry_length == 0 {
            break;
        }

        let is_last = flags & FLAG_IS_LAST != 0;
        if is_last {
            break;
        }
        let has_subnode = flags & FLAG_HAS_SUBNODE != 0;

        let key_start = pos + 16;
        if key_start + 66 > data.len() {
            return Err(EngineError::CorruptRecord {
                record_number,
                reason: "index entry key runs past buffer end".to_string(),
            });
        }
        let name_length = data[key_start + 64] as usize;
        let namespace = data[key_start + 65];
        let name_end = key_start + 66 + name_length * 2;
        if name_end > data.len() {
            return Err(EngineError::CorruptRecord {
                record_number,
                reason: "index entry name runs past buffer end".to_string(),
            });
        }
        let name = decode_utf16(&data[key_start + 66..name_end]);

        entries.push(IndexEntry {
            child_record_number,
            name,
            is_dos_name: namespace == 2,
            is_subnode: has_subnode,
        });

        pos += entry_length;
    }

    Ok(entries)
}

fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units).replace('\0', "")
}

fn io_err(record_number: u64) -> impl Fn(std::io::Error) -> EngineError {
    move |e| EngineError::CorruptRecord {
        record_number,
        reason: e.to_string(),
    }
}
