//! MFT record decoding: fixup (update sequence) repair and attribute
//! iteration.
//!
//! Every multi-sector NTFS structure (MFT records, INDX blocks) is
//! protected the same way: the last two bytes of each sector are
//! overwritten with a signature word, and the true trailing bytes are
//! saved in an update sequence array at the start of the structure. This
//! module implements that repair once and shares it with INDX decoding.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Seek, SeekFrom};

use crate::domain::entities::{
    attribute_type, MftRecord, RecordFlags, MFT_RECORD_MAGIC,
};
use crate::domain::services::EngineError;

use super::attribute_codec;

struct RecordHeader {
    update_seq_offset: u16,
    update_seq_sz: u16,
    sequence_number: u16,
    flags: RecordFlags,
    first_attribute_offset: u16,
    used_size: u32,
    base_file_reference: u64,
}

fn read_header(data: &[u8]) -> Result<RecordHeader, EngineError> {
    if data.len() < 48 || &data[0..4] != MFT_RECORD_MAGIC {
        return Err(EngineError::CorruptRecord {
            record_number: 0,
            reason: "missing FILE magic".to_string(),
        });
    }

    let mut cursor = Cursor::new(data);
    cursor.set_position(4);
    let update_seq_offset = cursor.read_u16::<LittleEndian>().map_err(io_err)?;
    let update_seq_sz = cursor.read_u16::<LittleEndian>().map_err(io_err)?;

    cursor.set_position(16);
    let sequence_number = cursor.read_u16::<LittleEndian>().map_err(io_err)?;
    cursor.set_position(20);
    let first_attribute_offset = cursor.read_u16::<LittleEndian>().map_err(io_err)?;
    let flags = cursor.read_u16::<LittleEndian>().map_err(io_err)?;
    let used_size = cursor.read_u32::<LittleEndian>().map_err(io_err)?;
    cursor.seek(SeekFrom::Current(4)).map_err(io_err)?; // allocated_size
    let base_file_reference = cursor.read_u64::<LittleEndian>().map_err(io_err)?;

    Ok(RecordHeader {
        update_seq_offset,
        update_seq_sz,
        sequence_number,
        flags: RecordFlags::from_bits_truncate(flags),
        first_attribute_offset,
        used_size,
        base_file_reference,
    })
}

fn io_err(e: std::io::Error) -> EngineError {
    EngineError::CorruptRecord {
        record_number: 0,
        reason: e.to_string(),
    }
}

/// Applies the update-sequence fixup to a buffer in place, repairing the
/// last two bytes of each `sector_size`-byte sector.
pub fn apply_fixup(
    data: &mut [u8],
    update_seq_offset: u16,
    update_seq_sz: u16,
    sector_size: usize,
    record_number: u64,
) -> Result<(), EngineError> {
    if update_seq_sz == 0 {
        return Ok(());
    }

    let usa_start = update_seq_offset as usize;
    let entry_count = update_seq_sz as usize;
    if usa_start + entry_count * 2 > data.len() {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "update sequence array runs past record end".to_string(),
        });
    }

    let signature = u16::from_le_bytes([data[usa_start], data[usa_start + 1]]);
    let originals: Vec<u16> = (1..entry_count)
        .map(|i| {
            let off = usa_start + i * 2;
            u16::from_le_bytes([data[off], data[off + 1]])
        })
        .collect();

    for (sector_index, original) in originals.iter().enumerate() {
        let sector_end = (sector_index + 1) * sector_size;
        if sector_end > data.len() {
            break;
        }
        let check_off = sector_end - 2;
        let current = u16::from_le_bytes([data[check_off], data[check_off + 1]]);
        if current != signature {
            return Err(EngineError::CorruptRecord {
                record_number,
                reason: format!("fixup signature mismatch in sector {}", sector_index),
            });
        }
        data[check_off..check_off + 2].copy_from_slice(&original.to_le_bytes());
    }

    Ok(())
}

/// Decodes a raw MFT record buffer (already fixed up) into an [`MftRecord`].
pub fn decode(
    data: &[u8],
    record_number: u64,
    sector_size: usize,
) -> Result<MftRecord, EngineError> {
    let mut buffer = data.to_vec();
    let header = read_header(&buffer).map_err(|e| with_record_number(e, record_number))?;

    apply_fixup(
        &mut buffer,
        header.update_seq_offset,
        header.update_seq_sz,
        sector_size,
        record_number,
    )?;

    let used = header.used_size as usize;
    let limit = used.min(buffer.len());
    let mut attributes = Vec::new();
    let mut offset = header.first_attribute_offset as usize;

    while offset + 4 <= limit {
        let attr_type = u32::from_le_bytes(
            buffer[offset..offset + 4]
                .try_into()
                .expect("4-byte slice"),
        );
        if attr_type == attribute_type::END_MARKER {
            break;
        }

        let (attribute, consumed) =
            attribute_codec::decode_attribute(&buffer[offset..limit], record_number)?;
        if let Some(attribute) = attribute {
            attributes.push(attribute);
        }
        if consumed == 0 {
            break;
        }
        offset += consumed;
    }

    Ok(MftRecord {
        record_number,
        sequence_number: header.sequence_number,
        flags: header.flags,
        base_file_reference: header.base_file_reference & 0x0000_FFFF_FFFF_FFFF,
        attributes,
    })
}

fn with_record_number(err: EngineError, record_number: u64) -> EngineError {
    match err {
        EngineError::CorruptRecord { reason, .. } => EngineError::CorruptRecord {
            record_number,
            reason,
        },
        other => other,
    }
}
