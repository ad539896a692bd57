//! Attribute header decoding.
//!
//! Decodes one attribute record (resident or non-resident) out of an MFT
//! record buffer, dispatching on its type code to produce a typed
//! [`AttributeValue`].

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::domain::entities::{
    attribute_type, Attribute, AttributeListEntry, AttributeListValue, AttributeValue, DataContent,
};
use crate::domain::services::EngineError;

use super::data_run_codec;

const COMMON_HEADER_LEN: usize = 16;

/// Decodes one attribute starting at the front of `data`. Returns the
/// decoded attribute (`None` for a type this engine does not surface, e.g.
/// `$OBJECT_ID`) and the number of bytes consumed, so the caller can
/// advance to the next attribute.
pub fn decode_attribute(
    data: &[u8],
    record_number: u64,
) -> Result<(Option<Attribute>, usize), EngineError> {
    if data.len() < COMMON_HEADER_LEN {
        return Ok((None, 0));
    }

    let mut cursor = Cursor::new(data);
    let attribute_type_code = cursor.read_u32::<LittleEndian>().map_err(io_err(record_number))?;
    let length = cursor.read_u32::<LittleEndian>().map_err(io_err(record_number))? as usize;
    let non_resident = cursor.read_u8().map_err(io_err(record_number))? != 0;
    let name_length = cursor.read_u8().map_err(io_err(record_number))? as usize;
    let name_offset = cursor.read_u16::<LittleEndian>().map_err(io_err(record_number))? as usize;
    let _flags = cursor.read_u16::<LittleEndian>().map_err(io_err(record_number))?;
    let _attribute_id = cursor.read_u16::<LittleEndian>().map_err(io_err(record_number))?;

    if length == 0 || length > data.len() {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "attribute length runs past record end".to_string(),
        });
    }

    let name = if name_length > 0 {
        decode_utf16(&data[name_offset..name_offset + name_length * 2])
    } else {
        String::new()
    };

    let value = if non_resident {
        decode_non_resident(data, record_number, attribute_type_code)?
    } else {
        decode_resident(data, record_number, attribute_type_code)?
    };

    let attribute = value.map(|value| Attribute {
        attribute_type: attribute_type_code,
        name,
        value,
    });

    Ok((attribute, length))
}

fn decode_resident(
    data: &[u8],
    record_number: u64,
    attribute_type_code: u32,
) -> Result<Option<AttributeValue>, EngineError> {
    let mut cursor = Cursor::new(&data[16..]);
    let value_length = cursor.read_u32::<LittleEndian>().map_err(io_err(record_number))? as usize;
    let value_offset = cursor.read_u16::<LittleEndian>().map_err(io_err(record_number))? as usize;

    if value_offset + value_length > data.len() {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "resident value runs past attribute end".to_string(),
        });
    }
    let value = &data[value_offset..value_offset + value_length];

    Ok(match attribute_type_code {
        attribute_type::STANDARD_INFORMATION => {
            if value.len() < 16 {
                return Err(EngineError::CorruptRecord {
                    record_number,
                    reason: "$STANDARD_INFORMATION too short".to_string(),
                });
            }
            Some(AttributeValue::StandardInformation {
                created: u64::from_le_bytes(value[0..8].try_into().unwrap()),
                modified: u64::from_le_bytes(value[8..16].try_into().unwrap()),
            })
        }
        attribute_type::FILE_NAME => Some(decode_file_name(value, record_number)?),
        attribute_type::DATA => Some(AttributeValue::Data(DataContent::Resident(value.to_vec()))),
        attribute_type::INDEX_ROOT => Some(AttributeValue::IndexRoot {
            entries: value.to_vec(),
        }),
        attribute_type::ATTRIBUTE_LIST => Some(AttributeValue::AttributeList(
            AttributeListValue::Resident(decode_attribute_list_entries(value)),
        )),
        _ => None,
    })
}

fn decode_non_resident(
    data: &[u8],
    record_number: u64,
    attribute_type_code: u32,
) -> Result<Option<AttributeValue>, EngineError> {
    let mut cursor = Cursor::new(&data[16..]);
    cursor.set_position(16); // skip first_vcn, last_vcn (u64 each)
    let data_run_offset = cursor.read_u16::<LittleEndian>().map_err(io_err(record_number))? as usize;
    cursor.set_position(24); // allocated_size starts at header offset 40 == 24 within this slice
    let allocated_size = cursor.read_u64::<LittleEndian>().map_err(io_err(record_number))?;
    let data_size = cursor.read_u64::<LittleEndian>().map_err(io_err(record_number))?;
    let initialized_size = cursor.read_u64::<LittleEndian>().map_err(io_err(record_number))?;

    if data_run_offset >= data.len() {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "data run offset runs past attribute end".to_string(),
        });
    }
    let runs = data_run_codec::decode(&data[data_run_offset..], record_number)?;

    Ok(match attribute_type_code {
        attribute_type::DATA => Some(AttributeValue::Data(DataContent::NonResident {
            runs,
            data_size,
            initialized_size,
            allocated_size,
        })),
        attribute_type::INDEX_ALLOCATION => {
            Some(AttributeValue::IndexAllocation { runs, data_size })
        }
        attribute_type::ATTRIBUTE_LIST => Some(AttributeValue::AttributeList(
            AttributeListValue::NonResident { runs, data_size },
        )),
        _ => None,
    })
}

fn decode_file_name(value: &[u8], record_number: u64) -> Result<AttributeValue, EngineError> {
    if value.len() < 66 {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "$FILE_NAME too short".to_string(),
        });
    }
    let parent_reference = u64::from_le_bytes(value[0..8].try_into().unwrap()) & 0x0000_FFFF_FFFF_FFFF;
    let name_length = value[64] as usize;
    let namespace = value[65];
    let name_bytes_end = 66 + name_length * 2;
    if name_bytes_end > value.len() {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "$FILE_NAME name runs past value end".to_string(),
        });
    }
    let name = decode_utf16(&value[66..name_bytes_end]);

    Ok(AttributeValue::FileName {
        parent_reference,
        name,
        is_dos_name: namespace == 2,
    })
}

/// Decodes a `$ATTRIBUTE_LIST` value (resident, or already-read
/// non-resident bytes) into its entries.
pub fn decode_attribute_list_entries(data: &[u8]) -> Vec<AttributeListEntry> {
    let mut entries = Vec::new();
    let mut pos = 0usize;

    while pos + 26 <= data.len() {
        let attribute_type = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap());
        let record_length = u16::from_le_bytes(data[pos + 4..pos + 6].try_into().unwrap()) as usize;
        if record_length == 0 {
            break;
        }
        let name_length = data[pos + 6] as usize;
        let name_offset = data[pos + 7] as usize;
        let base_file_reference =
            u64::from_le_bytes(data[pos + 8..pos + 16].try_into().unwrap()) & 0x0000_FFFF_FFFF_FFFF;
        let attribute_id = u16::from_le_bytes(data[pos + 24..pos + 26].try_into().unwrap());

        let name = if name_length > 0 && pos + name_offset + name_length * 2 <= data.len() {
            decode_utf16(&data[pos + name_offset..pos + name_offset + name_length * 2])
        } else {
            String::new()
        };

        entries.push(AttributeListEntry {
            attribute_type,
            base_file_reference,
            attribute_id,
            name,
        });

        pos += record_length;
    }

    entries
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

#[cfg(test)]
mod tests {
    use super::*;

    fn resident_header(attr_type: u32, name_length: u8, total_len: u32, value_len: u32, value_off: u16) -> Vec<u8> {
        let mut buf = vec![0u8; total_len as usize];
        buf[0..4].copy_from_slice(&attr_type.to_le_bytes());
        buf[4..8].copy_from_slice(&total_len.to_le_bytes());
        buf[8] = 0; // resident
        buf[9] = name_length;
        buf[16..20].copy_from_slice(&value_len.to_le_bytes());
        buf[20..22].copy_from_slice(&value_off.to_le_bytes());
        buf
    }

    #[test]
    fn decodes_resident_data_attribute() {
        let mut buf = resident_header(attribute_type::DATA, 0, 40, 5, 24);
        buf[24..29].copy_from_slice(b"hello");
        let (attr, consumed) = decode_attribute(&buf, 1).unwrap();
        let attr = attr.unwrap();
        assert_eq!(consumed, 40);
        match attr.value {
            AttributeValue::Data(DataContent::Resident(bytes)) => assert_eq!(bytes, b"hello"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_type_returns_none_but_advances() {
        let buf = resident_header(0x50, 0, 32, 0, 24);
        let (attr, consumed) = decode_attribute(&buf, 1).unwrap();
        assert!(attr.is_none());
        assert_eq!(consumed, 32);
    }
}
