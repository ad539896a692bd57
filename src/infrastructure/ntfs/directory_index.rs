//! Directory enumeration: walks `$INDEX_ROOT`, `$INDEX_ALLOCATION`, and any
//! `$ATTRIBUTE_LIST` continuations of a directory record to produce its
//! full child set.

use std::collections::{BTreeMap, HashSet};

use crate::domain::entities::{attribute_type, AttributeListValue, AttributeValue, MftRecord};
use crate::domain::repositories::BlockReader;
use crate::domain::services::EngineError;

use super::{attribute_codec, index_entry_codec, mft_locator::MftLocator, record_codec, run_reader};

const MAX_ATTRIBUTE_LIST_DEPTH: usize = 32;

/// Enumerates the (child record number, name) pairs of a directory record,
/// preferring the Win32 long name when a short DOS name collides with it.
pub fn enumerate<R: BlockReader + ?Sized>(
    reader: &R,
    locator: &MftLocator,
    record: &MftRecord,
    bytes_per_cluster: u64,
    index_record_size: u32,
    sector_size: usize,
) -> Result<Vec<(u64, String)>, EngineError> {
    let mut raw_entries = Vec::new();
    let mut visited = HashSet::new();
    visited.insert(record.record_number);

    collect_from_record(
        reader,
        locator,
        record,
        bytes_per_cluster,
        index_record_size,
        sector_size,
        &mut visited,
        0,
        &mut raw_entries,
    )?;

    // Dedup by child record number, preferring the non-DOS (long) name.
    let mut best: BTreeMap<u64, (String, bool)> = BTreeMap::new();
    for (child, name, is_dos) in raw_entries {
        best.entry(child)
            .and_modify(|existing| {
                if existing.1 && !is_dos {
                    *existing = (name.clone(), is_dos);
                }
            })
            .or_insert((name, is_dos));
    }

    Ok(best.into_iter().map(|(k, (name, _))| (k, name)).collect())
}

#[allow(clippy::too_many_arguments)]
fn collect_from_record<R: BlockReader + ?Sized>(
    reader: &R,
    locator: &MftLocator,
    record: &MftRecord,
    bytes_per_cluster: u64,
    index_record_size: u32,
    sector_size: usize,
    visited: &mut HashSet<u64>,
    depth: usize,
    out: &mut Vec<(u64, String, bool)>,
) -> Result<(), EngineError> {
    if depth > MAX_ATTRIBUTE_LIST_DEPTH {
        return Ok(());
    }

    for attribute in &record.attributes {
        match &attribute.value {
            AttributeValue::IndexRoot { entries } => {
                let decoded =
                    index_entry_codec::decode_index_root_entries(entries, record.record_number)?;
                out.extend(
                    decoded
                        .into_iter()
                        .map(|e| (e.child_record_number, e.name, e.is_dos_name)),
                );
            }
            AttributeValue::IndexAllocation { runs, data_size } => {
                let block_count = data_size / index_record_size as u64;
                for i in 0..block_count {
                    let block = run_reader::read_range(
                        reader,
                        runs,
                        bytes_per_cluster,
                        i * index_record_size as u64,
                        index_record_size as usize,
                    )?;
                    let decoded = decode_indx_block(&block, record.record_number, sector_size)?;
                    out.extend(
                        decoded
                            .into_iter()
                            .map(|e| (e.child_record_number, e.name, e.is_dos_name)),
                    );
                }
            }
            AttributeValue::AttributeList(list) => {
                let entries = match list {
                    AttributeListValue::Resident(entries) => entries.clone(),
                    AttributeListValue::NonResident { runs, data_size } => {
                        let bytes = run_reader::read_range(
                            reader,
                            runs,
                            bytes_per_cluster,
                            0,
                            *data_size as usize,
                        )?;
                        attribute_codec::decode_attribute_list_entries(&bytes)
                    }
                };

                for entry in entries {
                    if entry.attribute_type != attribute_type::INDEX_ROOT
                        && entry.attribute_type != attribute_type::INDEX_ALLOCATION
                    {
                        continue;
                    }
                    if !visited.insert(entry.base_file_reference) {
                        continue; // cycle guard
                    }
                    let raw = locator.locate(reader, entry.base_file_reference)?;
                    let other = record_codec::decode(&raw, entry.base_file_reference, sector_size)?;
                    collect_from_record(
                        reader,
                        locator,
                        &other,
                        bytes_per_cluster,
                        index_record_size,
                        sector_size,
                        visited,
                        depth + 1,
                        out,
                    )?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn decode_indx_block(
    block: &[u8],
    record_number: u64,
    sector_size: usize,
) -> Result<Vec<crate::domain::entities::IndexEntry>, EngineError> {
    if block.len() < 8 || &block[0..4] != b"INDX" {
        return Err(EngineError::CorruptRecord {
            record_number,
            reason: "missing INDX magic".to_string(),
        });
    }
    let update_seq_offset = u16::from_le_bytes(block[4..6].try_into().unwrap());
    let update_seq_sz = u16::from_le_bytes(block[6..8].try_into().unwrap());

    let mut block = block.to_vec();
    record_codec::apply_fixup(
        &mut block,
        update_seq_offset,
        update_seq_sz,
        sector_size,
        record_number,
    )?;

    index_entry_codec::decode_indx_block_entries(&block, record_number)
}
