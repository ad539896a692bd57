//! Streams a file record's `$DATA` to an output sink.
//!
//! Resident data is a straight inline copy. Non-resident data is read run
//! by run; the logical stream is truncated to `data_size`, and any
//! stretch between `initialized_size` and `data_size` is emitted as
//! explicit zero bytes rather than read from disk (NTFS tracks that tail
//! as a sparse hole regardless of whether individual runs are marked
//! sparse).

use std::io::Write;

use crate::domain::entities::{attribute_type, DataContent, MftRecord};
use crate::domain::repositories::BlockReader;
use crate::domain::services::EngineError;

use super::run_reader;

const ZERO_FILL_CHUNK: usize = 64 * 1024;

/// Writes the record's unnamed `$DATA` attribute to `output`, returning the
/// number of bytes written.
pub fn extract<R: BlockReader + ?Sized, W: Write>(
    reader: &R,
    record: &MftRecord,
    bytes_per_cluster: u64,
    output: &mut W,
) -> Result<u64, EngineError> {
    let data_attribute = record
        .attributes_of_type(attribute_type::DATA)
        .find(|a| a.is_unnamed())
        .ok_or_else(|| EngineError::NotFound(format!("record {} has no $DATA", record.record_number)))?;

    match &data_attribute.value {
        DataContent::Resident(bytes) => {
            output.write_all(bytes)?;
            Ok(bytes.len() as u64)
        }
        DataContent::NonResident {
            runs,
            data_size,
            initialized_size,
            ..
        } => {
            let initialized_size = (*initialized_size).min(*data_size);

            if initialized_size > 0 {
                let live = run_reader::read_range(reader, runs, bytes_per_cluster, 0, initialized_size as usize)?;
                output.write_all(&live)?;
            }

            let mut remaining = data_size - initialized_size;
            let zeros = vec![0u8; ZERO_FILL_CHUNK];
            while remaining > 0 {
                let chunk = remaining.min(ZERO_FILL_CHUNK as u64) as usize;
                output.write_all(&zeros[..chunk])?;
                remaining -= chunk as u64;
            }

            Ok(*data_size)
        }
    }
}
