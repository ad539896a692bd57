//! Reads an arbitrary byte range out of a non-resident attribute's data
//! runs, crossing run boundaries and zero-filling sparse runs as needed.
//!
//! Shared by [`super::mft_locator`] (an MFT record may straddle the
//! boundary between two of `$MFT`'s own data runs) and
//! [`super::extractor`] (a file's `$DATA` is read run by run).

use crate::domain::entities::DataRun;
use crate::domain::repositories::BlockReader;
use crate::domain::services::EngineError;

/// Reads exactly `length` bytes of the logical stream described by `runs`,
/// starting at logical byte offset `start`.
pub fn read_range<R: BlockReader + ?Sized>(
    reader: &R,
    runs: &[DataRun],
    bytes_per_cluster: u64,
    start: u64,
    length: usize,
) -> Result<Vec<u8>, EngineError> {
    let mut out = vec![0u8; length];
    let end = start + length as u64;

    let mut cursor = 0u64; // logical byte offset of the start of the current run
    for run in runs {
        let run_bytes = run.cluster_length * bytes_per_cluster;
        let run_start = cursor;
        let run_end = cursor + run_bytes;
        cursor = run_end;

        if run_end <= start || run_start >= end {
            continue;
        }

        let overlap_start = start.max(run_start);
        let overlap_end = end.min(run_end);
        let overlap_len = (overlap_end - overlap_start) as usize;
        let out_offset = (overlap_start - start) as usize;

        if run.is_sparse() {
            // out is already zeroed.
        } else {
            let physical_offset =
                run.cluster_offset * bytes_per_cluster + (overlap_start - run_start);
            let bytes = reader.read_at(physical_offset, overlap_len)?;
            out[out_offset..out_offset + overlap_len].copy_from_slice(&bytes);
        }
    }

    Ok(out)
}
