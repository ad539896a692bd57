//! Locates and reads individual MFT records.
//!
//! `$MFT` is itself a file: its data runs describe where the record table
//! lives on disk. Record N's bytes are the logical range
//! `[N * record_size, (N + 1) * record_size)` of that stream; because a
//! run's length is cluster-granular while records are byte-granular, a
//! record can straddle the boundary between two runs. [`run_reader`]
//! already handles arbitrary ranges spanning multiple runs, so no special
//! case is needed here beyond picking the right logical range.

use crate::domain::entities::DataRun;
use crate::domain::repositories::BlockReader;
use crate::domain::services::EngineError;

use super::run_reader;

pub struct MftLocator {
    runs: Vec<DataRun>,
    bytes_per_cluster: u64,
    mft_record_size: u32,
}

impl MftLocator {
    pub fn new(runs: Vec<DataRun>, bytes_per_cluster: u64, mft_record_size: u32) -> Self {
        Self {
            runs,
            bytes_per_cluster,
            mft_record_size,
        }
    }

    /// Reads the raw (not yet fixed-up) bytes of the given MFT record.
    pub fn locate<R: BlockReader + ?Sized>(&self, reader: &R, record_number: u64) -> Result<Vec<u8>, EngineError> {
        let start = record_number * self.mft_record_size as u64;
        let stream_len: u64 = self
            .runs
            .iter()
            .map(|r| r.cluster_length * self.bytes_per_cluster)
            .sum();
        if start + self.mft_record_size as u64 > stream_len {
            return Err(EngineError::NotFound(format!(
                "MFT record {} is past the end of the MFT",
                record_number
            )));
        }

        run_reader::read_range(
            reader,
            &self.runs,
            self.bytes_per_cluster,
            start,
            self.mft_record_size as usize,
        )
    }
}
