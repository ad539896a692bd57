//! Copy outcome DTO

use std::time::Duration;

use crate::domain::services::EngineError;

/// One file that failed to copy, alongside the error that stopped it.
#[derive(Debug)]
pub struct CopyFailure {
    pub source_path: String,
    pub error: EngineError,
}

/// Summary of a single `copy` invocation: counts, errors, and duration.
#[derive(Debug, Default)]
pub struct CopyOutcome {
    pub files_copied: usize,
    pub bytes_written: u64,
    pub failures: Vec<CopyFailure>,
    pub duration: Duration,
}

impl CopyOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, bytes: u64) {
        self.files_copied += 1;
        self.bytes_written += bytes;
    }

    pub fn record_failure(&mut self, source_path: String, error: EngineError) {
        self.failures.push(CopyFailure { source_path, error });
    }

    pub fn files_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Copied {} file(s), {} bytes, in {:.2}s\n",
            self.files_copied,
            self.bytes_written,
            self.duration.as_secs_f64()
        );

        if !self.failures.is_empty() {
            summary.push_str(&format!("{} file(s) failed:\n", self.failures.len()));
            for failure in &self.failures {
                summary.push_str(&format!("  - {}: {}\n", failure.source_path, failure.error));
            }
        }

        summary
    }
}
