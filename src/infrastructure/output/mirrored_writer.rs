//! Writes extracted files to the local filesystem, mirroring the source
//! volume's directory structure underneath a configured output root.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::domain::services::EngineError;

/// Outcome of writing a single file.
#[derive(Debug, Clone)]
pub struct WriteResult {
    pub output_path: PathBuf,
    pub bytes_written: u64,
}

/// Mirrors source paths into a destination tree, creating parent
/// directories as needed and refusing to clobber existing output unless
/// told to.
pub struct MirroredWriter {
    output_root: PathBuf,
    overwrite: bool,
    files_written: AtomicUsize,
    bytes_written: AtomicU64,
}

impl MirroredWriter {
    pub fn new(output_root: &Path, overwrite: bool) -> Result<Self, EngineError> {
        fs::create_dir_all(output_root)?;
        Ok(Self {
            output_root: output_root.to_path_buf(),
            overwrite,
            files_written: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        })
    }

    /// Maps a source path (e.g. `C:\Windows\System32\drivers\etc\hosts`)
    /// to its mirrored location under the output root.
    fn output_path(&self, source_components: &[String]) -> PathBuf {
        let mut path = self.output_root.clone();
        for component in source_components {
            path.push(component);
        }
        path
    }

    /// Opens the mirrored destination for `source_components`, creating
    /// parent directories, and returns a handle `write_contents` can
    /// stream bytes into via the supplied callback.
    pub fn write_with<F>(
        &self,
        source_components: &[String],
        write_contents: F,
    ) -> Result<WriteResult, EngineError>
    where
        F: FnOnce(&mut File) -> Result<u64, EngineError>,
    {
        let output_path = self.output_path(source_components);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if output_path.exists() && !self.overwrite {
            return Err(EngineError::OutputIo(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", output_path.display()),
            )));
        }

        let mut file = File::create(&output_path)?;
        let bytes_written = write_contents(&mut file)?;
        file.sync_all()?;

        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes_written, Ordering::Relaxed);

        Ok(WriteResult {
            output_path,
            bytes_written,
        })
    }

    pub fn files_written(&self) -> usize {
        self.files_written.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_nested_path_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MirroredWriter::new(dir.path(), false).unwrap();

        let components = vec!["Windows".to_string(), "hosts".to_string()];
        let result = writer
            .write_with(&components, |f| {
                f.write_all(b"127.0.0.1 localhost")?;
                Ok(20)
            })
            .unwrap();

        assert_eq!(result.bytes_written, 20);
        assert!(result.output_path.ends_with("Windows/hosts"));
        assert_eq!(writer.files_written(), 1);
        assert_eq!(writer.bytes_written(), 20);
    }

    #[test]
    fn refuses_to_overwrite_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MirroredWriter::new(dir.path(), false).unwrap();
        let components = vec!["hosts".to_string()];

        writer.write_with(&components, |_f| Ok(0)).unwrap();
        let second = writer.write_with(&components, |_f| Ok(0));
        assert!(second.is_err());
    }

    #[test]
    fn overwrite_flag_allows_clobbering() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MirroredWriter::new(dir.path(), true).unwrap();
        let components = vec!["hosts".to_string()];

        writer.write_with(&components, |_f| Ok(0)).unwrap();
        let second = writer.write_with(&components, |_f| Ok(0));
        assert!(second.is_ok());
    }
}
