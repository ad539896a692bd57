//! Copy options DTO

use std::path::PathBuf;

/// Options controlling one `copy` invocation, built by the CLI layer from
/// parsed `clap` arguments.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Directory under which extracted files are placed (mandatory).
    pub output_root: PathBuf,
    /// Directory containing the persistent cache file. Absent disables
    /// on-disk caching (an in-memory-only cache is still used for the
    /// duration of the session).
    pub cache_dir: Option<PathBuf>,
    /// Start from an empty cache and skip persisting it at the end.
    pub ignore_cache: bool,
    /// Recurse into child directories when the source path names one.
    pub recursive: bool,
    /// Overwrite files that already exist at the destination.
    pub overwrite: bool,
}

impl CopyOptions {
    pub fn new(output_root: PathBuf) -> Self {
        Self {
            output_root,
            cache_dir: None,
            ignore_cache: false,
            recursive: false,
            overwrite: false,
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub fn with_ignore_cache(mut self, ignore_cache: bool) -> Self {
        self.ignore_cache = ignore_cache;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}
