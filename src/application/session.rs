//! The immutable context shared by every call made during one `copy`
//! invocation.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::entities::BootSector;
use crate::domain::repositories::BlockReader;
use crate::infrastructure::ntfs::{MftLocator, VolumeGeometry};

/// Bundles everything PathResolver/DirectoryIndex/Extractor need, built once
/// per `copy` invocation and never mutated thereafter. The cache tree is
/// deliberately *not* part of this value — it is the one piece of
/// session-scoped state that does mutate, and the application layer keeps it
/// as a separate collaborator so its file lock and atomic-persist behavior
/// stay outside this otherwise read-only struct.
pub struct Session {
    pub boot_sector: BootSector,
    pub block_reader: Arc<dyn BlockReader>,
    pub mft_locator: MftLocator,
    pub output_root: PathBuf,
    pub ignore_cache: bool,
}

impl Session {
    pub fn new(
        boot_sector: BootSector,
        block_reader: Arc<dyn BlockReader>,
        mft_locator: MftLocator,
        output_root: PathBuf,
        ignore_cache: bool,
    ) -> Self {
        Self {
            boot_sector,
            block_reader,
            mft_locator,
            output_root,
            ignore_cache,
        }
    }

    pub fn geometry(&self) -> VolumeGeometry {
        VolumeGeometry {
            bytes_per_cluster: self.boot_sector.bytes_per_cluster() as u64,
            index_record_size: self.boot_sector.index_record_size(),
            sector_size: self.boot_sector.bytes_per_sector as usize,
        }
    }
}
