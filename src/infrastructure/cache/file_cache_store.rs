//! File-backed [`CacheStore`].
//!
//! The tree is dumped in a flat, pre-order binary layout (see module docs)
//! and written atomically via a temp-file-then-rename, the same pattern the
//! output writer uses for individual recovered files. A `flock`-style
//! advisory lock on the cache file itself keeps two sessions from stomping
//! on each other's cache.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rustix::fd::AsFd;
use rustix::fs::{flock, FlockOperation};

use crate::domain::entities::{CacheNode, CacheTree};
use crate::domain::repositories::{CacheStore, CacheStoreError};

const MAGIC: &[u8; 8] = b"NTFSCACH";
const VERSION: u32 = 1;

/// Cache persisted as a single file under a configured directory.
pub struct FileCacheStore {
    path: PathBuf,
    lock_file: Option<File>,
}

impl FileCacheStore {
    pub fn new(cache_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(cache_dir)?;
        Ok(Self {
            path: cache_dir.join("mft.cache"),
            lock_file: None,
        })
    }

    fn write_node(out: &mut Vec<u8>, name: &str, node: &CacheNode) -> io::Result<()> {
        let name_bytes = name.as_bytes();
        out.write_u16::<LittleEndian>(name_bytes.len() as u16)?;
        out.write_all(name_bytes)?;
        out.write_u64::<LittleEndian>(node.record_number)?;
        out.write_u32::<LittleEndian>(node.children.len() as u32)?;
        for (child_name, child) in &node.children {
            Self::write_node(out, child_name, child)?;
        }
        Ok(())
    }

    fn read_node(cursor: &mut Cursor<&[u8]>) -> Result<(String, CacheNode), CacheStoreError> {
        let name_len = cursor
            .read_u16::<LittleEndian>()
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;
        let mut name_bytes = vec![0u8; name_len as usize];
        cursor
            .read_exact(&mut name_bytes)
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;
        let name = String::from_utf8(name_bytes)
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;
        let record_number = cursor
            .read_u64::<LittleEndian>()
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;
        let child_count = cursor
            .read_u32::<LittleEndian>()
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;

        let mut children = BTreeMap::new();
        for _ in 0..child_count {
            let (child_name, child_node) = Self::read_node(cursor)?;
            children.insert(child_name, child_node);
        }

        Ok((
            name,
            CacheNode {
                record_number,
                children,
            },
        ))
    }
}

impl CacheStore for FileCacheStore {
    fn lock(&mut self) -> Result<(), CacheStoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        flock(file.as_fd(), FlockOperation::NonBlockingLockExclusive).map_err(|e| {
            if e == rustix::io::Errno::WOULDBLOCK || e == rustix::io::Errno::AGAIN {
                CacheStoreError::Locked
            } else {
                CacheStoreError::IoError(io::Error::from_raw_os_error(e.raw_os_error()))
            }
        })?;

        self.lock_file = Some(file);
        Ok(())
    }

    fn load(&self) -> Result<CacheTree, CacheStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CacheTree::new()),
            Err(e) => return Err(CacheStoreError::IoError(e)),
        };

        if bytes.is_empty() {
            return Ok(CacheTree::new());
        }

        let mut cursor = Cursor::new(bytes.as_slice());
        let mut magic = [0u8; 8];
        cursor
            .read_exact(&mut magic)
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;
        if &magic != MAGIC {
            return Err(CacheStoreError::BadCache("bad magic".to_string()));
        }

        let version = cursor
            .read_u32::<LittleEndian>()
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;
        if version != VERSION {
            return Err(CacheStoreError::BadCache(format!(
                "unsupported cache version {version}"
            )));
        }

        let drive_count = cursor
            .read_u32::<LittleEndian>()
            .map_err(|e| CacheStoreError::BadCache(e.to_string()))?;

        let mut tree = CacheTree::new();
        for _ in 0..drive_count {
            let drive_letter = cursor
                .read_u8()
                .map_err(|e| CacheStoreError::BadCache(e.to_string()))?
                as char;
            let (_root_name, root_node) = Self::read_node(&mut cursor)?;
            tree.drives.insert(drive_letter, root_node);
        }

        Ok(tree)
    }

    fn save(&self, tree: &CacheTree) -> Result<(), CacheStoreError> {
        let mut out = Vec::new();
        out.write_all(MAGIC)?;
        out.write_u32::<LittleEndian>(VERSION)?;
        out.write_u32::<LittleEndian>(tree.drives.len() as u32)?;

        for (drive_letter, root) in &tree.drives {
            out.write_u8(*drive_letter as u8)?;
            Self::write_node(&mut out, "", root)?;
        }

        let tmp_path = self.path.with_extension("cache.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&out)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl Drop for FileCacheStore {
    fn drop(&mut self) {
        if let Some(file) = &self.lock_file {
            let _ = flock(file.as_fd(), FlockOperation::Unlock);
        }
    }
}
