//! Persistent path→record cache.
//!
//! A small forest, one tree per drive letter, each node keyed by the
//! lowercased child name. Populated lazily by `PathResolver`/`DirectoryIndex`
//! as paths are walked, and persisted across sessions.

use std::collections::BTreeMap;

use super::mft_record::ROOT_DIRECTORY_RECORD;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNode {
    pub record_number: u64,
    pub children: BTreeMap<String, CacheNode>,
}

impl CacheNode {
    pub fn new_root() -> Self {
        Self {
            record_number: ROOT_DIRECTORY_RECORD,
            children: BTreeMap::new(),
        }
    }

    /// Inserts or overwrites a child, keyed by its lowercased name.
    pub fn insert_child(&mut self, name: &str, record_number: u64) -> &mut CacheNode {
        let key = name.to_lowercase();
        self.children.entry(key).or_insert_with(|| CacheNode {
            record_number,
            children: BTreeMap::new(),
        })
    }

    pub fn child(&self, name: &str) -> Option<&CacheNode> {
        self.children.get(&name.to_lowercase())
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut CacheNode> {
        self.children.get_mut(&name.to_lowercase())
    }
}

/// One forest of [`CacheNode`] roots, keyed by drive letter (`'C'`, `'D'`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheTree {
    pub drives: BTreeMap<char, CacheNode>,
}

impl CacheTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_for_drive(&mut self, drive: char) -> &mut CacheNode {
        self.drives
            .entry(drive)
            .or_insert_with(CacheNode::new_root)
    }

    pub fn root_for_drive_ref(&self, drive: char) -> Option<&CacheNode> {
        self.drives.get(&drive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_is_case_insensitive() {
        let mut tree = CacheTree::new();
        let root = tree.root_for_drive('C');
        root.insert_child("Windows", 100);

        let root = tree.root_for_drive_ref('C').unwrap();
        assert_eq!(root.child("windows").unwrap().record_number, 100);
        assert_eq!(root.child("WINDOWS").unwrap().record_number, 100);
    }

    #[test]
    fn unknown_drive_has_no_root() {
        let tree = CacheTree::new();
        assert!(tree.root_for_drive_ref('Z').is_none());
    }
}
