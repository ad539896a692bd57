//! Resolves an absolute path (optionally containing `*` wildcards) to one
//! or more MFT record numbers, consulting and populating the persistent
//! [`CacheNode`] tree as it goes.

use crate::domain::entities::CacheNode;
use crate::domain::repositories::BlockReader;
use crate::domain::services::EngineError;

use super::{directory_index, mft_locator::MftLocator, record_codec};

/// Geometry the resolver needs to decode records and walk directories.
#[derive(Clone, Copy)]
pub struct VolumeGeometry {
    pub bytes_per_cluster: u64,
    pub index_record_size: u32,
    pub sector_size: usize,
}

/// Resolves a path with no wildcard components to its final record number,
/// loading and caching any directories along the way that are not already
/// cached.
pub fn resolve_concrete<R: BlockReader + ?Sized>(
    reader: &R,
    locator: &MftLocator,
    cache_root: &mut CacheNode,
    geometry: VolumeGeometry,
    components: &[String],
) -> Result<u64, EngineError> {
    let mut cursor = cache_root;
    for component in components {
        ensure_children_loaded(reader, locator, cursor, geometry)?;
        cursor = cursor
            .child_mut(component)
            .ok_or_else(|| EngineError::NotFound(component.clone()))?;
    }
    Ok(cursor.record_number)
}

/// Expands every `*` component against the volume, returning the set of
/// concrete (wildcard-free) component paths that matched.
pub fn expand_wildcards<R: BlockReader + ?Sized>(
    reader: &R,
    locator: &MftLocator,
    cache_root: &mut CacheNode,
    geometry: VolumeGeometry,
    components: &[String],
) -> Result<Vec<Vec<String>>, EngineError> {
    let mut working: Vec<Vec<String>> = vec![Vec::new()];

    for component in components {
        if component.contains('*') {
            let mut expanded = Vec::new();
            for prefix in &working {
                let parent_record =
                    resolve_concrete(reader, locator, cache_root, geometry, prefix)?;
                let parent = find_node_mut(cache_root, prefix)
                    .expect("resolve_concrete just populated this path");
                ensure_children_loaded(reader, locator, parent, geometry)?;
                let _ = parent_record;

                for (name, _child) in parent.children.iter() {
                    if glob_match(component, name) {
                        let mut next = prefix.clone();
                        next.push(name.clone());
                        expanded.push(next);
                    }
                }
            }
            working = expanded;
        } else {
            for path in working.iter_mut() {
                path.push(component.clone());
            }
        }
    }

    Ok(working)
}

fn find_node_mut<'a>(root: &'a mut CacheNode, path: &[String]) -> Option<&'a mut CacheNode> {
    let mut cursor = root;
    for component in path {
        cursor = cursor.child_mut(component)?;
    }
    Some(cursor)
}

fn ensure_children_loaded<R: BlockReader + ?Sized>(
    reader: &R,
    locator: &MftLocator,
    node: &mut CacheNode,
    geometry: VolumeGeometry,
) -> Result<(), EngineError> {
    if !node.children.is_empty() {
        return Ok(());
    }

    let raw = locator.locate(reader, node.record_number)?;
    let record = record_codec::decode(&raw, node.record_number, geometry.sector_size)?;
    if !record.is_directory() {
        return Ok(());
    }

    let children = directory_index::enumerate(
        reader,
        locator,
        &record,
        geometry.bytes_per_cluster,
        geometry.index_record_size,
        geometry.sector_size,
    )?;

    for (child_record, name) in children {
        node.insert_child(&name, child_record);
    }

    Ok(())
}

/// Matches `name` against `pattern`, where `*` in the pattern matches any
/// run of characters (including none). Matching is case-insensitive; all
/// other characters are literal.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let text: Vec<char> = name.to_lowercase().chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, t));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}
