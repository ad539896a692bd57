//! Directory index entries, shared by `$INDEX_ROOT` and INDX blocks.

/// One entry of a directory index: a child reference plus the name under
/// which it is filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub child_record_number: u64,
    pub name: String,
    pub is_dos_name: bool,
    pub is_subnode: bool,
}
