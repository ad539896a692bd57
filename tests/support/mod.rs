//! Hand-built synthetic NTFS volume images for end-to-end tests.
//!
//! Lays out a boot sector, a tiny self-describing `$MFT` (record 0), a root
//! directory (record 5) with one `$INDEX_ROOT` entry, and one resident file
//! record (record 6), the way `argos`'s `infrastructure_tests.rs` builds a
//! synthetic device image byte-by-byte instead of pulling in a real disk.

pub const BYTES_PER_SECTOR: u16 = 512;
pub const SECTORS_PER_CLUSTER: u8 = 2;
pub const BYTES_PER_CLUSTER: u64 = BYTES_PER_SECTOR as u64 * SECTORS_PER_CLUSTER as u64;
pub const MFT_RECORD_SIZE: usize = 1024;
pub const MFT_START_CLUSTER: u64 = 1;
pub const MFT_RUN_CLUSTERS: u64 = 8;

const FIXUP_SIGNATURE: u16 = 0xABCD;

fn record_offset(record_number: u64) -> usize {
    (MFT_START_CLUSTER * BYTES_PER_CLUSTER) as usize + record_number as usize * MFT_RECORD_SIZE
}

/// Exposes a record's physical byte offset within the image for tests that
/// need to corrupt specific bytes of an already-built volume.
pub fn record_offset_for_test(record_number: u64) -> usize {
    record_offset(record_number)
}

/// Writes a record header common to every record, returns the attribute
/// start offset (56, right after the header + update-sequence array).
fn write_record_header(buf: &mut [u8], flags: u16, used_size: u32) {
    buf[0..4].copy_from_slice(b"FILE");
    buf[4..6].copy_from_slice(&48u16.to_le_bytes()); // update_seq_offset
    buf[6..8].copy_from_slice(&3u16.to_le_bytes()); // signature + 2 sectors
    buf[16..18].copy_from_slice(&1u16.to_le_bytes()); // sequence_number
    buf[20..22].copy_from_slice(&56u16.to_le_bytes()); // first_attribute_offset
    buf[22..24].copy_from_slice(&flags.to_le_bytes());
    buf[24..28].copy_from_slice(&used_size.to_le_bytes());
    buf[28..32].copy_from_slice(&(MFT_RECORD_SIZE as u32).to_le_bytes()); // allocated_size
}

/// Plants the update-sequence array and per-sector fixup signature over a
/// record buffer that is exactly two 512-byte sectors long.
fn apply_test_fixup(buf: &mut [u8]) {
    let sig = FIXUP_SIGNATURE.to_le_bytes();
    buf[48..50].copy_from_slice(&sig); // signature word
    buf[50..52].copy_from_slice(&[0, 0]); // original bytes for sector 0
    buf[52..54].copy_from_slice(&[0, 0]); // original bytes for sector 1
    buf[510..512].copy_from_slice(&sig);
    buf[1022..1024].copy_from_slice(&sig);
}

fn write_index_entry(buf: &mut Vec<u8>, child_record: u64, name: &str) {
    let name_utf16: Vec<u8> = name.encode_utf16().flat_map(|c| c.to_le_bytes()).collect();
    let key_len = 66 + name_utf16.len();
    let total = 16 + key_len;
    let start = buf.len();
    buf.resize(start + total, 0);
    buf[start..start + 8].copy_from_slice(&child_record.to_le_bytes());
    buf[start + 8..start + 10].copy_from_slice(&(total as u16).to_le_bytes());
    buf[start + 10..start + 12].copy_from_slice(&(key_len as u16).to_le_bytes());
    buf[start + 16 + 64] = name.encode_utf16().count() as u8;
    buf[start + 16 + 65] = 1; // Win32 namespace
    buf[start + 16 + 66..start + total].copy_from_slice(&name_utf16);
}

fn write_index_terminator(buf: &mut Vec<u8>) {
    let start = buf.len();
    buf.resize(start + 16, 0);
    buf[start + 8..start + 10].copy_from_slice(&16u16.to_le_bytes());
    buf[start + 12..start + 14].copy_from_slice(&0x0002u16.to_le_bytes()); // FLAG_IS_LAST
}

/// Builds the `$INDEX_ROOT` attribute value for a directory whose children
/// are the given `(record_number, name)` pairs.
fn build_index_root_value(children: &[(u64, &str)]) -> Vec<u8> {
    let mut entries = Vec::new();
    for (record, name) in children {
        write_index_entry(&mut entries, *record, name);
    }
    write_index_terminator(&mut entries);

    let mut value = vec![0u8; 32];
    value[0..4].copy_from_slice(&0x30u32.to_le_bytes()); // collates by $FILE_NAME
    value[16..20].copy_from_slice(&16u32.to_le_bytes()); // offset_to_first_entry
    value[20..24].copy_from_slice(&(entries.len() as u32 + 16).to_le_bytes()); // total_size
    value[24..28].copy_from_slice(&(entries.len() as u32 + 16).to_le_bytes()); // allocated_size
    value.extend_from_slice(&entries);
    value
}

fn write_resident_attribute(buf: &mut [u8], attr_offset: usize, attr_type: u32, value: &[u8]) -> usize {
    let value_offset = 24usize;
    let length = value_offset + value.len();

    buf[attr_offset..attr_offset + 4].copy_from_slice(&attr_type.to_le_bytes());
    buf[attr_offset + 4..attr_offset + 8].copy_from_slice(&(length as u32).to_le_bytes());
    buf[attr_offset + 8] = 0; // resident
    buf[attr_offset + 9] = 0; // name_length
    buf[attr_offset + 16..attr_offset + 20].copy_from_slice(&(value.len() as u32).to_le_bytes());
    buf[attr_offset + 20..attr_offset + 22].copy_from_slice(&(value_offset as u16).to_le_bytes());
    buf[attr_offset + value_offset..attr_offset + length].copy_from_slice(value);

    length
}

fn write_non_resident_data_attribute(
    buf: &mut [u8],
    attr_offset: usize,
    cluster_offset: u64,
    cluster_length: u64,
    data_size: u64,
    initialized_size: u64,
) -> usize {
    let data_run_offset: usize = 64;
    let mut run_bytes = vec![0x11u8, cluster_length as u8, cluster_offset as u8, 0x00];
    // pad run bytes so the attribute ends on the same boundary regardless of value width
    while run_bytes.len() < 4 {
        run_bytes.push(0);
    }
    let length = data_run_offset + run_bytes.len();

    buf[attr_offset..attr_offset + 4].copy_from_slice(&0x80u32.to_le_bytes()); // $DATA
    buf[attr_offset + 4..attr_offset + 8].copy_from_slice(&(length as u32).to_le_bytes());
    buf[attr_offset + 8] = 1; // non-resident
    buf[attr_offset + 9] = 0; // name_length

    let nr = attr_offset + 16;
    buf[nr + 16..nr + 18].copy_from_slice(&(data_run_offset as u16).to_le_bytes()); // data_run_offset
    let allocated_size = cluster_length * BYTES_PER_CLUSTER;
    buf[nr + 24..nr + 32].copy_from_slice(&allocated_size.to_le_bytes());
    buf[nr + 32..nr + 40].copy_from_slice(&data_size.to_le_bytes());
    buf[nr + 40..nr + 48].copy_from_slice(&initialized_size.to_le_bytes());

    buf[attr_offset + data_run_offset..attr_offset + length].copy_from_slice(&run_bytes);
    length
}

fn write_end_marker(buf: &mut [u8], offset: usize) -> usize {
    buf[offset..offset + 4].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    offset + 4
}

/// Builds a minimal but structurally valid NTFS volume:
/// - boot sector (sector 0)
/// - `$MFT` record 0, non-resident `$DATA` describing its own 8-cluster run
/// - root directory, record 5, one `$INDEX_ROOT` entry pointing at record 6
/// - file record 6, resident `$DATA` = `contents`, named `file_name` in the
///   root directory's index
pub fn build_minimal_volume(file_name: &str, contents: &[u8]) -> Vec<u8> {
    let total_len = record_offset(7) + MFT_RECORD_SIZE;
    let mut disk = vec![0u8; total_len];

    // --- boot sector ---
    disk[3..11].copy_from_slice(b"NTFS    ");
    disk[11..13].copy_from_slice(&BYTES_PER_SECTOR.to_le_bytes());
    disk[13] = SECTORS_PER_CLUSTER;
    disk[40..48].copy_from_slice(&((total_len / BYTES_PER_SECTOR as usize) as u64).to_le_bytes());
    disk[48..56].copy_from_slice(&MFT_START_CLUSTER.to_le_bytes());
    disk[56..64].copy_from_slice(&MFT_START_CLUSTER.to_le_bytes());
    disk[64] = (-10i8) as u8; // 1024-byte MFT records
    disk[68] = (-10i8) as u8; // 1024-byte index records

    // --- record 0: $MFT ---
    {
        let off = record_offset(0);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let attr_end = write_non_resident_data_attribute(
            rec,
            56,
            MFT_START_CLUSTER,
            MFT_RUN_CLUSTERS,
            MFT_RUN_CLUSTERS * BYTES_PER_CLUSTER,
            MFT_RUN_CLUSTERS * BYTES_PER_CLUSTER,
        );
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0001, used as u32);
        apply_test_fixup(rec);
    }

    // --- record 5: root directory ---
    {
        let off = record_offset(5);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let index_value = build_index_root_value(&[(6, file_name)]);
        let attr_end = write_resident_attribute(rec, 56, 0x90, &index_value);
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0003, used as u32); // in-use + directory
        apply_test_fixup(rec);
    }

    // --- record 6: file ---
    {
        let off = record_offset(6);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let attr_end = write_resident_attribute(rec, 56, 0x80, contents);
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0001, used as u32);
        apply_test_fixup(rec);
    }

    disk
}

/// Builds a volume shaped like [`build_minimal_volume`] but with the root
/// directory (record 5) holding both a file child (record 6) and a
/// subdirectory child (record 7), the subdirectory holding one file of its
/// own (record 8). Exercises directory-copy recursion: whether the
/// subdirectory's contents are reached depends on the caller's `recursive`
/// flag, not on how the source path was resolved.
pub fn build_volume_with_subdirectory(
    file_name: &str,
    file_contents: &[u8],
    subdir_name: &str,
    subfile_name: &str,
    subfile_contents: &[u8],
) -> Vec<u8> {
    const RUN_CLUSTERS: u64 = 9; // covers records 0 through 8

    let total_len = record_offset(8) + MFT_RECORD_SIZE;
    let mut disk = vec![0u8; total_len];

    // --- boot sector ---
    disk[3..11].copy_from_slice(b"NTFS    ");
    disk[11..13].copy_from_slice(&BYTES_PER_SECTOR.to_le_bytes());
    disk[13] = SECTORS_PER_CLUSTER;
    disk[40..48].copy_from_slice(&((total_len / BYTES_PER_SECTOR as usize) as u64).to_le_bytes());
    disk[48..56].copy_from_slice(&MFT_START_CLUSTER.to_le_bytes());
    disk[56..64].copy_from_slice(&MFT_START_CLUSTER.to_le_bytes());
    disk[64] = (-10i8) as u8; // 1024-byte MFT records
    disk[68] = (-10i8) as u8; // 1024-byte index records

    // --- record 0: $MFT ---
    {
        let off = record_offset(0);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let attr_end = write_non_resident_data_attribute(
            rec,
            56,
            MFT_START_CLUSTER,
            RUN_CLUSTERS,
            RUN_CLUSTERS * BYTES_PER_CLUSTER,
            RUN_CLUSTERS * BYTES_PER_CLUSTER,
        );
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0001, used as u32);
        apply_test_fixup(rec);
    }

    // --- record 5: root directory, children: file_name -> 6, subdir_name -> 7 ---
    {
        let off = record_offset(5);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let index_value = build_index_root_value(&[(6, file_name), (7, subdir_name)]);
        let attr_end = write_resident_attribute(rec, 56, 0x90, &index_value);
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0003, used as u32); // in-use + directory
        apply_test_fixup(rec);
    }

    // --- record 6: file ---
    {
        let off = record_offset(6);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let attr_end = write_resident_attribute(rec, 56, 0x80, file_contents);
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0001, used as u32);
        apply_test_fixup(rec);
    }

    // --- record 7: subdirectory, child: subfile_name -> 8 ---
    {
        let off = record_offset(7);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let index_value = build_index_root_value(&[(8, subfile_name)]);
        let attr_end = write_resident_attribute(rec, 56, 0x90, &index_value);
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0003, used as u32); // in-use + directory
        apply_test_fixup(rec);
    }

    // --- record 8: file inside the subdirectory ---
    {
        let off = record_offset(8);
        let rec = &mut disk[off..off + MFT_RECORD_SIZE];
        let attr_end = write_resident_attribute(rec, 56, 0x80, subfile_contents);
        let used = write_end_marker(rec, attr_end);
        write_record_header(rec, 0x0001, used as u32);
        apply_test_fixup(rec);
    }

    disk
}
