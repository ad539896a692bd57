//! End-to-end exercises against hand-built synthetic NTFS volumes: open the
//! volume, resolve a source path, and copy it out through the same code
//! path the CLI's `copy` subcommand drives.

use std::fs;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use ntfs_reach::application::dto::CopyOutcome;
use ntfs_reach::application::{copy_files, Session};
use ntfs_reach::domain::entities::CacheTree;
use ntfs_reach::domain::repositories::BlockReader;
use ntfs_reach::infrastructure::block_device::MmapBlockDevice;
use ntfs_reach::infrastructure::ntfs::Volume;
use ntfs_reach::infrastructure::output::MirroredWriter;

mod support;

fn open_volume(image: &[u8]) -> (Arc<dyn BlockReader>, Volume) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(image).unwrap();
    file.flush().unwrap();

    let reader: Arc<dyn BlockReader> =
        Arc::new(MmapBlockDevice::open(file.path().to_str().unwrap()).unwrap());
    // Keep the temp file alive for the reader's lifetime by leaking its guard;
    // mmap has already taken its own reference to the file's contents.
    let volume = Volume::open(reader.as_ref()).unwrap();
    std::mem::forget(file);
    (reader, volume)
}

fn run_copy(image: &[u8], source_path: &str, recursive: bool) -> (CopyOutcome, tempfile::TempDir) {
    let (reader, volume) = open_volume(image);
    let output_dir = tempfile::tempdir().unwrap();

    let session = Session::new(
        volume.boot_sector,
        reader,
        volume.locator,
        output_dir.path().to_path_buf(),
        true,
    );
    let writer = MirroredWriter::new(output_dir.path(), false).unwrap();
    let mut cache = CacheTree::new();
    let cancel = AtomicBool::new(false);

    let outcome = copy_files(&session, &mut cache, source_path, recursive, &writer, &cancel).unwrap();
    (outcome, output_dir)
}

#[test]
fn copies_a_resident_file_byte_for_byte() {
    let image = support::build_minimal_volume("a.txt", b"hello");
    let (outcome, output_dir) = run_copy(&image, r"C:\a.txt", false);

    assert_eq!(outcome.files_copied, 1);
    assert_eq!(outcome.bytes_written, 5);
    assert_eq!(outcome.files_failed(), 0);

    let written = fs::read(output_dir.path().join("C").join("a.txt")).unwrap();
    assert_eq!(written, b"hello");
}

#[test]
fn wildcard_match_against_the_root_directory_finds_the_file() {
    let image = support::build_minimal_volume("a.txt", b"hello");
    let (outcome, output_dir) = run_copy(&image, r"C:\*.txt", false);

    assert_eq!(outcome.files_copied, 1);
    assert!(output_dir.path().join("C").join("a.txt").exists());
}

#[test]
fn missing_file_is_reported_as_a_failure_not_a_panic() {
    let image = support::build_minimal_volume("a.txt", b"hello");
    let (outcome, _output_dir) = run_copy(&image, r"C:\missing.txt", false);

    assert_eq!(outcome.files_copied, 0);
    assert_eq!(outcome.files_failed(), 1);
}

#[test]
fn non_recursive_directory_copy_takes_immediate_files_but_skips_subdirectories() {
    let image = support::build_volume_with_subdirectory(
        "a.txt", b"hello", "sub", "b.txt", b"nested",
    );
    let (outcome, output_dir) = run_copy(&image, r"C:\", false);

    assert_eq!(outcome.files_copied, 1);
    assert_eq!(outcome.files_failed(), 0);
    assert!(output_dir.path().join("C").join("a.txt").exists());
    assert!(!output_dir.path().join("C").join("sub").join("b.txt").exists());
}

#[test]
fn recursive_directory_copy_descends_into_subdirectories() {
    let image = support::build_volume_with_subdirectory(
        "a.txt", b"hello", "sub", "b.txt", b"nested",
    );
    let (outcome, output_dir) = run_copy(&image, r"C:\", true);

    assert_eq!(outcome.files_copied, 2);
    assert_eq!(outcome.files_failed(), 0);
    assert!(output_dir.path().join("C").join("a.txt").exists());
    let nested = fs::read(output_dir.path().join("C").join("sub").join("b.txt")).unwrap();
    assert_eq!(nested, b"nested");
}

#[test]
fn corrupt_record_surfaces_as_a_failure_during_resolution() {
    let mut image = support::build_minimal_volume("a.txt", b"hello");
    // Flip the fixup signature bytes of record 6 (the file) so the update
    // sequence check fails when the record is decoded.
    let record6_start = support::record_offset_for_test(6);
    image[record6_start + 510] = 0x00;
    image[record6_start + 511] = 0x00;

    let (outcome, _output_dir) = run_copy(&image, r"C:\a.txt", false);
    assert_eq!(outcome.files_copied, 0);
    assert_eq!(outcome.files_failed(), 1);
}
