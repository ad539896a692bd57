//! Orchestrates one `copy` invocation: resolve the source path (expanding
//! any wildcards), extract each matched file, and mirror it under the
//! session's output root.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{error, warn};

use crate::domain::entities::MftRecord;
use crate::domain::repositories::BlockReader;
use crate::domain::services::EngineError;
use crate::infrastructure::ntfs::{self, VolumeGeometry};
use crate::infrastructure::output::MirroredWriter;

use super::dto::CopyOutcome;
use super::session::Session;

/// Splits `C:\Windows\System32\hosts` into its drive letter and a list of
/// path components. The drive specifier is mandatory (§6 of the engine's
/// external interface).
fn split_source_path(source_path: &str) -> Result<(char, Vec<String>), EngineError> {
    let mut chars = source_path.chars();
    let drive = chars
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .ok_or_else(|| EngineError::NotFound(source_path.to_string()))?;

    let rest = chars.as_str();
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let rest = rest.trim_start_matches(['\\', '/']);

    let components: Vec<String> = rest
        .split(['\\', '/'])
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect();

    Ok((drive.to_ascii_uppercase(), components))
}

fn decode_record(
    reader: &dyn BlockReader,
    session: &Session,
    record_number: u64,
) -> Result<MftRecord, EngineError> {
    let raw = session.mft_locator.locate(reader, record_number)?;
    ntfs::decode_record(&raw, record_number, session.boot_sector.bytes_per_sector as usize)
}

/// Runs one `copy(source_path, recursive)` call against `session`, writing
/// resolved files through `writer` and consulting/populating `cache_root`.
pub fn execute(
    session: &Session,
    cache: &mut crate::domain::entities::CacheTree,
    source_path: &str,
    recursive: bool,
    writer: &MirroredWriter,
    cancel: &AtomicBool,
) -> Result<CopyOutcome, EngineError> {
    let start = Instant::now();
    let mut outcome = CopyOutcome::new();

    let (drive, components) = split_source_path(source_path)?;
    let reader: &dyn BlockReader = session.block_reader.as_ref();
    let geometry = session.geometry();
    let cache_root = cache.root_for_drive(drive);

    let concrete_paths = if components.iter().any(|c| c.contains('*')) {
        ntfs::expand_wildcards(reader, &session.mft_locator, cache_root, geometry, &components)?
    } else {
        vec![components]
    };

    for path_components in concrete_paths {
        if cancel.load(Ordering::Relaxed) {
            warn!("copy session cancelled, stopping before further matches");
            break;
        }

        let record_number = match ntfs::resolve_concrete(
            reader,
            &session.mft_locator,
            cache_root,
            geometry,
            &path_components,
        ) {
            Ok(n) => n,
            Err(e) => {
                let path = format!("{}:\\{}", drive, path_components.join("\\"));
                error!(path = %path, error = %e, "failed to resolve path");
                outcome.record_failure(path, e);
                continue;
            }
        };

        copy_record(
            session,
            reader,
            geometry,
            record_number,
            drive,
            &path_components,
            recursive,
            writer,
            cancel,
            &mut outcome,
        );
    }

    outcome.duration = start.elapsed();
    Ok(outcome)
}

#[allow(clippy::too_many_arguments)]
fn copy_record(
    session: &Session,
    reader: &dyn BlockReader,
    geometry: VolumeGeometry,
    record_number: u64,
    drive: char,
    components: &[String],
    recursive: bool,
    writer: &MirroredWriter,
    cancel: &AtomicBool,
    outcome: &mut CopyOutcome,
) {
    let logical_path = format!("{}:\\{}", drive, components.join("\\"));

    let record = match decode_record(reader, session, record_number) {
        Ok(r) => r,
        Err(e) => {
            error!(path = %logical_path, error = %e, "failed to decode record");
            outcome.record_failure(logical_path, e);
            return;
        }
    };

    if record.is_directory() {
        let children = match ntfs::enumerate_directory(
            reader,
            &session.mft_locator,
            &record,
            geometry.bytes_per_cluster,
            geometry.index_record_size,
            geometry.sector_size,
        ) {
            Ok(c) => c,
            Err(e) => {
                error!(path = %logical_path, error = %e, "failed to enumerate directory");
                outcome.record_failure(logical_path, e);
                return;
            }
        };

        for (child_record, name) in children {
            if cancel.load(Ordering::Relaxed) {
                warn!("copy session cancelled, stopping before further children");
                break;
            }

            let mut child_components = components.to_vec();
            child_components.push(name);
            let child_path = format!("{}:\\{}", drive, child_components.join("\\"));

            // Immediate file children are always copied; descending into a
            // child directory happens only when recursive is set.
            if !recursive {
                match decode_record(reader, session, child_record) {
                    Ok(child) if child.is_directory() => continue,
                    Ok(_) => {}
                    Err(e) => {
                        error!(path = %child_path, error = %e, "failed to decode record");
                        outcome.record_failure(child_path, e);
                        continue;
                    }
                }
            }

            copy_record(
                session,
                reader,
                geometry,
                child_record,
                drive,
                &child_components,
                recursive,
                writer,
                cancel,
                outcome,
            );
        }
        return;
    }

    let output_components: Vec<String> = std::iter::once(drive.to_string())
        .chain(components.iter().cloned())
        .collect();

    let bytes_per_cluster = geometry.bytes_per_cluster;
    let result = writer.write_with(&output_components, |file| {
        ntfs::extract(reader, &record, bytes_per_cluster, file)
    });

    match result {
        Ok(write_result) => outcome.record_success(write_result.bytes_written),
        Err(e) => {
            error!(path = %logical_path, error = %e, "failed to extract file");
            outcome.record_failure(logical_path, e);
        }
    }
}
