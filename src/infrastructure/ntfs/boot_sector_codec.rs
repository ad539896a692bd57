//! Boot sector decoding
//!
//! Reads sector 0 of an NTFS volume (the BIOS Parameter Block plus NTFS's
//! own extensions) into a [`BootSector`].

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use tracing::debug;

use crate::domain::entities::BootSector;
use crate::domain::services::EngineError;

/// NTFS boot sector signature "NTFS    "
const NTFS_OEM_ID: [u8; 8] = *b"NTFS    ";

pub const BOOT_SECTOR_OFFSET: u64 = 0;
pub const BOOT_SECTOR_SIZE: usize = 512;

/// Decodes a 512-byte boot sector buffer into a [`BootSector`].
pub fn decode(data: &[u8]) -> Result<BootSector, EngineError> {
    if data.len() < BOOT_SECTOR_SIZE {
        return Err(EngineError::BadVolume(
            "boot sector buffer shorter than 512 bytes".to_string(),
        ));
    }

    let mut cursor = Cursor::new(data);

    // Jump instruction (3 bytes) at offset 0
    cursor.set_position(3);

    let mut oem_id = [0u8; 8];
    cursor
        .read_exact(&mut oem_id)
        .map_err(|e| EngineError::BadVolume(e.to_string()))?;
    if oem_id != NTFS_OEM_ID {
        return Err(EngineError::BadVolume("missing NTFS OEM id".to_string()));
    }

    let bytes_per_sector = read_u16(&mut cursor)?;
    let sectors_per_cluster = read_u8(&mut cursor)?;

    // Reserved sectors (2), unused (3), unused (2), media descriptor (1),
    // unused (2), sectors per track (2), heads (2), hidden sectors (4),
    // unused (4), unused (4) bring us from offset 14 to offset 40.
    cursor.set_position(40);
    let total_sectors = read_u64(&mut cursor)?;
    let mft_start_cluster = read_u64(&mut cursor)?;
    let mft_mirror_start_cluster = read_u64(&mut cursor)?;
    let clusters_per_mft_record_raw = read_i8(&mut cursor)?;

    cursor.set_position(68);
    let clusters_per_index_record_raw = read_i8(&mut cursor)?;

    let boot_sector = BootSector::new(
        bytes_per_sector,
        sectors_per_cluster,
        mft_start_cluster,
        mft_mirror_start_cluster,
        clusters_per_mft_record_raw,
        clusters_per_index_record_raw,
        total_sectors,
    );

    if !boot_sector.is_valid() {
        return Err(EngineError::BadVolume(
            "boot sector geometry is self-inconsistent".to_string(),
        ));
    }

    debug!(
        bytes_per_cluster = boot_sector.bytes_per_cluster(),
        mft_record_size = boot_sector.mft_record_size(),
        mft_start_cluster,
        "decoded boot sector"
    );

    Ok(boot_sector)
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, EngineError> {
    cursor
        .read_u8()
        .map_err(|e| EngineError::BadVolume(e.to_string()))
}

fn read_i8(cursor: &mut Cursor<&[u8]>) -> Result<i8, EngineError> {
    cursor
        .read_i8()
        .map_err(|e| EngineError::BadVolume(e.to_string()))
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, EngineError> {
    cursor
        .read_u16::<LittleEndian>()
        .map_err(|e| EngineError::BadVolume(e.to_string()))
}

fn read_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64, EngineError> {
    cursor
        .read_u64::<LittleEndian>()
        .map_err(|e| EngineError::BadVolume(e.to_string()))
}
