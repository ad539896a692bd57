//! Top-level volume bootstrap: read the boot sector, then bootstrap the
//! [`MftLocator`] from `$MFT`'s own record (record 0), which — being the
//! first record of the table it describes — always lives at a fixed
//! offset derived straight from the boot sector.

use tracing::info;

use crate::domain::entities::{attribute_type, AttributeValue, BootSector, DataContent};
use crate::domain::repositories::BlockReader;
use crate::domain::services::EngineError;

use super::{boot_sector_codec, mft_locator::MftLocator, record_codec};

pub struct Volume {
    pub boot_sector: BootSector,
    pub locator: MftLocator,
}

impl Volume {
    /// Opens a volume by reading its boot sector and bootstrapping the MFT
    /// locator from `$MFT`'s own record.
    pub fn open<R: BlockReader + ?Sized>(reader: &R) -> Result<Self, EngineError> {
        let raw_boot = reader.read_at(
            boot_sector_codec::BOOT_SECTOR_OFFSET,
            boot_sector_codec::BOOT_SECTOR_SIZE,
        )?;
        let boot_sector = boot_sector_codec::decode(&raw_boot)?;

        let mft_record_size = boot_sector.mft_record_size();
        let mft_offset = boot_sector.mft_start_cluster * boot_sector.bytes_per_cluster() as u64;
        let raw_record0 = reader.read_at(mft_offset, mft_record_size as usize)?;
        let record0 = record_codec::decode(&raw_record0, 0, boot_sector.bytes_per_sector as usize)?;

        let mft_data = record0
            .attributes_of_type(attribute_type::DATA)
            .find(|a| a.is_unnamed())
            .ok_or_else(|| EngineError::BadVolume("$MFT record has no $DATA".to_string()))?;

        let runs = match &mft_data.value {
            AttributeValue::Data(DataContent::NonResident { runs, .. }) => runs.clone(),
            AttributeValue::Data(DataContent::Resident(_)) => {
                return Err(EngineError::BadVolume(
                    "$MFT data is resident, which should never happen".to_string(),
                ));
            }
            _ => unreachable!("attributes_of_type filters to $DATA"),
        };

        info!(
            mft_record_size,
            run_count = runs.len(),
            "opened NTFS volume"
        );

        let locator = MftLocator::new(runs, boot_sector.bytes_per_cluster() as u64, mft_record_size);

        Ok(Self {
            boot_sector,
            locator,
        })
    }
}
