//! ATA PASS-THROUGH (12) command for SMART READ DATA.

use crate::uapi::AtaCommand;

pub const ATA_PASS_THROUGH_12: u8 = 0xa1;

/// PROTOCOL field value 6 (DMA), shifted into bits 1..4.
pub const ATA_PROTOCOL_DMA: u8 = 6 << 1;

// Byte 2 of the CDB.
pub const T_LENGTH_SECTOR_COUNT: u8 = 0x02;
pub const BYT_BLOK_BLOCKS: u8 = 1 << 2;
pub const T_DIR_FROM_DEVICE: u8 = 1 << 3;

pub const ATA_CMD_SMART: u8 = 0xb0;
pub const SMART_FEATURE_READ_DATA: u8 = 0xd0;

/// Signature the SMART command set expects in LBA mid/high.
pub const SMART_LBA_MID: u8 = 0x4f;
pub const SMART_LBA_HIGH: u8 = 0xc2;

/// SMART READ DATA, one 512-byte block from the device.
pub const SMART_READ_DATA: AtaCommand = AtaCommand {
    opcode: ATA_PASS_THROUGH_12,
    protocol: ATA_PROTOCOL_DMA,
    flags: T_DIR_FROM_DEVICE | BYT_BLOK_BLOCKS | T_LENGTH_SECTOR_COUNT,
    features: SMART_FEATURE_READ_DATA,
    sector_count: 1,
    lba_low: 0,
    lba_mid: SMART_LBA_MID,
    lba_high: SMART_LBA_HIGH,
    device: 0,
    command: ATA_CMD_SMART,
    reserved: 0,
    control: 0,
};

pub const fn smart_read_data() -> AtaCommand {
    SMART_READ_DATA
}

impl AtaCommand {
    /// The CDB in wire order.
    pub const fn as_bytes(&self) -> [u8; 12] {
        [
            self.opcode,
            self.protocol,
            self.flags,
            self.features,
            self.sector_count,
            self.lba_low,
            self.lba_mid,
            self.lba_high,
            self.device,
            self.command,
            self.reserved,
            self.control,
        ]
    }
}
