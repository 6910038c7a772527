use std::mem::{offset_of, size_of};

use nix::ioctl_readwrite_bad;
use nix::libc::c_void;
use static_assertions::{assert_eq_size, const_assert_eq};


/// `SG_IO` request code, see `<scsi/sg.h>`.
pub const SG_IO: u32 = 0x2285;

/// Interface tag the kernel expects in [`SgIoHdr::interface_id`].
pub const SG_INTERFACE_ID_ORIG: i32 = b'S' as i32;

/// Transfer direction: device to host.
pub const SG_DXFER_FROM_DEV: i32 = -3;

/// ATA PASS-THROUGH (12) command descriptor block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed)]
pub struct AtaCommand {
    pub opcode: u8,
    pub protocol: u8,
    pub flags: u8,
    pub features: u8,
    pub sector_count: u8,
    pub lba_low: u8,
    pub lba_mid: u8,
    pub lba_high: u8,
    pub device: u8,
    pub command: u8,
    pub reserved: u8,
    pub control: u8,
}

assert_eq_size!(AtaCommand, [u8; 12]);

/// `sg_io_hdr_t` as declared in `<scsi/sg.h>`.
///
/// Unlike [`AtaCommand`] this is not packed: the kernel declares it with
/// natural alignment, so the padding before `usr_ptr` (and at the tail on
/// 64-bit targets) is part of the ABI.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct SgIoHdr {
    pub interface_id: i32,
    pub dxfer_direction: i32,
    pub cmd_len: u8,
    pub mx_sb_len: u8,
    pub iovec_count: u16,
    pub dxfer_len: u32,
    pub dxferp: *mut c_void,
    pub cmdp: *const u8,
    pub sbp: *mut u8,
    pub timeout: u32,
    pub flags: u32,
    pub pack_id: i32,
    pub usr_ptr: *mut c_void,
    pub status: u8,
    pub masked_status: u8,
    pub msg_status: u8,
    pub sb_len_wr: u8,
    pub host_status: u16,
    pub driver_status: u16,
    pub resid: i32,
    pub duration: u32,
    pub info: u32,
}

const_assert_eq!(offset_of!(SgIoHdr, dxfer_len), 12);
const_assert_eq!(offset_of!(SgIoHdr, dxferp), 16);

#[cfg(target_pointer_width = "64")]
const _: () = {
    assert_eq_size!(SgIoHdr, [u8; 88]);
    const_assert_eq!(offset_of!(SgIoHdr, timeout), 40);
    const_assert_eq!(offset_of!(SgIoHdr, usr_ptr), 56);
    const_assert_eq!(offset_of!(SgIoHdr, status), 64);
    const_assert_eq!(offset_of!(SgIoHdr, info), 80);
};

#[cfg(target_pointer_width = "32")]
const _: () = {
    assert_eq_size!(SgIoHdr, [u8; 64]);
    const_assert_eq!(offset_of!(SgIoHdr, usr_ptr), 40);
    const_assert_eq!(offset_of!(SgIoHdr, info), 60);
};

impl SgIoHdr {
    /// Header for a device-to-host transfer of `data`, with every status field
    /// zeroed.
    ///
    /// The returned header holds raw pointers into `cmd`, `sense` and `data`;
    /// it must not outlive them.
    pub fn from_device(cmd: &AtaCommand, sense: &mut [u8], data: &mut [u8], timeout_ms: u32) -> Self {
        SgIoHdr {
            interface_id: SG_INTERFACE_ID_ORIG,
            dxfer_direction: SG_DXFER_FROM_DEV,
            cmd_len: size_of::<AtaCommand>() as u8,
            mx_sb_len: sense.len().min(u8::MAX as usize) as u8,
            iovec_count: 0,
            dxfer_len: data.len() as u32,
            dxferp: data.as_mut_ptr() as *mut c_void,
            cmdp: cmd as *const AtaCommand as *const u8,
            sbp: sense.as_mut_ptr(),
            timeout: timeout_ms,
            flags: 0,
            pack_id: 0,
            usr_ptr: std::ptr::null_mut(),
            status: 0,
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        }
    }
}

ioctl_readwrite_bad!(sg_io, SG_IO, SgIoHdr);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_device_describes_buffers() {
        let cmd = crate::ata::SMART_READ_DATA;
        let mut sense = [0u8; 64];
        let mut data = [0u8; 512];

        let hdr = SgIoHdr::from_device(&cmd, &mut sense, &mut data, 20_000);

        assert_eq!(hdr.interface_id, 0x53);
        assert_eq!(hdr.dxfer_direction, -3);
        assert_eq!(hdr.cmd_len, 12);
        assert_eq!(hdr.mx_sb_len, 64);
        assert_eq!(hdr.iovec_count, 0);
        assert_eq!(hdr.dxfer_len, 512);
        assert_eq!(hdr.timeout, 20_000);
        assert_eq!(hdr.dxferp as usize, data.as_ptr() as usize);
        assert_eq!(hdr.sbp as usize, sense.as_ptr() as usize);
        assert_eq!(hdr.cmdp as usize, &cmd as *const AtaCommand as usize);
        assert!(hdr.usr_ptr.is_null());
    }
}
