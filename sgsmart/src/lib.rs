//! Read the SMART attribute table of an ATA device through the Linux generic
//! SCSI (`SG_IO`) pass-through ioctl.
//!
//! ```no_run
//! use sgsmart::AttributeNames;
//!
//! let names = AttributeNames::standard();
//! let data = sgsmart::connect("sda")?.read_smart_data()?;
//!
//! for attr in data.attributes(&names) {
//!     println!("{} {} {}", attr.id, attr.value, attr.description);
//! }
//! # Ok::<(), sgsmart::Error>(())
//! ```

use std::fmt;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

pub mod ata;
pub mod attribute;
pub mod cycle;
pub mod error;
pub mod names;
pub mod sink;
pub mod uapi;

pub use attribute::{parse_attributes, AttributeRecord, AttributeValue, Attributes, SMART_DATA_LEN};
pub use cycle::{poll_once, DevicePath, FailurePolicy, LoopStats, PollLoop, Snapshot, SmartSource, StopSignal};
pub use error::{Error, Result};
pub use names::AttributeNames;
pub use sink::{ConsoleSink, JsonPointWriter, MetricsSink, Point, PointWriter, Sink};


/// Directory prepended to device names given without a leading `/`.
pub const DEVICE_DIRECTORY: &str = "/dev";

pub const SENSE_LEN: usize = 64;

pub const SG_IO_TIMEOUT_MS: u32 = 20_000;


/// Turns a bare device name such as `sda` into `/dev/sda`. Paths starting with
/// `/` are returned unchanged.
pub fn resolve_device_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();

    if path.has_root() {
        path.to_path_buf()
    } else {
        Path::new(DEVICE_DIRECTORY).join(path)
    }
}

pub fn connect<P: AsRef<Path>>(path: P) -> Result<Device<File>> {
    Device::open_path(resolve_device_path(path))
}


/// The 512-byte SMART READ DATA response, stamped with the time it was
/// captured.
#[derive(Clone)]
pub struct SmartData {
    data: [u8; SMART_DATA_LEN],
    timestamp_ms: i64,
}

impl SmartData {
    pub fn new(data: [u8; SMART_DATA_LEN], timestamp_ms: i64) -> Self {
        SmartData { data, timestamp_ms }
    }

    pub fn as_bytes(&self) -> &[u8; SMART_DATA_LEN] {
        &self.data
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn revision(&self) -> u16 {
        u16::from_le_bytes([self.data[0], self.data[1]])
    }

    pub fn attributes<'a, 'n>(&'a self, names: &'n AttributeNames) -> Attributes<'a, 'n> {
        Attributes::new(&self.data, names)
    }
}

impl fmt::Debug for SmartData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartData")
            .field("revision", &self.revision())
            .field("timestamp_ms", &self.timestamp_ms)
            .finish_non_exhaustive()
    }
}


#[derive(Debug)]
pub struct Device<F> {
    file: F,
}

impl<F> Device<F> {
    fn new(file: F) -> Self {
        Device { file }
    }

    pub fn file(&self) -> &F {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut F {
        &mut self.file
    }

    pub fn into_inner(self) -> F {
        self.file
    }
}

impl Device<File> {
    /// Opens `path` read-only, without any `/dev` resolution.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| Error::DeviceOpen {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Device::new(file))
    }
}

impl<F: AsRawFd> Device<F> {
    /// Issues SMART READ DATA and waits for the device to answer, or for the
    /// 20 second command timeout to expire.
    pub fn read_smart_data(&self) -> Result<SmartData> {
        let cmd = ata::smart_read_data();
        let mut sense = [0u8; SENSE_LEN];
        let mut data = [0u8; SMART_DATA_LEN];

        let mut hdr = smart_read_request(&cmd, &mut sense, &mut data);

        let result = unsafe { uapi::sg_io(self.file.as_raw_fd(), &mut hdr as *mut _) };

        match result {
            Ok(ret) => trace!(
                target: "sgsmart::ioctl",
                ret,
                status = hdr.status,
                host_status = hdr.host_status,
                driver_status = hdr.driver_status,
                duration_ms = hdr.duration,
                "sg_io"
            ),
            Err(ref e) => trace!(target: "sgsmart::ioctl", error = %e, "sg_io"),
        }

        if hdr.sb_len_wr > 0 {
            let len = (hdr.sb_len_wr as usize).min(SENSE_LEN);
            debug!(sense = ?&sense[..len], "device returned sense data");
        }

        match result {
            Ok(0) => Ok(SmartData::new(data, chrono::Utc::now().timestamp_millis())),
            Ok(ret) => Err(Error::Transport(io::Error::new(
                io::ErrorKind::Other,
                format!("SG_IO returned {}", ret),
            ))),
            Err(errno) => Err(errno.into()),
        }
    }
}

fn smart_read_request(
    cmd: &uapi::AtaCommand,
    sense: &mut [u8; SENSE_LEN],
    data: &mut [u8; SMART_DATA_LEN],
) -> uapi::SgIoHdr {
    uapi::SgIoHdr::from_device(cmd, sense, data, SG_IO_TIMEOUT_MS)
}

impl<F> From<F> for Device<F> {
    fn from(file: F) -> Self {
        Self::new(file)
    }
}
