use std::io;
use std::path::PathBuf;

use thiserror::Error as ThisError;


#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Could not open device {}: {source}", .path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("SG_IO transaction failed: {0}")]
    Transport(#[source] io::Error),
    #[error("Could not emit attributes: {0}")]
    Sink(#[source] io::Error),
    #[error("Giving up after {count} consecutive failed cycles, last error: {last}")]
    TooManyFailures {
        count: u32,
        #[source]
        last: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error came from opening or talking to the device, as
    /// opposed to emitting results.
    pub fn is_device_error(&self) -> bool {
        matches!(self, Error::DeviceOpen { .. } | Error::Transport(_))
    }
}

impl From<nix::Error> for Error {
    fn from(errno: nix::Error) -> Self {
        Error::Transport(io::Error::from(errno))
    }
}
