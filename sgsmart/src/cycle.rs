//! One poll cycle (read, parse, emit) and the loop that repeats it.

use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::attribute::{parse_attributes, AttributeRecord};
use crate::names::AttributeNames;
use crate::sink::Sink;
use crate::{resolve_device_path, Device, Error, Result, SmartData};


/// Anything that can produce a SMART READ DATA response.
pub trait SmartSource {
    fn read_smart_data(&mut self) -> Result<SmartData>;
}

impl<F: AsRawFd> SmartSource for Device<F> {
    fn read_smart_data(&mut self) -> Result<SmartData> {
        Device::read_smart_data(self)
    }
}

impl<S: SmartSource + ?Sized> SmartSource for &mut S {
    fn read_smart_data(&mut self) -> Result<SmartData> {
        (**self).read_smart_data()
    }
}

/// Opens the device afresh for every read and closes it again afterwards.
#[derive(Debug, Clone)]
pub struct DevicePath {
    path: PathBuf,
}

impl DevicePath {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        DevicePath { path: resolve_device_path(path) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SmartSource for DevicePath {
    fn read_smart_data(&mut self) -> Result<SmartData> {
        Device::open_path(&self.path)?.read_smart_data()
    }
}


/// The records of one cycle together with their capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<'n> {
    pub timestamp_ms: i64,
    pub records: Vec<AttributeRecord<'n>>,
}

/// Runs a single cycle and returns the number of records emitted.
///
/// Nothing reaches `sink` when reading from `source` fails.
pub fn poll_once<S, K>(source: &mut S, names: &AttributeNames, sink: &mut K) -> Result<usize>
where
    S: SmartSource + ?Sized,
    K: Sink + ?Sized,
{
    let data = source.read_smart_data()?;

    let snapshot = Snapshot {
        timestamp_ms: data.timestamp_ms(),
        records: parse_attributes(data.as_bytes(), names),
    };
    debug!(records = snapshot.records.len(), timestamp_ms = snapshot.timestamp_ms, "parsed SMART data");

    sink.emit(&snapshot).map_err(Error::Sink)?;

    Ok(snapshot.records.len())
}


/// What the poll loop does when a cycle fails to read the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the first device error.
    Abort,
    /// Log the error and start the next cycle. With `max_consecutive` set,
    /// give up once that many cycles in a row have failed.
    Skip { max_consecutive: Option<u32> },
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Skip { max_consecutive: None }
    }
}


/// Shared flag telling a [`PollLoop`] to finish after the current cycle.
///
/// Raising it also wakes a loop that is waiting out its interval.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<(Mutex<bool>, Condvar)>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        let (stopped, wake) = &*self.0;
        *stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wake.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.0 .0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the signal is raised or `timeout` has passed. Returns
    /// whether the signal is raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (stopped, wake) = &*self.0;
        let guard = stopped.lock().unwrap_or_else(PoisonError::into_inner);

        let (guard, _) = wake
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);

        *guard
    }
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub failures: u64,
}

impl LoopStats {
    fn record_cycle(&mut self) {
        self.cycles = self.cycles.saturating_add(1);
    }

    fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }
}

/// Repeats [`poll_once`] until stopped.
///
/// The stop signal is checked between cycles and cuts the interval short. An
/// ioctl in flight always runs to completion or to its timeout.
#[derive(Debug, Clone)]
pub struct PollLoop {
    policy: FailurePolicy,
    interval: Duration,
    max_cycles: Option<u64>,
    stop: StopSignal,
}

impl PollLoop {
    pub fn new(stop: StopSignal) -> Self {
        PollLoop {
            policy: FailurePolicy::default(),
            interval: Duration::ZERO,
            max_cycles: None,
            stop,
        }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pause between the end of one cycle and the start of the next.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = Some(max_cycles);
        self
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn run<S, K>(&self, source: &mut S, names: &AttributeNames, sink: &mut K) -> Result<LoopStats>
    where
        S: SmartSource + ?Sized,
        K: Sink + ?Sized,
    {
        let mut stats = LoopStats::default();
        let mut consecutive: u32 = 0;

        while !self.stop.is_stopped() && self.max_cycles.map_or(true, |max| stats.cycles < max) {
            stats.record_cycle();

            match poll_once(&mut *source, names, &mut *sink) {
                Ok(records) => {
                    consecutive = 0;
                    debug!(cycle = stats.cycles, records, "cycle complete");
                }
                Err(e) if e.is_device_error() => {
                    stats.record_failure();
                    consecutive = consecutive.saturating_add(1);

                    match self.policy {
                        FailurePolicy::Abort => {
                            error!(cycle = stats.cycles, error = %e, "cycle failed");
                            return Err(e);
                        }
                        FailurePolicy::Skip { max_consecutive: Some(max) } if consecutive >= max => {
                            error!(cycle = stats.cycles, error = %e, consecutive, "cycle failed");
                            return Err(Error::TooManyFailures { count: consecutive, last: Box::new(e) });
                        }
                        FailurePolicy::Skip { .. } => {
                            warn!(cycle = stats.cycles, error = %e, consecutive, "cycle failed, continuing");
                        }
                    }
                }
                Err(e) => return Err(e),
            }

            if !self.interval.is_zero() {
                self.stop.wait_timeout(self.interval);
            }
        }

        Ok(stats)
    }
}
