// Poll the SMART attributes of one ATA device and print them, or stream them
// out as metrics points until interrupted.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sgsmart::sink::DEFAULT_DATABASE;
use sgsmart::{
    AttributeNames, ConsoleSink, DevicePath, FailurePolicy, JsonPointWriter, MetricsSink, PollLoop, StopSignal,
};
use sgsmart_tokio::spawn_poll_loop;
use thiserror::Error as ThisError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, ThisError, PartialEq, Eq)]
enum ConfigError {
    #[error("--max-failures must be at least 1")]
    ZeroMaxFailures,
    #[error("--max-failures only applies with --on-error skip")]
    MaxFailuresWithAbort,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OnError {
    /// Stop at the first device error.
    Abort,
    /// Log device errors and keep polling.
    Skip,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct SmartArgs {
    /// Device to query, e.g. `sda` or `/dev/sda`.
    device: PathBuf,

    /// `true` (any case) prints the attribute table once and exits. Anything
    /// else polls continuously and emits metrics points.
    verbose: Option<String>,

    /// Database the metrics points are addressed to.
    #[clap(long, default_value = DEFAULT_DATABASE)]
    database: String,

    /// Write metrics points here instead of stdout.
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What continuous polling does when the device cannot be read.
    #[clap(long, value_enum, default_value_t = OnError::Skip)]
    on_error: OnError,

    /// Give up after this many consecutive failed cycles.
    #[clap(long)]
    max_failures: Option<u32>,

    /// Pause between cycles, in milliseconds.
    #[clap(long, default_value_t = 0)]
    interval_ms: u64,
}

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Report,
    Monitor,
}

#[derive(Debug, PartialEq, Eq)]
struct SmartConfiguration {
    device: PathBuf,
    mode: Mode,
    database: String,
    output: Option<PathBuf>,
    policy: FailurePolicy,
    interval: Duration,
}

impl TryFrom<SmartArgs> for SmartConfiguration {
    type Error = ConfigError;

    fn try_from(args: SmartArgs) -> Result<Self, ConfigError> {
        let mode = match args.verbose {
            Some(ref v) if v.eq_ignore_ascii_case("true") => Mode::Report,
            _ => Mode::Monitor,
        };

        let policy = match (args.on_error, args.max_failures) {
            (_, Some(0)) => return Err(ConfigError::ZeroMaxFailures),
            (OnError::Abort, Some(_)) => return Err(ConfigError::MaxFailuresWithAbort),
            (OnError::Abort, None) => FailurePolicy::Abort,
            (OnError::Skip, max_consecutive) => FailurePolicy::Skip { max_consecutive },
        };

        Ok(SmartConfiguration {
            device: args.device,
            mode,
            database: args.database,
            output: args.output,
            policy,
            interval: Duration::from_millis(args.interval_ms),
        })
    }
}

async fn start(args: SmartArgs) -> anyhow::Result<()> {
    let config = SmartConfiguration::try_from(args)?;
    let names = Arc::new(AttributeNames::standard());
    let source = DevicePath::new(&config.device);

    info!(device = %source.path().display(), mode = ?config.mode, "target");

    match config.mode {
        Mode::Report => {
            let poll = PollLoop::new(StopSignal::new()).policy(FailurePolicy::Abort).max_cycles(1);
            let sink = ConsoleSink::new(io::stdout());

            spawn_poll_loop(poll, source, names, sink)
                .join()
                .await
                .with_context(|| format!("could not read SMART data from {}", config.device.display()))?;
        }
        Mode::Monitor => {
            let out: Box<dyn Write + Send> = match config.output {
                Some(ref path) => Box::new(
                    File::create(path).with_context(|| format!("could not create {}", path.display()))?,
                ),
                None => Box::new(io::stdout()),
            };
            let sink = MetricsSink::new(JsonPointWriter::new(out), config.database);

            let poll = PollLoop::new(StopSignal::new())
                .policy(config.policy)
                .interval(config.interval);

            let stats = spawn_poll_loop(poll, source, names, sink)
                .until_ctrl_c()
                .await
                .context("polling stopped")?;

            info!(cycles = stats.cycles, failures = stats.failures, "done");
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    if let Err(e) = start(SmartArgs::parse()).await {
        error!("{e:#}");
        exit(1);
    }
}
