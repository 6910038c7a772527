use std::sync::Arc;

use sgsmart::{AttributeNames, LoopStats, PollLoop, Sink, SmartSource, StopSignal};
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};


/// A [`PollLoop`] running on tokio's blocking thread pool.
pub struct PollTask {
    handle: JoinHandle<sgsmart::Result<LoopStats>>,
    stop: StopSignal,
}

/// Moves `source` and `sink` onto a blocking thread and runs `poll` there.
///
/// Must be called from within a tokio runtime.
pub fn spawn_poll_loop<S, K>(poll: PollLoop, mut source: S, names: Arc<AttributeNames>, mut sink: K) -> PollTask
where
    S: SmartSource + Send + 'static,
    K: Sink + Send + 'static,
{
    let stop = poll.stop_signal().clone();
    let handle = tokio::task::spawn_blocking(move || poll.run(&mut source, &names, &mut sink));

    PollTask { handle, stop }
}

impl PollTask {
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Asks the loop to finish after the cycle in progress. A loop waiting out
    /// its interval returns right away.
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) -> sgsmart::Result<LoopStats> {
        unwrap_join(self.handle.await)
    }

    /// Waits for the loop to end on its own, or stops it on Ctrl-C and waits
    /// for the current cycle to finish.
    pub async fn until_ctrl_c(mut self) -> sgsmart::Result<LoopStats> {
        tokio::select! {
            result = &mut self.handle => unwrap_join(result),
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => {
                        info!("interrupted, stopping after the current cycle");
                        self.stop.stop();
                    }
                    Err(e) => warn!(error = %e, "could not listen for ctrl-c"),
                }

                unwrap_join(self.handle.await)
            }
        }
    }
}

fn unwrap_join<T>(result: Result<T, JoinError>) -> T {
    result.unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))
}
