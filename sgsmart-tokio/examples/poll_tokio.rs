use std::io::Result;
use std::sync::Arc;
use std::time::Duration;

use sgsmart::{AttributeNames, ConsoleSink, DevicePath, PollLoop, StopSignal};


#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let device = std::env::args().nth(1).unwrap_or_else(|| "sda".to_owned());

    // Print the table every ten seconds until Ctrl-C.
    let poll = PollLoop::new(StopSignal::new()).interval(Duration::from_secs(10));
    let task = sgsmart_tokio::spawn_poll_loop(
        poll,
        DevicePath::new(device),
        Arc::new(AttributeNames::standard()),
        ConsoleSink::new(std::io::stdout()),
    );

    let stats = task.until_ctrl_c().await.map_err(std::io::Error::other)?;
    println!("{} cycles, {} failed", stats.cycles, stats.failures);

    Ok(())
}
