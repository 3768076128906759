use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use stdbin::replay::{FileReplay, ReplayEvent, StatusEvent};
use tracing::{info, warn};

use crate::info::Format;
use crate::write_message;

pub fn replay(
    input: &Path,
    speedup: u32,
    max_message_size: usize,
    format: &Format,
    no_delay: bool,
) -> Result<()> {
    let builder = FileReplay::builder()
        .path(input)
        .speedup(speedup)
        .max_message_size(max_message_size);
    let replay = if no_delay {
        builder.base_interval(Duration::ZERO).build()
    } else {
        builder.build()
    };
    let handle = replay.spawn().context("starting replay")?;

    let mut out = BufWriter::new(stdout().lock());
    let mut failed = None;
    for event in handle.events().iter() {
        match event {
            ReplayEvent::Message(decoded) => {
                write_message(&mut out, &decoded, format)?;
                if !no_delay {
                    // keep up with the replay rate when writing to a terminal or pipe
                    out.flush().context("writing output")?;
                }
            }
            ReplayEvent::Status(StatusEvent::Error(err)) => {
                warn!("{err}");
                if matches!(err, stdbin::Error::Io(_)) {
                    failed = Some(err);
                }
            }
            ReplayEvent::Status(StatusEvent::Finished { messages }) => {
                info!(messages, "replay finished");
            }
            ReplayEvent::Status(status) => info!("{status:?}"),
        }
    }
    out.flush().context("writing output")?;
    handle.join();

    if let Some(err) = failed {
        bail!("replay of {input:?} failed: {err}");
    }
    Ok(())
}
