mod info;
mod replay;
mod stream;

use std::io::{stderr, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stdbin::Decoded;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use info::Format;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded telegram file, writing decoded messages to stdout.
    ///
    /// Messages are produced at the rate the device produced them, 200Hz, unless
    /// --speedup or --no-delay is used.
    Replay {
        /// Recorded telegram file
        input: PathBuf,

        /// Divide the delay between messages by this factor.
        #[arg(short, long, default_value_t = 1)]
        speedup: u32,

        /// Largest telegram to read; larger declared sizes are clamped.
        #[arg(short, long, default_value_t = stdbin::replay::DEFAULT_MAX_MESSAGE_SIZE)]
        max_message_size: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,

        /// Do not delay between messages.
        #[arg(long, action)]
        no_delay: bool,
    },
    /// Decode telegrams from a byte stream, e.g., piped from a socket.
    ///
    /// The input is read in fixed size chunks that are reassembled into telegrams,
    /// resynchronizing on the next sync marker after any corrupt data.
    Stream {
        /// Input file, or - for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Size of each read from the input.
        #[arg(short, long, default_value_t = 1024)]
        chunk_size: usize,

        /// Only attempt a decode with at least this many bytes buffered.
        #[arg(long, default_value_t = 300)]
        min_telegram_size: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,
    },
    /// Summarize a recorded telegram file
    Info {
        /// Recorded telegram file
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: Format,

        /// Largest telegram to read; larger declared sizes are clamped.
        #[arg(short, long, default_value_t = stdbin::replay::DEFAULT_MAX_MESSAGE_SIZE)]
        max_message_size: usize,
    },
}

/// Write one decoded message as a single line.
pub(crate) fn write_message<W: Write>(
    out: &mut W,
    decoded: &Decoded,
    format: &Format,
) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut *out, decoded).context("serializing to json")?;
            writeln!(out).context("writing output")
        }
        Format::Text => {
            let msg = &decoded.message;
            write!(out, "{msg} consumed={}", decoded.consumed).context("writing output")?;
            if let Some(pos) = msg.nav.position {
                write!(
                    out,
                    " lat={:.7} lon={:.7} alt={:.2}",
                    pos.latitude, pos.longitude, pos.altitude
                )
                .context("writing output")?;
            }
            if let Some(att) = msg.nav.attitude {
                write!(
                    out,
                    " hdg={:.3} roll={:.3} pitch={:.3}",
                    att.heading, att.roll, att.pitch
                )
                .context("writing output")?;
            }
            writeln!(out).context("writing output")
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("STDBIN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Replay {
            input,
            speedup,
            max_message_size,
            format,
            no_delay,
        } => replay::replay(input, *speedup, *max_message_size, format, *no_delay),
        Commands::Stream {
            input,
            chunk_size,
            min_telegram_size,
            format,
        } => stream::stream(input, *chunk_size, *min_telegram_size, format),
        Commands::Info {
            input,
            format,
            max_message_size,
        } => info::info(input, format, *max_message_size),
    }
}
