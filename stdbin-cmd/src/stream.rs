use std::fs::File;
use std::io::{stdin, stdout, BufWriter, ErrorKind, Read, Write};

use anyhow::{bail, Context, Result};
use stdbin::stream::{PushOutcome, StreamReassembler};
use tracing::{info, warn};

use crate::info::Format;
use crate::write_message;

pub fn stream(
    input: &str,
    chunk_size: usize,
    min_telegram_size: usize,
    format: &Format,
) -> Result<()> {
    if chunk_size == 0 {
        bail!("chunk size must be greater than 0");
    }
    let mut reader: Box<dyn Read> = if input == "-" {
        Box::new(stdin().lock())
    } else {
        Box::new(File::open(input).with_context(|| format!("opening {input}"))?)
    };

    let mut reassembler = StreamReassembler::builder()
        .min_telegram_size(min_telegram_size)
        .build();
    let mut out = BufWriter::new(stdout().lock());
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0usize;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err).context("reading input"),
        };
        let outcome = reassembler.push(&buf[..n]);
        total += write_outcome(&mut out, &outcome, format)?;
    }
    let outcome = reassembler.flush();
    total += write_outcome(&mut out, &outcome, format)?;
    out.flush().context("writing output")?;

    info!(
        messages = total,
        skipped = reassembler.bytes_skipped(),
        "end of stream"
    );
    Ok(())
}

/// Write every message that was synchronized to a telegram; skipped bytes are only
/// counted.
fn write_outcome<W: Write>(out: &mut W, outcome: &PushOutcome, format: &Format) -> Result<usize> {
    let mut count = 0;
    for decoded in outcome.decoded.iter().filter(|d| d.consumed > 0) {
        write_message(out, decoded, format)?;
        count += 1;
    }
    if let Some(err) = &outcome.error {
        warn!("{err}");
    }
    Ok(count)
}
