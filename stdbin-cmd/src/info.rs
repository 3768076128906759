use std::collections::BTreeMap;
use std::fs::File;
use std::io::{stdout, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use handlebars::handlebars_helper;
use serde::Serialize;
use stdbin::replay::{Framer, FramerEvent};
use stdbin::telegram::SystemDate;
use stdbin::{Decoder, Summary};
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    bytes_skipped: usize,
    framing_errors: usize,
    first_date: Option<String>,
    last_date: Option<String>,
    /// Valid messages per protocol version
    versions: BTreeMap<u8, usize>,
    /// Valid GNSS records per quality, for all three receivers
    gnss_quality: BTreeMap<String, usize>,
    summary: Summary,
}

fn summarize(fpath: &Path, max_message_size: usize) -> Result<Info> {
    let file = File::open(fpath).context("opening input")?;
    let mut framer = Framer::new(BufReader::new(file), max_message_size);
    let mut decoder = Decoder::new();

    let mut summary = Summary::default();
    let mut framing_errors = 0;
    let mut dates: Vec<SystemDate> = Vec::new();
    let mut versions: BTreeMap<u8, usize> = BTreeMap::new();
    let mut gnss_quality: BTreeMap<String, usize> = BTreeMap::new();

    for event in framer.by_ref() {
        let telegram = match event {
            FramerEvent::Telegram(telegram) => telegram,
            FramerEvent::Error(err) => {
                debug!("framing error: {err}");
                framing_errors += 1;
                continue;
            }
            FramerEvent::NoFurtherData => break,
        };
        let msg = decoder.decode(&telegram.data).message;
        summary.add(&msg);
        if !msg.valid {
            continue;
        }
        *versions.entry(msg.protocol_version).or_default() += 1;
        if let Some(date) = msg.nav.system_date {
            dates.push(date);
        }
        for gnss in msg.external.gnss.iter().flatten() {
            *gnss_quality.entry(gnss.quality.to_string()).or_default() += 1;
        }
    }

    Ok(Info {
        filename: fpath.to_string_lossy().to_string(),
        bytes_skipped: framer.bytes_skipped,
        framing_errors,
        first_date: dates.first().map(ToString::to_string),
        last_date: dates.last().map(ToString::to_string),
        versions,
        gnss_quality,
        summary,
    })
}

pub fn info(fpath: &Path, format: &Format, max_message_size: usize) -> Result<()> {
    let info = summarize(fpath, max_message_size)?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => "-".to_owned(),
            _ => v.to_string()
        };
        let width = usize::try_from(num).unwrap_or_default();
        format!("{v:>width$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================================
Dates:     {{ lpad 10 first_date }} .. {{ lpad 10 last_date }}
Times:     {{ lpad 10 summary.first_time }} .. {{ lpad 10 summary.last_time }}
Counters:  {{ lpad 10 summary.first_counter }} .. {{ lpad 10 summary.last_counter }}
Messages:  {{ summary.total }} ({{ summary.valid }} valid, {{ summary.invalid }} invalid)
Gaps:      {{ summary.gap_events }} ({{ summary.dropped }} missing messages)
Duplicate: {{ summary.duplicates }}
Sequence:  {{ summary.out_of_sequence }} out of sequence, {{ summary.reboots }} reboots
Cadence:   {{ summary.cadence_anomalies }} validity time steps other than 50/51
Positions: {{ summary.position_fixes }}
Skipped:   {{ bytes_skipped }} bytes
Framing:   {{ framing_errors }} errors
-----------------------------------------------------------------------------------------------
Error                         Count
-----------------------------------------------------------------------------------------------
{{ #each summary.errors }}{{ lpad 24 @key }}  {{ lpad 9 this }}
{{ /each }}-----------------------------------------------------------------------------------------------
Version   Count      GNSS Quality                  Count
-----------------------------------------------------------------------------------------------
{{ #each versions }}{{ lpad 7 @key }}  {{ lpad 6 this }}
{{ /each }}{{ #each gnss_quality }}                     {{ lpad 24 @key }}  {{ lpad 9 this }}
{{ /each }}";
