#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Write;

use tempfile::NamedTempFile;

/// Test-only encoder for navigation telegrams.
///
/// Blocks may be added in any order; they are written in ascending bit order per bitmask.
/// The declared total size includes the checksum trailer unless overridden.
#[derive(Debug, Clone)]
pub struct TelegramBuilder {
    marker: [u8; 2],
    version: u8,
    nav: BTreeMap<u8, Vec<u8>>,
    extended: BTreeMap<u8, Vec<u8>>,
    external: BTreeMap<u8, Vec<u8>>,
    extended_mask: Option<u32>,
    total_size: Option<u16>,
    validity_time: u32,
    counter: u32,
    checksum_delta: u32,
}

impl Default for TelegramBuilder {
    fn default() -> Self {
        Self {
            marker: *b"IX",
            version: 5,
            nav: BTreeMap::new(),
            extended: BTreeMap::new(),
            external: BTreeMap::new(),
            extended_mask: None,
            total_size: None,
            validity_time: 0,
            counter: 0,
            checksum_delta: 0,
        }
    }
}

fn floats(vals: &[f32]) -> Vec<u8> {
    vals.iter().flat_map(|v| v.to_be_bytes()).collect()
}

fn mask(blocks: &BTreeMap<u8, Vec<u8>>) -> u32 {
    blocks.keys().fold(0, |m, bit| m | (1 << bit))
}

impl TelegramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(mut self, marker: &[u8; 2]) -> Self {
        self.marker = *marker;
        self
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn counter(mut self, counter: u32) -> Self {
        self.counter = counter;
        self
    }

    pub fn validity_time(mut self, t: u32) -> Self {
        self.validity_time = t;
        self
    }

    /// Override the declared total telegram size.
    pub fn total_size(mut self, size: u16) -> Self {
        self.total_size = Some(size);
        self
    }

    /// Override the extended mask written to the header without changing the blocks.
    pub fn extended_mask(mut self, mask: u32) -> Self {
        self.extended_mask = Some(mask);
        self
    }

    /// Add `delta` to the correct checksum.
    pub fn checksum_delta(mut self, delta: u32) -> Self {
        self.checksum_delta = delta;
        self
    }

    pub fn nav_block(mut self, bit: u8, dat: Vec<u8>) -> Self {
        self.nav.insert(bit, dat);
        self
    }

    pub fn extended_block(mut self, bit: u8, dat: Vec<u8>) -> Self {
        self.extended.insert(bit, dat);
        self
    }

    pub fn external_block(mut self, bit: u8, dat: Vec<u8>) -> Self {
        self.external.insert(bit, dat);
        self
    }

    pub fn attitude(self, heading: f32, roll: f32, pitch: f32) -> Self {
        self.nav_block(0, floats(&[heading, roll, pitch]))
    }

    pub fn position(self, lat: f64, lon: f64, alt_ref: u8, alt: f32) -> Self {
        let mut dat = Vec::new();
        dat.extend_from_slice(&lat.to_be_bytes());
        dat.extend_from_slice(&lon.to_be_bytes());
        dat.push(alt_ref);
        dat.extend_from_slice(&alt.to_be_bytes());
        self.nav_block(7, dat)
    }

    pub fn system_date(self, day: u8, month: u8, year: u16) -> Self {
        let mut dat = vec![day, month];
        dat.extend_from_slice(&year.to_be_bytes());
        self.nav_block(13, dat)
    }

    pub fn course_speed(self, course: f32, speed: f32) -> Self {
        self.nav_block(24, floats(&[course, speed]))
    }

    pub fn temperatures(self, fog: f32, accelerometer: f32, sensor: f32) -> Self {
        self.nav_block(25, floats(&[fog, accelerometer, sensor]))
    }

    /// Navigation block `bit` made of `vals` as big-endian floats.
    pub fn nav_floats(self, bit: u8, vals: &[f32]) -> Self {
        self.nav_block(bit, floats(vals))
    }

    /// INS sensor, algorithm, system and user status words.
    pub fn statuses(self, word: u32) -> Self {
        let words = |n: usize| -> Vec<u8> { (0..n).flat_map(|_| word.to_be_bytes()).collect() };
        self.nav_block(14, words(2))
            .nav_block(15, words(4))
            .nav_block(16, words(3))
            .nav_block(17, words(1))
    }

    pub fn raw_rotation_rate(self, x1: f32, x2: f32, x3: f32) -> Self {
        self.extended_block(2, floats(&[x1, x2, x3]))
    }

    pub fn all_extended(self) -> Self {
        self.extended_block(0, floats(&[1.0, 2.0, 3.0]))
            .extended_block(1, floats(&[0.1, 0.2, 0.3]))
            .raw_rotation_rate(-1.0, -2.0, -3.0)
    }

    pub fn utc(self, validity_time: u32, source: u8) -> Self {
        let mut dat = validity_time.to_be_bytes().to_vec();
        dat.push(source);
        self.external_block(0, dat)
    }

    /// GNSS record `idx` (0 to 2).
    pub fn gnss(self, idx: u8, quality: u8, lat: f64, lon: f64, alt: f32) -> Self {
        let mut dat = Vec::new();
        dat.extend_from_slice(&(-5i32).to_be_bytes());
        dat.push(idx);
        dat.push(quality);
        dat.extend_from_slice(&lat.to_be_bytes());
        dat.extend_from_slice(&lon.to_be_bytes());
        dat.extend(floats(&[alt, 0.5, 0.6, 1.5, 0.01, 32.0]));
        self.external_block(idx + 1, dat)
    }

    pub fn build(&self) -> Vec<u8> {
        let nav: Vec<u8> = self.nav.values().flatten().copied().collect();
        let extended: Vec<u8> = self.extended.values().flatten().copied().collect();
        let external: Vec<u8> = self.external.values().flatten().copied().collect();
        // Unknown versions get the v3 layout: no navigation data size field
        let header_len = match self.version {
            2 => 21,
            5 => 27,
            _ => 25,
        };
        let total = header_len + nav.len() + extended.len() + external.len() + 4;

        let mut dat = self.marker.to_vec();
        dat.push(self.version);
        dat.extend_from_slice(&mask(&self.nav).to_be_bytes());
        if self.version != 2 {
            let ext = self.extended_mask.unwrap_or_else(|| mask(&self.extended));
            dat.extend_from_slice(&ext.to_be_bytes());
        }
        dat.extend_from_slice(&mask(&self.external).to_be_bytes());
        if self.version == 5 {
            dat.extend_from_slice(&u16::try_from(nav.len()).unwrap().to_be_bytes());
        }
        let total_size = self
            .total_size
            .unwrap_or_else(|| u16::try_from(total).unwrap());
        dat.extend_from_slice(&total_size.to_be_bytes());
        dat.extend_from_slice(&self.validity_time.to_be_bytes());
        dat.extend_from_slice(&self.counter.to_be_bytes());
        assert_eq!(dat.len(), header_len);

        dat.extend(nav);
        dat.extend(extended);
        dat.extend(external);
        let sum = stdbin::telegram::checksum(&dat).wrapping_add(self.checksum_delta);
        dat.extend_from_slice(&sum.to_be_bytes());
        dat
    }
}

/// A telegram using most block types; 307 bytes, so larger than the default stream
/// minimum size.
pub fn full_telegram(counter: u32) -> Vec<u8> {
    TelegramBuilder::new()
        .counter(counter)
        .validity_time(counter.wrapping_mul(50))
        .attitude(12.5, -0.5, 1.25)
        .position(34.2, 241.7, 1, 100.5)
        .system_date(17, 6, 2024)
        .statuses(0x8000_0001)
        .course_speed(180.0, 5.5)
        .temperatures(41.5, 38.0, 30.25)
        .all_extended()
        .utc(counter, 2)
        .gnss(0, 4, 34.2, 241.7, 99.0)
        .gnss(1, 1, 34.3, 241.6, 98.0)
        .gnss(2, 5, 34.1, 241.8, 97.0)
        .build()
}

/// Write `telegrams` to a temporary recording file.
pub fn recording<'a>(telegrams: impl IntoIterator<Item = &'a [u8]>) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    for t in telegrams {
        file.write_all(t).expect("failed to write telegram");
    }
    file.flush().expect("failed to flush");
    file
}
