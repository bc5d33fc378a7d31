// src/process/mod.rs
pub mod convert;

use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1250;
use std::{
    borrow::Cow,
    fs::File,
    io::{Read, Seek},
    path::Path,
};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{PipelineError, Result};

pub use convert::{parse_records, FLOAT_SENTINEL, SENTINEL};

/// One CSV line split into its cells.
pub type RawRecord = Vec<String>;

pub const DELIMITER: u8 = b';';
pub const QUOTE: u8 = b'"';

/// Open the archive at `archive_path` and return the rows of `entry_name`.
pub fn open<P: AsRef<Path>>(archive_path: P, entry_name: &str) -> Result<Vec<RawRecord>> {
    let path = archive_path.as_ref();
    let label = path.display().to_string();
    let file = File::open(path).map_err(|e| PipelineError::archive(&label, e))?;
    read_region_rows(file, &label, entry_name)
}

/// Read `entry_name` out of the zip behind `reader`, decode it from
/// Windows-1250 and split it into records.
///
/// `archive` only labels errors and log lines.
#[tracing::instrument(level = "debug", skip(reader))]
pub fn read_region_rows<R: Read + Seek>(
    reader: R,
    archive: &str,
    entry_name: &str,
) -> Result<Vec<RawRecord>> {
    let mut zip = ZipArchive::new(reader)
        .map_err(|e| PipelineError::archive(archive, format!("not a readable zip: {}", e)))?;
    let mut entry = zip
        .by_name(entry_name)
        .map_err(|e| PipelineError::archive(archive, format!("entry {}: {}", entry_name, e)))?;

    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut buf)
        .map_err(|e| PipelineError::archive(archive, format!("reading {}: {}", entry_name, e)))?;

    let text = decode_cp1250(&buf);
    let rows = split_records(&text).map_err(|e| {
        PipelineError::archive(archive, format!("CSV error in {}: {}", entry_name, e))
    })?;
    debug!(rows = rows.len(), bytes = buf.len(), "read entry");
    Ok(rows)
}

/// Decode bytes from the Windows-1250 code page the archives are written in.
pub fn decode_cp1250(bytes: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = WINDOWS_1250.decode_without_bom_handling(bytes);
    if had_errors {
        warn!("undecodable bytes replaced while decoding cp1250 text");
    }
    text
}

/// Split semicolon-delimited text into records. Rows may differ in length.
pub fn split_records(text: &str) -> std::result::Result<Vec<RawRecord>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    rdr.records()
        .map(|res| res.map(|record| record.iter().map(str::to_string).collect()))
        .collect()
}
