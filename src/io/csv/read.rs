//! CSV reading operations.

use std::{fmt, fs, io::Cursor, path::PathBuf};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader}};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Encodings tried, in order, when none are configured.
pub const DEFAULT_ENCODINGS: [&str; 3] = ["utf-8", "latin1", "cp1252"];

#[derive(Debug, Error)]
pub enum CsvReadError {
    #[error("could not decode {source_name} with any of the encodings [{tried}]")]
    UndecodableSource { source_name: String, tried: String },
}

/// Location of a CSV table: a local file or an HTTP(S) URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CsvSource {
    Path(PathBuf),
    Url(String),
}

impl From<String> for CsvSource {
    fn from(value: String) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            CsvSource::Url(value)
        } else {
            CsvSource::Path(value.into())
        }
    }
}

impl From<&str> for CsvSource {
    fn from(value: &str) -> Self { value.to_string().into() }
}

impl From<PathBuf> for CsvSource {
    fn from(value: PathBuf) -> Self { CsvSource::Path(value) }
}

impl From<CsvSource> for String {
    fn from(value: CsvSource) -> Self {
        match value {
            CsvSource::Path(path) => path.to_string_lossy().into_owned(),
            CsvSource::Url(url) => url,
        }
    }
}

impl fmt::Display for CsvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvSource::Path(path) => write!(f, "{}", path.display()),
            CsvSource::Url(url) => f.write_str(url),
        }
    }
}

impl CsvSource {
    /// Read the raw bytes behind this source.
    fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            CsvSource::Path(path) => fs::read(path)
                .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display())),
            CsvSource::Url(url) => fetch_url(url),
        }
    }
}

#[cfg(feature = "download")]
fn fetch_url(url: &str) -> Result<Vec<u8>> {
    debug!(%url, "[io::csv::read] fetching");
    crate::common::download_bytes(url)
}

#[cfg(not(feature = "download"))]
fn fetch_url(url: &str) -> Result<Vec<u8>> {
    anyhow::bail!("[io::csv::read] cannot fetch {url}: built without the `download` feature")
}

/// Strictly decode `bytes`; `None` if they are malformed for `encoding`.
fn decode(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let bytes = if encoding == UTF_8 { bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes) } else { bytes };
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// Parse CSV text into a DataFrame, scanning every row for schema inference.
pub(crate) fn read_csv_str(text: &str) -> Result<DataFrame> {
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None);

    CsvReader::new(Cursor::new(text.as_bytes()))
        .with_options(options)
        .finish()
        .context("[io::csv::read] Failed to parse CSV text")
}

/// Read a CSV table from `source`, trying each encoding label in order.
///
/// The bytes are fetched once. A label that fails to decode them is logged and
/// the next one is tried; unknown labels are skipped. The first successful
/// decode is parsed and returned. If nothing decodes, the error is a
/// [`CsvReadError::UndecodableSource`].
pub fn read_csv_with_encodings<S: AsRef<str>>(source: &CsvSource, encodings: &[S]) -> Result<DataFrame> {
    let bytes = source.fetch()?;

    for label in encodings.iter().map(AsRef::as_ref) {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            warn!(%source, encoding = label, "[io::csv::read] unknown encoding label, skipping");
            continue;
        };

        match decode(&bytes, encoding) {
            Some(text) => {
                debug!(%source, encoding = encoding.name(), "[io::csv::read] decoded");
                return read_csv_str(&text)
                    .with_context(|| format!("[io::csv::read] Failed to read CSV from {source}"));
            }
            None => warn!(%source, "[io::csv::read] Error with {label} encoding. Trying another."),
        }
    }

    Err(CsvReadError::UndecodableSource {
        source_name: source.to_string(),
        tried: encodings.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", "),
    }.into())
}
