//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - CSV tables, read with encoding fallback and written atomically
//! - `shp` - Shapefile polygon layers and their `.prj` coordinate reference

pub(crate) mod csv;
pub(crate) mod shp;

pub use csv::{read_csv_with_encodings, write_csv, CsvReadError, CsvSource};
