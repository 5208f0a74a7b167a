// src/lib.rs
// DAT Reader Library - Public API

//! # DAT Reader
//!
//! A Rust library for reading spectrum-analyzer ASCII trace exports
//! (`.DAT`).
//!
//! ## Features
//!
//! - Parse the global header, scan parameter blocks and trace blocks
//!   of a `.DAT` export into typed, immutable objects
//! - Per-value type inference (integer, float, timestamp, text)
//! - Combined tabular views aligned on the shared frequency axis
//! - Export views to CSV, or to an Arrow `RecordBatch` with the
//!   `dataframe` feature
//! - Proper error handling
//!
//! ## Example
//!
//! ```no_run
//! use dat_reader::DatFile;
//!
//! let dat = DatFile::from_path("export.DAT").expect("Failed to load file");
//!
//! println!("Scans: {}", dat.scan_count());
//! println!("Traces: {}", dat.trace_count());
//!
//! // Access one trace's series
//! let data = dat.get_trace_data(0).expect("no trace 0");
//! println!("First point: {} -> {}", data.x()[0], data.y()[0]);
//!
//! // Export all traces to CSV
//! let table = dat.combined_table().expect("traces not aligned");
//! table.write_csv("export.csv").expect("Failed to write CSV");
//! ```

mod error;
mod format;
mod model;
mod section;
mod table;
mod value;

pub use error::{DatError, Result};
pub use format::DatFormat;
pub use model::{DatFile, Scan, Trace, TraceData};
pub use table::Table;
pub use value::{FieldValue, ParamMap};
