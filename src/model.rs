// Object model for a parsed .DAT export and the load pass that
// builds it.

use std::fs;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::error::{DatError, Result};
use crate::format::DatFormat;
use crate::section::{self, SectionKind};
use crate::table::{self, Table};
use crate::value::ParamMap;

/// The numeric series of one trace. `x` and `y` always have the same
/// length and contain only finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceData {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TraceData {
    pub(crate) fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        TraceData { x, y }
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of (x, y) pairs.
    pub fn point_count(&self) -> usize {
        self.x.len()
    }
}

/// One measured data series with its descriptive metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    name: String,
    x_unit: String,
    y_unit: String,
    metadata: ParamMap,
    data: TraceData,
    scan_index: usize,
}

impl Trace {
    pub(crate) fn new(
        name: String,
        x_unit: String,
        y_unit: String,
        metadata: ParamMap,
        data: TraceData,
        scan_index: usize,
    ) -> Self {
        Trace {
            name,
            x_unit,
            y_unit,
            metadata,
            data,
            scan_index,
        }
    }

    /// Explicit trace name from the export; empty when the instrument
    /// did not assign one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x_unit(&self) -> &str {
        &self.x_unit
    }

    pub fn y_unit(&self) -> &str {
        &self.y_unit
    }

    pub fn metadata(&self) -> &ParamMap {
        &self.metadata
    }

    pub fn data(&self) -> &TraceData {
        &self.data
    }

    /// Index of the owning scan in [`DatFile::scans`].
    pub fn scan_index(&self) -> usize {
        self.scan_index
    }
}

/// One sweep configuration block with its parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    name: String,
    parameters: ParamMap,
}

impl Scan {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &ParamMap {
        &self.parameters
    }
}

/// A fully parsed `.DAT` export.
///
/// Constructed once from a path or reader; immutable afterwards.
/// Tabular views are computed freshly on every call.
#[derive(Debug, Clone)]
pub struct DatFile {
    source_name: String,
    byte_size: u64,
    metadata: ParamMap,
    scans: Vec<Scan>,
    traces: Vec<Trace>,
}

/// Instrument exports are UTF-8 or Latin-1 depending on firmware; the
/// Latin-1 fallback decodes every byte sequence.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

impl DatFile {
    /// Read and parse a `.DAT` file using the default ESRP format
    /// conventions.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<DatFile> {
        Self::from_path_with(path, &DatFormat::default())
    }

    /// Read and parse a `.DAT` file with explicit format constants.
    pub fn from_path_with<P: AsRef<Path>>(path: P, format: &DatFormat) -> Result<DatFile> {
        let path = path.as_ref();
        // the handle is dropped here, before parsing starts
        let bytes = fs::read(path)?;
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse_bytes(&bytes, source_name, format)
    }

    /// Parse from any readable stream. `source_name` only labels the
    /// result for display.
    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<DatFile> {
        Self::from_reader_with(reader, source_name, &DatFormat::default())
    }

    pub fn from_reader_with<R: Read>(
        mut reader: R,
        source_name: &str,
        format: &DatFormat,
    ) -> Result<DatFile> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse_bytes(&bytes, source_name.to_string(), format)
    }

    fn parse_bytes(bytes: &[u8], source_name: String, format: &DatFormat) -> Result<DatFile> {
        let content = decode_text(bytes);
        Self::build(&content, source_name, bytes.len() as u64, format)
    }

    fn build(
        content: &str,
        source_name: String,
        byte_size: u64,
        format: &DatFormat,
    ) -> Result<DatFile> {
        let sections = section::split_sections(content, format)?;

        let mut metadata = ParamMap::new();
        let mut scans: Vec<Scan> = Vec::new();
        let mut traces: Vec<(Option<usize>, Trace)> = Vec::new();
        let mut current_scan: Option<usize> = None;

        for sec in &sections {
            match sec.kind {
                SectionKind::GlobalHeader => {
                    metadata = section::parse_fields(&sec.lines, format);
                }
                SectionKind::Scan => {
                    let label = format.scan_label(&sec.label);
                    let name = if label.is_empty() {
                        format!("Scan {}", scans.len())
                    } else {
                        label.to_string()
                    };
                    scans.push(Scan {
                        name,
                        parameters: section::parse_fields(&sec.lines, format),
                    });
                    current_scan = Some(scans.len() - 1);
                }
                SectionKind::Trace => {
                    let (meta, x, y) = section::parse_trace_lines(&sec.lines, format)?;
                    if x.is_empty() {
                        return Err(DatError::MalformedFile(format!(
                            "trace section '{}' contains no data rows",
                            sec.label
                        )));
                    }
                    let name = meta
                        .get(&format.trace_name_key)
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    let x_unit = unit_or(&meta, &format.x_unit_key, "X");
                    let y_unit = unit_or(&meta, &format.y_unit_key, "Y");
                    debug!(
                        "trace {} ('{}'): {} points",
                        traces.len(),
                        sec.label,
                        x.len()
                    );
                    traces.push((
                        current_scan,
                        Trace::new(name, x_unit, y_unit, meta, TraceData::new(x, y), 0),
                    ));
                }
            }
        }

        // Traces that precede every scan marker get a synthesized
        // default scan at index 0.
        let resolved: Vec<Trace> = if traces.iter().any(|(scan, _)| scan.is_none()) {
            scans.insert(
                0,
                Scan {
                    name: "Scan 0".to_string(),
                    parameters: ParamMap::new(),
                },
            );
            traces
                .into_iter()
                .map(|(scan, mut trace)| {
                    trace.scan_index = scan.map(|i| i + 1).unwrap_or(0);
                    trace
                })
                .collect()
        } else {
            traces
                .into_iter()
                .map(|(scan, mut trace)| {
                    trace.scan_index = scan.unwrap_or(0);
                    trace
                })
                .collect()
        };

        debug!(
            "parsed '{}': {} scans, {} traces, {} metadata fields",
            source_name,
            scans.len(),
            resolved.len(),
            metadata.len()
        );

        Ok(DatFile {
            source_name,
            byte_size,
            metadata,
            scans,
            traces: resolved,
        })
    }

    /// Global header metadata.
    pub fn metadata(&self) -> &ParamMap {
        &self.metadata
    }

    /// Scans in source order.
    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    /// Traces in source order.
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn scan_count(&self) -> usize {
        self.scans.len()
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }

    /// Name of the source file (or the label given to `from_reader`).
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Size of the raw input in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    fn scan_at(&self, index: usize) -> Result<&Scan> {
        self.scans.get(index).ok_or(DatError::ScanIndexOutOfRange {
            index,
            count: self.scans.len(),
        })
    }

    fn trace_at(&self, index: usize) -> Result<&Trace> {
        self.traces
            .get(index)
            .ok_or(DatError::TraceIndexOutOfRange {
                index,
                count: self.traces.len(),
            })
    }

    /// Parameters of the scan at `scan_index`.
    pub fn get_scan_parameters(&self, scan_index: usize) -> Result<&ParamMap> {
        self.scan_at(scan_index).map(Scan::parameters)
    }

    /// Metadata of the trace at `trace_index`.
    pub fn get_trace_metadata(&self, trace_index: usize) -> Result<&ParamMap> {
        self.trace_at(trace_index).map(Trace::metadata)
    }

    /// Numeric series of the trace at `trace_index`.
    pub fn get_trace_data(&self, trace_index: usize) -> Result<&TraceData> {
        self.trace_at(trace_index).map(Trace::data)
    }

    /// Two-column table (x, y) for one trace.
    pub fn trace_table(&self, trace_index: usize) -> Result<Table> {
        Ok(table::single_trace(self.trace_at(trace_index)?))
    }

    /// Combined table of every trace belonging to the scan at
    /// `scan_index`, aligned on x.
    pub fn scan_table(&self, scan_index: usize) -> Result<Table> {
        self.scan_at(scan_index)?;
        let selected: Vec<(usize, &Trace)> = self
            .traces
            .iter()
            .enumerate()
            .filter(|(_, t)| t.scan_index == scan_index)
            .collect();
        table::combine(&selected)
    }

    /// Combined table of all traces: one shared x column plus one y
    /// column per trace.
    pub fn combined_table(&self) -> Result<Table> {
        let all: Vec<(usize, &Trace)> = self.traces.iter().enumerate().collect();
        table::combine(&all)
    }
}

fn unit_or(meta: &ParamMap, key: &str, fallback: &str) -> String {
    meta.get(key)
        .map(|v| v.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
