// Section splitting and field parsing for the .DAT text layout.

use log::debug;

use crate::error::{DatError, Result};
use crate::format::DatFormat;
use crate::value::{FieldValue, ParamMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    GlobalHeader,
    Scan,
    Trace,
}

/// One raw line with its 1-based position in the source file.
#[derive(Debug, Clone)]
pub(crate) struct Line {
    pub number: usize,
    pub text: String,
}

/// A labeled run of lines between two section markers.
#[derive(Debug, Clone)]
pub(crate) struct Section {
    pub kind: SectionKind,
    /// Marker key token; empty for the global header.
    pub label: String,
    pub lines: Vec<Line>,
}

/// Split trimmed, non-empty tokens out of a line.
fn split_tokens(text: &str, delimiter: char) -> Vec<&str> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split the raw text into an ordered section sequence.
///
/// The first returned section is always the global header (possibly
/// with no lines). Fails when the input has no non-blank lines or no
/// trace marker at all.
pub(crate) fn split_sections(text: &str, format: &DatFormat) -> Result<Vec<Section>> {
    let mut sections = vec![Section {
        kind: SectionKind::GlobalHeader,
        label: String::new(),
        lines: Vec::new(),
    }];
    let mut saw_content = false;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        saw_content = true;

        let key = split_tokens(trimmed, format.delimiter)
            .first()
            .copied()
            .unwrap_or("");

        if format.is_scan_marker(key) {
            sections.push(Section {
                kind: SectionKind::Scan,
                label: key.to_string(),
                lines: Vec::new(),
            });
        } else if format.is_trace_marker(key) {
            sections.push(Section {
                kind: SectionKind::Trace,
                label: key.to_string(),
                lines: Vec::new(),
            });
        } else {
            sections.last_mut().unwrap().lines.push(Line {
                number: idx + 1,
                text: trimmed.to_string(),
            });
        }
    }

    if !saw_content {
        return Err(DatError::MalformedFile("file is empty".to_string()));
    }
    if !sections.iter().any(|s| s.kind == SectionKind::Trace) {
        return Err(DatError::MalformedFile(
            "no trace sections found".to_string(),
        ));
    }

    let scans = sections.iter().filter(|s| s.kind == SectionKind::Scan).count();
    let traces = sections.iter().filter(|s| s.kind == SectionKind::Trace).count();
    debug!("split into {} sections ({} scans, {} traces)", sections.len(), scans, traces);

    Ok(sections)
}

/// Parse the remainder of a key line into one typed value.
///
/// A single trailing token is classified; several are kept together as
/// text (unit suffixes like `30000000;Hz`); none means an empty text
/// value.
fn field_value(tokens: &[&str]) -> FieldValue {
    match tokens {
        [] => FieldValue::Text(String::new()),
        [single] => FieldValue::classify(single),
        many => FieldValue::Text(many.join(" ")),
    }
}

/// Parse the metadata lines of a non-trace section. Lines without the
/// delimiter are tolerated and skipped.
pub(crate) fn parse_fields(lines: &[Line], format: &DatFormat) -> ParamMap {
    let mut map = ParamMap::new();
    for line in lines {
        if !line.text.contains(format.delimiter) {
            continue;
        }
        let tokens = split_tokens(&line.text, format.delimiter);
        if let Some((key, rest)) = tokens.split_first() {
            map.insert(*key, field_value(rest));
        }
    }
    map
}

/// Parse one numeric data row into an (x, y) pair.
fn parse_data_row(tokens: &[&str], line: &Line) -> Result<(f64, f64)> {
    if tokens.len() >= 2 {
        let x = tokens[0].parse::<f64>();
        let y = tokens[1].parse::<f64>();
        if let (Ok(x), Ok(y)) = (x, y) {
            if x.is_finite() && y.is_finite() {
                return Ok((x, y));
            }
        }
    }
    Err(DatError::DataRow {
        line: line.number,
        content: line.text.clone(),
    })
}

/// Parse a trace section into its metadata and x/y series.
///
/// Metadata lines run until the values key (or the first row whose
/// leading token is numeric, for exports that omit the count line);
/// from there on every non-empty line must be a valid x/y row.
pub(crate) fn parse_trace_lines(
    lines: &[Line],
    format: &DatFormat,
) -> Result<(ParamMap, Vec<f64>, Vec<f64>)> {
    let mut metadata = ParamMap::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut in_data = false;

    for line in lines {
        let tokens = split_tokens(&line.text, format.delimiter);
        if tokens.is_empty() {
            // bare-delimiter separator line
            continue;
        }
        if in_data || tokens[0].parse::<f64>().is_ok() {
            in_data = true;
            let (xv, yv) = parse_data_row(&tokens, line)?;
            x.push(xv);
            y.push(yv);
            continue;
        }
        if !line.text.contains(format.delimiter) {
            continue;
        }
        let (key, rest) = tokens.split_first().unwrap();
        metadata.insert(*key, field_value(rest));
        if *key == format.values_key {
            in_data = true;
        }
    }

    Ok((metadata, x, y))
}
