// Rectangular projections of trace data for analysis and export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{DatError, Result};
use crate::model::Trace;

/// A column-ordered table: name → numeric sequence, all columns the
/// same length. The shape external dataframe libraries build from.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<(String, Vec<f64>)>,
}

impl Table {
    fn new(columns: Vec<(String, Vec<f64>)>) -> Self {
        Table { columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Column by position.
    pub fn column(&self, index: usize) -> Option<(&str, &[f64])> {
        self.columns
            .get(index)
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Column values by name.
    pub fn values(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Write the table as CSV: a header row of column names, then one
    /// row per point.
    pub fn write_csv<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let file = File::create(output_file)?;
        let mut writer = BufWriter::new(file);

        let header: Vec<&str> = self.names();
        writeln!(writer, "{}", header.join(","))?;

        for row in 0..self.row_count() {
            let mut first = true;
            for (_, values) in &self.columns {
                if !first {
                    write!(writer, ",")?;
                }
                write!(writer, "{}", values[row])?;
                first = false;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Materialize the table as an Arrow `RecordBatch` with one
    /// `Float64` field per column.
    #[cfg(feature = "dataframe")]
    pub fn to_record_batch(&self) -> Result<arrow::record_batch::RecordBatch> {
        use std::sync::Arc;

        use arrow::array::{ArrayRef, Float64Array};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;

        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|(name, _)| Field::new(name.as_str(), DataType::Float64, false))
            .collect();
        let arrays: Vec<ArrayRef> = self
            .columns
            .iter()
            .map(|(_, values)| Arc::new(Float64Array::from(values.clone())) as ArrayRef)
            .collect();

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}

/// Two-column view of one trace: x named after its x unit, y after its
/// y unit.
pub(crate) fn single_trace(trace: &Trace) -> Table {
    Table::new(vec![
        (trace.x_unit().to_string(), trace.data().x().to_vec()),
        (trace.y_unit().to_string(), trace.data().y().to_vec()),
    ])
}

/// Y-column label for a trace inside a multi-trace view. An explicit
/// name wins verbatim; otherwise the global ordinal qualifies the
/// unit.
fn y_label(index: usize, trace: &Trace) -> String {
    if trace.name().is_empty() {
        format!("Trace {} {}", index, trace.y_unit())
    } else {
        trace.name().to_string()
    }
}

/// Combine traces into one table sharing a single x column.
///
/// Every trace must have the same point count and an identical x
/// sequence; the instrument exports all traces of a sweep at the same
/// points, so a mismatch is a caller error, not something to
/// interpolate away.
pub(crate) fn combine(traces: &[(usize, &Trace)]) -> Result<Table> {
    let (base_index, base) = match traces.first() {
        Some(&(i, t)) => (i, t),
        None => return Ok(Table::new(Vec::new())),
    };

    for &(index, trace) in &traces[1..] {
        if trace.data().point_count() != base.data().point_count() {
            return Err(DatError::IncompatibleTraces {
                first: base_index,
                second: index,
                reason: format!(
                    "point counts differ ({} vs {})",
                    base.data().point_count(),
                    trace.data().point_count()
                ),
            });
        }
        if trace.data().x() != base.data().x() {
            return Err(DatError::IncompatibleTraces {
                first: base_index,
                second: index,
                reason: "x values differ".to_string(),
            });
        }
    }

    let mut columns = Vec::with_capacity(traces.len() + 1);
    columns.push((base.x_unit().to_string(), base.data().x().to_vec()));

    if traces.len() == 1 {
        columns.push((base.y_unit().to_string(), base.data().y().to_vec()));
    } else {
        for &(index, trace) in traces {
            columns.push((y_label(index, trace), trace.data().y().to_vec()));
        }
    }

    Ok(Table::new(columns))
}
