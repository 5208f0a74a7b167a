// tests/integration.rs
// Integration tests for DAT Reader

use std::fmt::Write as _;
use std::fs;
use std::io::Cursor;

use dat_reader::{DatError, DatFile};
use tempfile::TempDir;

/// Helper to synthesize a .DAT export with one scan and `num_traces`
/// traces sharing the same x axis.
fn build_dat_content(num_traces: usize, points: usize) -> String {
    let mut content = String::new();
    content.push_str("ESRP;;\n");
    content.push_str("Version;3.36;\n");
    content.push_str("Date;01.12.2021;\n");
    content.push_str("\n");
    content.push_str("Scan 1:\n");
    content.push_str("Start;150000.000000;\n");
    content.push_str("Stop;30000000.000000;\n");

    for t in 0..num_traces {
        writeln!(content, "TRACE {}:", t + 1).unwrap();
        content.push_str("Trace Mode;CLR/WRITE;\n");
        content.push_str("x-Unit;Hz;\n");
        content.push_str("y-Unit;dBm;\n");
        writeln!(content, "Values;{};", points).unwrap();
        for p in 0..points {
            let x = 150000.0 + p as f64 * 100.0;
            let y = -30.0 - t as f64 - p as f64 * 0.01;
            writeln!(content, "{};{}", x, y).unwrap();
        }
    }
    content
}

fn write_dat(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

#[test]
fn test_load_and_inspect() {
    let dir = TempDir::new().unwrap();
    let content = build_dat_content(2, 10);
    let path = write_dat(&dir, "export.DAT", &content);

    let dat = DatFile::from_path(&path).expect("Failed to load DAT file");

    assert_eq!(dat.source_name(), "export.DAT");
    assert_eq!(dat.byte_size(), content.len() as u64);
    assert_eq!(dat.scan_count(), 1);
    assert_eq!(dat.trace_count(), 2);
    assert_eq!(dat.trace_count(), dat.traces().len());
    assert_eq!(dat.scan_count(), dat.scans().len());

    // global metadata survived with types
    assert!(dat.metadata().contains_key("Version"));
    assert!(dat.metadata().contains_key("Date"));

    // every trace points at an existing scan
    for trace in dat.traces() {
        assert!(trace.scan_index() < dat.scan_count());
    }
}

#[test]
fn test_point_count_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write_dat(&dir, "export.DAT", &build_dat_content(3, 25));

    let dat = DatFile::from_path(&path).unwrap();
    for i in 0..dat.trace_count() {
        let data = dat.get_trace_data(i).unwrap();
        assert_eq!(data.point_count(), data.x().len());
        assert_eq!(data.point_count(), data.y().len());
        assert_eq!(data.point_count(), 25);
    }
}

#[test]
fn test_scan_association_order() {
    let content = "\
Scan 1:
Start;100;
TRACE 1:
Values;2;
1.0;2.0
2.0;3.0
Scan 2:
Start;200;
TRACE 2:
Values;2;
1.0;4.0
2.0;5.0
TRACE 3:
Values;2;
1.0;6.0
2.0;7.0
";
    let dat = DatFile::from_reader(Cursor::new(content), "assoc.DAT").unwrap();

    assert_eq!(dat.scan_count(), 2);
    assert_eq!(dat.trace_count(), 3);
    assert_eq!(dat.traces()[0].scan_index(), 0);
    assert_eq!(dat.traces()[1].scan_index(), 1);
    assert_eq!(dat.traces()[2].scan_index(), 1);

    // the scan view only picks up its own traces
    let scan0 = dat.scan_table(0).unwrap();
    assert_eq!(scan0.column_count(), 2);
    let scan1 = dat.scan_table(1).unwrap();
    assert_eq!(scan1.column_count(), 3);
}

#[test]
fn test_synthesized_default_scan() {
    let content = "\
TRACE 1:
Values;2;
1.0;2.0
2.0;3.0
";
    let dat = DatFile::from_reader(Cursor::new(content), "noscan.DAT").unwrap();

    assert_eq!(dat.scan_count(), 1);
    assert_eq!(dat.scans()[0].name(), "Scan 0");
    assert!(dat.scans()[0].parameters().is_empty());
    assert_eq!(dat.traces()[0].scan_index(), 0);
}

#[test]
fn test_combined_view_shape() {
    let dir = TempDir::new().unwrap();
    let path = write_dat(&dir, "export.DAT", &build_dat_content(3, 100));

    let dat = DatFile::from_path(&path).unwrap();
    let table = dat.combined_table().unwrap();

    assert_eq!(table.column_count(), 4);
    assert_eq!(table.row_count(), 100);
    assert_eq!(table.names()[0], "Hz");
    assert_eq!(table.names()[1], "Trace 0 dBm");
    assert_eq!(table.names()[2], "Trace 1 dBm");
    assert_eq!(table.names()[3], "Trace 2 dBm");
}

#[test]
fn test_view_idempotence() {
    let dir = TempDir::new().unwrap();
    let path = write_dat(&dir, "export.DAT", &build_dat_content(2, 20));

    let dat = DatFile::from_path(&path).unwrap();
    assert_eq!(dat.combined_table().unwrap(), dat.combined_table().unwrap());
    assert_eq!(dat.trace_table(1).unwrap(), dat.trace_table(1).unwrap());
    assert_eq!(dat.scan_table(0).unwrap(), dat.scan_table(0).unwrap());
}

#[test]
fn test_mismatched_traces_cannot_combine() {
    let content = "\
TRACE 1:
y-Unit;dBm;
Values;2;
1.0;2.0
2.0;3.0
TRACE 2:
y-Unit;dBm;
Values;3;
1.0;4.0
2.0;5.0
3.0;6.0
";
    let dat = DatFile::from_reader(Cursor::new(content), "mismatch.DAT").unwrap();

    match dat.combined_table() {
        Err(DatError::IncompatibleTraces { first, second, .. }) => {
            assert_eq!(first, 0);
            assert_eq!(second, 1);
        }
        other => panic!("expected IncompatibleTraces, got {:?}", other),
    }

    // single-trace views still work
    assert!(dat.trace_table(0).is_ok());
    assert!(dat.trace_table(1).is_ok());
}

#[test]
fn test_malformed_inputs() {
    let dir = TempDir::new().unwrap();

    let empty = write_dat(&dir, "empty.DAT", "");
    assert!(matches!(
        DatFile::from_path(&empty),
        Err(DatError::MalformedFile(_))
    ));

    let header_only = write_dat(&dir, "header.DAT", "ESRP;;\nDate;01.12.2021;\n");
    assert!(matches!(
        DatFile::from_path(&header_only),
        Err(DatError::MalformedFile(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = DatFile::from_path("/nonexistent/path/export.DAT");
    assert!(matches!(result, Err(DatError::Io(_))));
}

#[test]
fn test_bounds_one_past_the_end() {
    let dir = TempDir::new().unwrap();
    let path = write_dat(&dir, "export.DAT", &build_dat_content(2, 5));

    let dat = DatFile::from_path(&path).unwrap();
    let n = dat.trace_count();

    assert!(matches!(
        dat.trace_table(n),
        Err(DatError::TraceIndexOutOfRange { index, count })
            if index == n && count == n
    ));
    assert!(matches!(
        dat.get_trace_data(n),
        Err(DatError::TraceIndexOutOfRange { .. })
    ));
    assert!(matches!(
        dat.scan_table(dat.scan_count()),
        Err(DatError::ScanIndexOutOfRange { .. })
    ));
}

#[test]
fn test_corrupt_data_row_aborts_load() {
    let content = "\
TRACE 1:
Values;3;
1.0;2.0
oops;not-a-number
3.0;4.0
";
    let err = DatFile::from_reader(Cursor::new(content), "bad.DAT").unwrap_err();
    match err {
        DatError::DataRow { line, content } => {
            assert_eq!(line, 4);
            assert_eq!(content, "oops;not-a-number");
        }
        other => panic!("expected DataRow, got {:?}", other),
    }
}

#[test]
fn test_reader_and_path_agree() {
    let dir = TempDir::new().unwrap();
    let content = build_dat_content(2, 8);
    let path = write_dat(&dir, "export.DAT", &content);

    let from_path = DatFile::from_path(&path).unwrap();
    let from_reader = DatFile::from_reader(Cursor::new(content), "export.DAT").unwrap();

    assert_eq!(from_path.trace_count(), from_reader.trace_count());
    assert_eq!(from_path.scan_count(), from_reader.scan_count());
    assert_eq!(from_path.byte_size(), from_reader.byte_size());
    assert_eq!(
        from_path.combined_table().unwrap(),
        from_reader.combined_table().unwrap()
    );
}

#[test]
fn test_csv_export_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_dat(&dir, "export.DAT", &build_dat_content(2, 4));

    let dat = DatFile::from_path(&path).unwrap();
    let out = dir.path().join("combined.csv");
    dat.combined_table().unwrap().write_csv(&out).unwrap();

    let csv = fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Hz,Trace 0 dBm,Trace 1 dBm"));
    assert_eq!(lines.clone().count(), 4);
    // first data row carries the shared x and both y values
    let first = lines.next().unwrap();
    assert!(first.starts_with("150000,"));
}

#[test]
fn test_named_traces_label_columns_verbatim() {
    let content = "\
TRACE 1:
Trace Name;FINAL1;
y-Unit;dBm;
Values;2;
1.0;2.0
2.0;3.0
TRACE 2:
y-Unit;dBm;
Values;2;
1.0;4.0
2.0;5.0
";
    let dat = DatFile::from_reader(Cursor::new(content), "named.DAT").unwrap();
    let table = dat.combined_table().unwrap();
    assert_eq!(table.names(), vec!["X", "FINAL1", "Trace 1 dBm"]);
}
