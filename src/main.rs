// src/main.rs
// Command-line application for DAT Reader

use std::env;
use std::process;

use dat_reader::{DatFile, Trace};

fn print_usage() {
    eprintln!("Usage: dat_reader <command> <dat_file> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <file>                   Display DAT file information");
    eprintln!("  convert <file> <output>       Export all traces to CSV");
    eprintln!("  scan <file> <index> <output>  Export one scan's traces to CSV");
    eprintln!("  extract <file> <index>        Print a single trace to stdout");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  dat_reader info export.DAT");
    eprintln!("  dat_reader convert export.DAT output.csv");
    eprintln!("  dat_reader scan export.DAT 0 scan0.csv");
    eprintln!("  dat_reader extract export.DAT 0 > trace0.txt");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];
    let input_file = &args[2];

    let dat = match DatFile::from_path(input_file) {
        Ok(dat) => dat,
        Err(e) => {
            eprintln!("Error loading DAT file '{}': {}", input_file, e);
            process::exit(1);
        }
    };

    match command.as_str() {
        "info" => {
            print_file_info(&dat);
        }

        "convert" => {
            if args.len() < 4 {
                eprintln!("Error: Missing output file argument");
                print_usage();
                process::exit(1);
            }

            let output_file = &args[3];
            let table = match dat.combined_table() {
                Ok(table) => table,
                Err(e) => {
                    eprintln!("Error combining traces: {}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = table.write_csv(output_file) {
                eprintln!("Error writing CSV file '{}': {}", output_file, e);
                process::exit(1);
            }

            println!("Successfully converted {} to {}", input_file, output_file);
            println!(
                "Columns written: {} ({} rows)",
                table.column_count(),
                table.row_count()
            );
        }

        "scan" => {
            if args.len() < 5 {
                eprintln!("Error: Missing scan index or output file argument");
                print_usage();
                process::exit(1);
            }

            let scan_index: usize = match args[3].parse() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("Error: Invalid scan index '{}'", args[3]);
                    process::exit(1);
                }
            };
            let output_file = &args[4];

            let table = match dat.scan_table(scan_index) {
                Ok(table) => table,
                Err(e) => {
                    eprintln!("Error building scan table: {}", e);
                    process::exit(1);
                }
            };
            if let Err(e) = table.write_csv(output_file) {
                eprintln!("Error writing CSV file '{}': {}", output_file, e);
                process::exit(1);
            }

            println!(
                "Successfully exported scan {} ({} traces) to {}",
                scan_index,
                table.column_count().saturating_sub(1),
                output_file
            );
        }

        "extract" => {
            if args.len() < 4 {
                eprintln!("Error: Missing trace index argument");
                print_usage();
                process::exit(1);
            }

            let trace_index: usize = match args[3].parse() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("Error: Invalid trace index '{}'", args[3]);
                    process::exit(1);
                }
            };

            match dat.get_trace_data(trace_index) {
                Ok(data) => {
                    let trace = &dat.traces()[trace_index];
                    println!("# Trace {} from {}", trace_index, input_file);
                    println!("# {} , {}", trace.x_unit(), trace.y_unit());

                    for (x, y) in data.x().iter().zip(data.y()) {
                        println!("{:.6e}, {:.6e}", x, y);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }

        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_file_info(dat: &DatFile) {
    println!("DAT File Information");
    println!("====================");
    println!();
    println!("File: {}", dat.source_name());
    println!("Size: {} bytes", dat.byte_size());
    println!();

    println!("Global Metadata:");
    if dat.metadata().is_empty() {
        println!("  (none)");
    }
    for (key, value) in dat.metadata() {
        println!("  {}: {}", key, value);
    }
    println!();

    println!("Scans: {}", dat.scan_count());
    for (i, scan) in dat.scans().iter().enumerate() {
        println!(
            "  [{}] {} ({} parameters)",
            i,
            scan.name(),
            scan.parameters().len()
        );
    }
    println!();

    println!("Traces: {}", dat.trace_count());
    for (i, trace) in dat.traces().iter().enumerate() {
        print_trace_info(i, trace);
    }
}

fn print_trace_info(index: usize, trace: &Trace) {
    let data = trace.data();
    let name = if trace.name().is_empty() {
        "(unnamed)"
    } else {
        trace.name()
    };

    let min = data.y().iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = data.y().iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let avg = data.y().iter().sum::<f64>() / data.point_count() as f64;

    println!(
        "  [{}] {} - {} points, x in {}, y in {}",
        index,
        name,
        data.point_count(),
        trace.x_unit(),
        trace.y_unit()
    );
    println!(
        "      scan {}: min={:.3}, max={:.3}, avg={:.3}",
        trace.scan_index(),
        min,
        max,
        avg
    );
}
