//! XLSX merge CLI
//!
//! Combines every XLSX workbook in a data directory into one CSV file,
//! writing the shared header exactly once.

use clap::Parser;
use std::path::PathBuf;

const DEFAULT_OUTPUT_FILENAME: &str = "combined.csv";

#[derive(Parser)]
#[command(name = "xlsxmerge")]
#[command(about = "Combine XLSX workbooks into a single CSV", long_about = None)]
#[command(version)]
struct Cli {
    /// Output CSV path (defaults to combined.csv inside the data directory)
    output: Option<PathBuf>,

    /// Directory containing the input workbooks
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if !cli.data_dir.is_dir() {
        eprintln!("Data directory not found: {}", cli.data_dir.display());
        std::process::exit(1);
    }

    let output = cli
        .output
        .unwrap_or_else(|| cli.data_dir.join(DEFAULT_OUTPUT_FILENAME));

    match xlsxmerge_core::merge_workbooks(&cli.data_dir, &output) {
        Ok(report) => {
            println!("Combined CSV written to {}", output.display());
            println!(
                "Merged {} workbook(s), skipped {}, {} records",
                report.workbooks_merged, report.workbooks_skipped, report.records_written
            );
            if let Some(path) = &cli.report {
                if let Err(e) = report.save(path) {
                    eprintln!("Failed to write report: {}", e);
                    std::process::exit(2);
                }
                println!("Run report written to {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Failed to merge workbooks: {}", e);
            std::process::exit(2);
        }
    }
}
