//! CSV output for the bucketed table and the per-process summary.
//!
//! Table layout (every field is followed by a comma):
//! ```text
//! "Time(s)","init","kworker/0:0","Misc",
//! 0.000000000,0.012000000,0.000500000,0.020000000,
//! ```

use super::create_output;
use crate::aggregator::{CpuTable, SummaryRow};
use crate::utils::config::TIME_COLUMN_LABEL;
use crate::utils::error::OutputError;
use log::info;
use std::io::Write;
use std::path::Path;

/// Quote a label, doubling embedded quotes
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write the bucketed table
pub fn write_table<W: Write>(table: &CpuTable, mut writer: W) -> Result<(), OutputError> {
    write!(writer, "{},", quote(TIME_COLUMN_LABEL))?;
    for column in &table.columns {
        write!(writer, "{},", quote(&column.label))?;
    }
    writeln!(writer)?;

    for row in 0..table.rows {
        write!(writer, "{:.9},", table.row_start_secs(row))?;
        for column in 0..table.columns.len() {
            write!(writer, "{:.9},", table.occupancy(column, row))?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the bucketed table to `path`, or to stdout when `path` is `None`
pub fn write_table_to(table: &CpuTable, path: Option<&Path>) -> Result<(), OutputError> {
    match path {
        Some(path) => {
            info!("Writing CPU table to: {}", path.display());
            write_table(table, create_output(path)?)
        }
        None => write_table(table, std::io::stdout().lock()),
    }
}

/// Write one `"name",seconds,pid` line per process
pub fn write_summary<W: Write>(rows: &[SummaryRow], mut writer: W) -> Result<(), OutputError> {
    for row in rows {
        writeln!(writer, "{},{:.9},{}", quote(&row.name), row.total_secs(), row.pid)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary_file(rows: &[SummaryRow], path: &Path) -> Result<(), OutputError> {
    info!("Writing process summary to: {}", path.display());
    write_summary(rows, create_output(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::TableColumn;
    use pretty_assertions::assert_eq;

    fn table() -> CpuTable {
        CpuTable {
            bucket_ns: 100_000_000,
            columns: vec![
                TableColumn {
                    label: "init".to_string(),
                    total_ns: 150_000_000,
                    buckets: vec![100_000_000, 50_000_000],
                },
                TableColumn {
                    label: "Misc".to_string(),
                    total_ns: 1_000,
                    buckets: vec![0, 1_000],
                },
            ],
            rows: 2,
            misc: true,
        }
    }

    #[test]
    fn test_write_table() {
        let mut out = Vec::new();
        write_table(&table(), &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"Time(s)\",\"init\",\"Misc\",\n\
             0.000000000,1.000000000,0.000000000,\n\
             0.100000000,0.500000000,0.000010000,\n"
        );
    }

    #[test]
    fn test_write_summary_quotes_names() {
        let rows = vec![
            SummaryRow {
                pid: 481,
                name: "(RCC_HMI)".to_string(),
                total_ns: 1_500_000_000,
            },
            SummaryRow {
                pid: 2,
                name: "say \"hi\"".to_string(),
                total_ns: 0,
            },
        ];
        let mut out = Vec::new();
        write_summary(&rows, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"(RCC_HMI)\",1.500000000,481\n\"say \"\"hi\"\"\",0.000000000,2\n"
        );
    }

    #[test]
    fn test_write_table_to_file_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/cpu.csv");

        write_table_to(&table(), Some(&path)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("\"Time(s)\","));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_write_to_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = write_summary_file(&[], temp_dir.path());
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }
}
