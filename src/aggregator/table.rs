//! The bucketed CPU distribution table.
//!
//! Columns are the top-N ranked series followed by an optional "Misc"
//! column summing the rest; rows are buckets.

use super::series::Series;
use crate::utils::config::{MISC_LABEL, NS_PER_SEC};
use log::debug;

/// One column of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub label: String,
    pub total_ns: u64,

    /// CPU nanoseconds per bucket, one entry per table row
    pub buckets: Vec<u64>,
}

/// CPU occupancy per bucket for the selected columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTable {
    pub bucket_ns: u64,
    pub columns: Vec<TableColumn>,

    /// Number of bucket rows
    pub rows: usize,

    /// Last column folds everything outside the top N
    pub misc: bool,
}

impl CpuTable {
    /// Start of bucket `row` in seconds
    pub fn row_start_secs(&self, row: usize) -> f64 {
        (row as u64 * self.bucket_ns) as f64 / NS_PER_SEC as f64
    }

    /// Fraction of bucket `row` that column `column` occupied a CPU
    ///
    /// Can exceed 1.0 when a process runs on several cores at once.
    pub fn occupancy(&self, column: usize, row: usize) -> f64 {
        self.columns[column].buckets[row] as f64 / self.bucket_ns as f64
    }

    pub fn has_misc(&self) -> bool {
        self.misc
    }
}

/// Build the table from ranked series
///
/// # Arguments
/// * `ranked` - Series in rank order (see [`super::rank`])
/// * `top_n` - Number of series shown individually
/// * `last_bucket` - Last bucket to emit; `None` yields an empty table
/// * `bucket_ns` - Bucket width
pub fn build_table(
    ranked: &[Series],
    top_n: usize,
    last_bucket: Option<usize>,
    bucket_ns: u64,
) -> CpuTable {
    let rows = last_bucket.map_or(0, |b| b + 1);
    let split = top_n.min(ranked.len());
    let (top, rest) = ranked.split_at(split);

    debug!(
        "Building table: {} rows, {} individual columns, {} folded into {}",
        rows,
        top.len(),
        rest.len(),
        MISC_LABEL
    );

    let mut columns: Vec<TableColumn> = top
        .iter()
        .map(|s| TableColumn {
            label: s.label.clone(),
            total_ns: s.total_ns,
            buckets: window(&s.buckets, rows),
        })
        .collect();

    if !rest.is_empty() {
        let mut misc = TableColumn {
            label: MISC_LABEL.to_string(),
            total_ns: 0,
            buckets: vec![0; rows],
        };
        for s in rest {
            misc.total_ns += s.total_ns;
            for (slot, ns) in misc.buckets.iter_mut().zip(&s.buckets) {
                *slot += ns;
            }
        }
        columns.push(misc);
    }

    CpuTable {
        bucket_ns,
        columns,
        rows,
        misc: !rest.is_empty(),
    }
}

/// First `rows` buckets, zero-padded
fn window(buckets: &[u64], rows: usize) -> Vec<u64> {
    let mut out: Vec<u64> = buckets.iter().take(rows).copied().collect();
    out.resize(rows, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEC: u64 = 1_000_000_000;

    #[test]
    fn test_top_n_and_misc() {
        let ranked = vec![
            Series::new(1, 1, "a", 5 * SEC, vec![5 * SEC, 0]),
            Series::new(2, 2, "b", 3 * SEC, vec![SEC, 2 * SEC]),
            Series::new(3, 3, "c", SEC, vec![0, SEC]),
        ];

        let table = build_table(&ranked, 1, Some(1), SEC);

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].label, "a");
        assert_eq!(table.columns[1].label, "Misc");
        assert_eq!(table.columns[1].total_ns, 4 * SEC);
        assert_eq!(table.columns[1].buckets, vec![SEC, 3 * SEC]);
        assert!(table.has_misc());
    }

    #[test]
    fn test_no_misc_when_everything_fits() {
        let ranked = vec![Series::new(1, 1, "a", 10, vec![10, 0, 0])];
        let table = build_table(&ranked, 5, Some(0), 100);

        assert_eq!(table.columns.len(), 1);
        assert!(!table.has_misc());
        assert_eq!(table.rows, 1);
        assert_eq!(table.columns[0].buckets, vec![10]);
    }

    #[test]
    fn test_process_named_misc_is_not_the_misc_column() {
        let ranked = vec![
            Series::new(1, 1, "a", 20, vec![20]),
            Series::new(2, 2, "Misc", 10, vec![10]),
        ];
        let table = build_table(&ranked, 2, Some(0), 100);

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].label, "Misc");
        assert!(!table.has_misc());
    }

    #[test]
    fn test_empty_trace_gives_no_rows() {
        let table = build_table(&[], 5, None, 100);
        assert_eq!(table.rows, 0);
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_occupancy_and_row_start() {
        let ranked = vec![Series::new(1, 1, "a", 150, vec![100, 50])];
        let table = build_table(&ranked, 1, Some(1), 100_000_000);

        assert_eq!(table.row_start_secs(1), 0.1);
        assert_eq!(table.occupancy(0, 0), 100.0 / 100_000_000.0);
    }
}
