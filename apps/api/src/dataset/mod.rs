pub mod aggregation;
pub mod handlers;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::aggregation::{compute_year_aggregates, YearAggregate};
use crate::models::salary::SalaryRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("dataset {path} is not a JSON array of records: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("dataset {path} contains no valid records ({skipped} skipped)")]
    Empty { path: PathBuf, skipped: usize },
}

/// The validated salary records plus the year aggregates derived from them.
/// Built once at startup and never mutated.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<SalaryRecord>,
    year_aggregates: Vec<YearAggregate>,
}

impl Dataset {
    pub fn new(records: Vec<SalaryRecord>) -> Self {
        let year_aggregates = compute_year_aggregates(&records);
        Self {
            records,
            year_aggregates,
        }
    }

    pub fn records(&self) -> &[SalaryRecord] {
        &self.records
    }

    pub fn year_aggregates(&self) -> &[YearAggregate] {
        &self.year_aggregates
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads the dataset file and validates every row.
/// Malformed rows are skipped with a warning; a file with no usable rows is an error.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (records, skipped) = parse_records(&raw).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if records.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
            skipped,
        });
    }

    info!(
        "Loaded {} salary records from {} ({} skipped)",
        records.len(),
        path.display(),
        skipped
    );

    Ok(Dataset::new(records))
}

/// Splits a JSON array into valid records and a count of rejected rows.
fn parse_records(raw: &str) -> Result<(Vec<SalaryRecord>, usize), serde_json::Error> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(raw)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for (index, row) in rows.into_iter().enumerate() {
        match SalaryRecord::from_value(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping malformed salary record at index {index}: {e}");
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}
