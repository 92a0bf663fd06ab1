use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read passenger data from {}", path.display())]
    DataLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unsupported column `{0}`")]
    InvalidColumn(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a single CSV row is left out of every statistic.
#[derive(Debug, Error, PartialEq)]
pub enum RowDefect {
    #[error("survived must be 0 or 1, got {0}")]
    Survived(u8),
    #[error("passenger class must be 1, 2 or 3, got {0}")]
    Class(u8),
    #[error("unknown sex `{0}`")]
    Gender(String),
    #[error("unknown embarkation port `{0}`")]
    Port(String),
    #[error("negative {field}: {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} is not a finite number: {value}")]
    NotFinite { field: &'static str, value: f64 },
}
