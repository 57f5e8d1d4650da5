use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the boundary of the calculator operations.
#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown country: {0}")]
    UnknownCountry(String),
    #[error("reduction potential must be strictly positive, got {0}")]
    DivisionByZero(f64),
    #[error("invalid factor table: {0}")]
    InvalidFactorTable(String),
    #[error("invalid [limits] table: {0}")]
    InvalidLimits(String),
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CalculatorError>;
