//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

use query_engine_criteria::criteria::ConfigurationError;
use thiserror::Error;

/// The errors that can be thrown when parsing a configuration directory.
#[derive(Debug, Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported configuration version {found} in {file_path}, expected \"1\"")]
    UnsupportedVersion { file_path: PathBuf, found: String },
    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

/// The errors that can be thrown when writing a configuration directory.
#[derive(Debug, Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The errors that can be thrown when turning a parsed configuration into a
/// runtime one.
#[derive(Debug, Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("the table name must not be empty")]
    EmptyTableName,
    #[error("invalid field declarations: {0}")]
    InvalidFields(#[from] ConfigurationError),
}
