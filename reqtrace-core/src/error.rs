//! Error types for traceability runs
//!
//! Only conditions that abort a run live here. Data-quality problems
//! (duplicate ids, dangling links, repeated links) are reported through
//! [`crate::diagnostics::Diagnostics`] and never stop processing.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Level;

/// Errors that abort a traceability run
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Requirements file {0} does not exist")]
    InputNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse workbook {path}: {message}")]
    InputParse { path: PathBuf, message: String },

    #[error("Sheet '{sheet}' for level {level} not found in workbook")]
    SheetNotFound { sheet: String, level: Level },

    #[error("Tracing sheet '{0}' not found in workbook")]
    TracingSheetNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load configuration from {path}: {message}")]
    Config { path: PathBuf, message: String },
}
