//! Workbook source traits

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::TraceError;
use crate::workbook::Workbook;

/// Serialization formats a workbook can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Yaml => write!(f, "YAML"),
            SourceFormat::Json => write!(f, "JSON"),
        }
    }
}

impl SourceFormat {
    /// Infers the format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SourceFormat::Json,
            _ => SourceFormat::Yaml,
        }
    }
}

/// Core trait for workbook sources
///
/// `load` reads and parses the whole file. A missing file is reported as
/// [`TraceError::InputNotFound`] before anything is read.
pub trait WorkbookSource {
    /// Returns the source format
    fn format(&self) -> SourceFormat;

    /// Returns the path to the source file
    fn path(&self) -> &Path;

    /// Parses file content into a workbook
    fn parse(&self, content: &str) -> Result<Workbook, TraceError>;

    /// Returns true if the source file exists
    fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Reads and parses the source file
    fn load(&self) -> Result<Workbook, TraceError> {
        if !self.exists() {
            return Err(TraceError::InputNotFound(self.path().to_path_buf()));
        }

        let content = fs::read_to_string(self.path()).map_err(|source| {
            TraceError::InputUnreadable {
                path: self.path().to_path_buf(),
                source,
            }
        })?;
        log::info!(
            "Read {} workbook {}, size={}",
            self.format(),
            self.path().display(),
            content.len()
        );

        let workbook = self.parse(&content)?;
        log::info!("Parsed workbook OK. Found {} sheets", workbook.len());
        Ok(workbook)
    }
}
