//! JSON workbook source

use std::path::{Path, PathBuf};

use super::traits::{SourceFormat, WorkbookSource};
use crate::error::TraceError;
use crate::workbook::Workbook;

/// Reads a workbook from a JSON object of sheet name to rows
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WorkbookSource for JsonSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Json
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Workbook, TraceError> {
        serde_json::from_str(content).map_err(|e| TraceError::InputParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}
