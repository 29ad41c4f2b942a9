//! Workbook sources
//!
//! This module provides a trait-based abstraction over the files a
//! workbook can be read from, so the pipeline does not care whether the
//! extracted sheets arrive as YAML or JSON.

mod traits;
mod yaml_source;
mod json_source;

pub use traits::{SourceFormat, WorkbookSource};
pub use yaml_source::YamlSource;
pub use json_source::JsonSource;

use std::path::Path;

/// Creates a workbook source based on the file extension or explicit format
pub fn create_source(path: &Path, format: Option<SourceFormat>) -> Box<dyn WorkbookSource> {
    let format = format.unwrap_or_else(|| SourceFormat::from_path(path));

    match format {
        SourceFormat::Yaml => Box::new(YamlSource::new(path)),
        SourceFormat::Json => Box::new(JsonSource::new(path)),
    }
}
