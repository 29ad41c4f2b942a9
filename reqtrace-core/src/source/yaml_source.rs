//! YAML workbook source

use std::path::{Path, PathBuf};

use super::traits::{SourceFormat, WorkbookSource};
use crate::error::TraceError;
use crate::workbook::Workbook;

/// Reads a workbook from a YAML mapping of sheet name to rows
pub struct YamlSource {
    path: PathBuf,
}

impl YamlSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WorkbookSource for YamlSource {
    fn format(&self) -> SourceFormat {
        SourceFormat::Yaml
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Workbook, TraceError> {
        serde_yaml::from_str(content).map_err(|e| TraceError::InputParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_source_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reqs.yaml");
        std::fs::write(&path, "L2_CU:\n  - ID: A\n    Requirement Statement: Alpha\n").unwrap();

        let workbook = YamlSource::new(&path).load().unwrap();
        assert_eq!(workbook.sheet("L2_CU").unwrap()[0].value("Requirement Statement"), "Alpha");
    }

    #[test]
    fn test_yaml_source_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = YamlSource::new(temp_dir.path().join("absent.yaml"));

        assert!(!source.exists());
        assert!(matches!(source.load(), Err(TraceError::InputNotFound(_))));
    }

    #[test]
    fn test_yaml_source_rejects_malformed_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        std::fs::write(&path, "- just\n- a list\n").unwrap();

        assert!(matches!(
            YamlSource::new(&path).load(),
            Err(TraceError::InputParse { .. })
        ));
    }
}
