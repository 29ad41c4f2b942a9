//! Tabular input: named sheets of header → value rows
//!
//! A workbook is what a spreadsheet extractor produces: every sheet is an
//! ordered list of rows, every row maps a column header to its cell text.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Raw cell as it appears in YAML or JSON
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Empty(()),
}

impl Cell {
    fn into_text(self) -> String {
        match self {
            Cell::Text(s) => s,
            Cell::Integer(i) => i.to_string(),
            // Spreadsheets store whole numbers as floats
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Empty(()) => String::new(),
        }
    }
}

/// One row of a sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, String>,
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Cell>::deserialize(deserializer)?;
        Ok(Self {
            cells: raw.into_iter().map(|(k, v)| (k, v.into_text())).collect(),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Row {
    /// Gets a cell, `None` when the column is absent
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Gets a cell, treating an absent column as empty
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

/// Named sheets of rows
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Workbook {
    sheets: BTreeMap<String, Vec<Row>>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a sheet
    pub fn insert_sheet(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.sheets.insert(name.into(), rows);
    }

    /// Gets the rows of a sheet
    pub fn sheet(&self, name: &str) -> Option<&[Row]> {
        self.sheets.get(name).map(Vec::as_slice)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_cells_become_text() {
        let yaml = r#"
L4:
  - ID: T-1
    Group: 0
    Weight: 2.0
    Ratio: 0.5
    Active: true
    Note: ~
"#;
        let workbook: Workbook = serde_yaml::from_str(yaml).unwrap();
        let rows = workbook.sheet("L4").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("ID"), Some("T-1"));
        assert_eq!(rows[0].get("Group"), Some("0"));
        assert_eq!(rows[0].get("Weight"), Some("2"));
        assert_eq!(rows[0].get("Ratio"), Some("0.5"));
        assert_eq!(rows[0].get("Active"), Some("true"));
        assert_eq!(rows[0].get("Note"), Some(""));
        assert_eq!(rows[0].get("Missing"), None);
        assert_eq!(rows[0].value("Missing"), "");
    }

    #[test]
    fn test_json_rows_keep_order() {
        let json = r#"{"L2_CU": [{"ID": "B"}, {"ID": "A"}, {"ID": "C"}]}"#;
        let workbook: Workbook = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = workbook
            .sheet("L2_CU")
            .unwrap()
            .iter()
            .map(|r| r.value("ID"))
            .collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_rows_from_pairs() {
        let row: Row = [("ID", "X"), ("Requirement Statement", "text")].into_iter().collect();
        let mut workbook = Workbook::new();
        workbook.insert_sheet("L2_CU", vec![row]);

        assert_eq!(workbook.len(), 1);
        assert_eq!(workbook.sheet_names(), vec!["L2_CU"]);
        assert_eq!(workbook.sheet("L2_CU").unwrap()[0].value("ID"), "X");
        assert!(workbook.sheet("L3_CI").is_none());
    }
}
