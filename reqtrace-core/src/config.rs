use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TraceError;
use crate::models::Level;
use crate::status::Category;

/// Environment variable naming a configuration file
pub const CONFIG_ENV_VAR: &str = "REQTRACE_CONFIG";

/// Sheet holding each level's rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetNames {
    pub l2: String,
    pub l3: String,
    pub l4: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            l2: "L2_CU".to_string(),
            l3: "L3_CI".to_string(),
            l4: "L4".to_string(),
        }
    }
}

/// Column headers read from each row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnNames {
    pub id: String,
    pub text: String,
    /// L3 column listing the L2 requirements it refines
    pub l2_link: String,
    /// L4 column listing the L3 requirements it refines
    pub l3_link: String,
    pub group: String,
    pub item_class: String,
    pub item_type: String,
    pub proposed_change: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            id: "ID".to_string(),
            text: "Requirement Statement".to_string(),
            l2_link: "L2_CU".to_string(),
            l3_link: "L3 Link".to_string(),
            group: "Group".to_string(),
            item_class: "Item Class".to_string(),
            item_type: "Item Type".to_string(),
            proposed_change: "Proposed Change".to_string(),
        }
    }
}

/// Prefixes turning raw link tokens into ids of the parent level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkPrefixes {
    /// Applied to tokens in the L3 → L2 link column
    pub l2: String,
    /// Applied to tokens in the L4 → L3 link column
    pub l3: String,
}

impl Default for LinkPrefixes {
    fn default() -> Self {
        Self {
            l2: "L2-CU-RQ-".to_string(),
            l3: "L3-CI-RQ-".to_string(),
        }
    }
}

/// Milestone tracing sheet: which rows are read and where tables are written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TracingConfig {
    pub sheet: String,
    /// Rows are only used when this column holds `activated_value`
    pub activated: String,
    pub activated_value: String,
    /// Rows are only used when this column holds `milestone_domain`
    pub subject_domain: String,
    pub milestone_domain: String,
    pub subject_id: String,
    pub sort_id: String,
    pub subject_title: String,
    pub relationship: String,
    pub object_title: String,
    pub sub_relationship: String,
    pub subobject_title: String,
    pub description: String,
    /// Directory receiving one HTML table per milestone
    pub output_dir: PathBuf,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            sheet: "Example v2".to_string(),
            activated: "Activated".to_string(),
            activated_value: "1".to_string(),
            subject_domain: "Subject Domain".to_string(),
            milestone_domain: "Milestone".to_string(),
            subject_id: "Subject ID".to_string(),
            sort_id: "Sort ID".to_string(),
            subject_title: "Subject Title".to_string(),
            relationship: "Relationship".to_string(),
            object_title: "Object Title".to_string(),
            sub_relationship: "Sub-Relationship".to_string(),
            subobject_title: "Subobject Title".to_string(),
            description: "Description".to_string(),
            output_dir: PathBuf::from("output/tracing"),
        }
    }
}

/// Settings for one traceability run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TraceConfig {
    pub sheets: SheetNames,
    pub columns: ColumnNames,
    pub prefixes: LinkPrefixes,
    /// L4 rows are only used when their item class is listed here
    pub approved_item_classes: Vec<String>,
    /// L4 item type whose proposed change is ignored
    pub deprecated_item_type: String,
    /// L4 group tag to verification category; unlisted tags count as other
    pub group_categories: BTreeMap<String, Category>,
    /// Substring marking a requirement that must have children
    pub shall_marker: String,
    pub tracing: TracingConfig,
}

impl Default for TraceConfig {
    fn default() -> Self {
        let mut group_categories = BTreeMap::new();
        group_categories.insert("0".to_string(), Category::Verified);
        group_categories.insert("1".to_string(), Category::ExpectedNear);
        group_categories.insert("2".to_string(), Category::ExpectedFar);
        group_categories.insert("5".to_string(), Category::Out);

        Self {
            sheets: SheetNames::default(),
            columns: ColumnNames::default(),
            prefixes: LinkPrefixes::default(),
            approved_item_classes: vec!["Approved Req".to_string(), "Approved Int".to_string()],
            deprecated_item_type: "Deprecated".to_string(),
            group_categories,
            shall_marker: " shall ".to_string(),
            tracing: TracingConfig::default(),
        }
    }
}

impl TraceConfig {
    /// Loads a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TraceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| TraceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Saves the configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Resolves the configuration for a run.
    ///
    /// An explicit path wins, then `REQTRACE_CONFIG`, then the user config
    /// file if one exists. Otherwise defaults are used. A named file that
    /// cannot be loaded is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, TraceError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(PathBuf::from(path));
        }

        if let Some(path) = get_config_path() {
            if path.exists() {
                log::debug!("Using config file {}", path.display());
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Sheet name for a level
    pub fn sheet_for(&self, level: Level) -> &str {
        match level {
            Level::L2 => &self.sheets.l2,
            Level::L3 => &self.sheets.l3,
            Level::L4 => &self.sheets.l4,
        }
    }

    /// Category for a raw L4 group tag
    pub fn category_for_group(&self, group: Option<&str>) -> Category {
        group
            .map(str::trim)
            .and_then(|g| self.group_categories.get(g))
            .copied()
            .unwrap_or(Category::Other)
    }

    pub fn is_approved_item_class(&self, item_class: &str) -> bool {
        self.approved_item_classes
            .iter()
            .any(|c| c == item_class.trim())
    }
}

/// Gets the per-user configuration directory
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reqtrace"))
}

/// Gets the path of the per-user configuration file
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}
