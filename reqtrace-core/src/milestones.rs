//! Milestone tracing tables
//!
//! The tracing sheet relates milestones to the objects they deliver. Only
//! activated rows in the milestone subject domain are used; they are grouped
//! by milestone id and every milestone gets its own Confluence table. The
//! first row of a milestone names it, the rows after it form the table.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{TraceConfig, TracingConfig};
use crate::error::TraceError;
use crate::export::push_html_table;
use crate::workbook::{Row, Workbook};

pub const MILESTONE_HEADERS: [&str; 5] = [
    "Relationship",
    "Object",
    "Sub-Relationship",
    "Sub-Object",
    "Description",
];

/// One used row of the tracing sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceItem {
    pub item_id: String,
    pub subject: String,
    pub relationship: String,
    pub object: String,
    pub sub_relationship: String,
    pub sub_object: String,
    pub description: String,
    /// Position of the source row within the sheet
    pub order: usize,
}

impl TraceItem {
    fn cells(&self) -> Vec<String> {
        vec![
            self.relationship.clone(),
            self.object.clone(),
            self.sub_relationship.clone(),
            self.sub_object.clone(),
            self.description.clone(),
        ]
    }
}

/// All used rows of one milestone, in sheet order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub id: String,
    pub items: Vec<TraceItem>,
}

impl Milestone {
    /// Subject title taken from the milestone's first row
    pub fn subject(&self) -> &str {
        self.items.first().map(|i| i.subject.as_str()).unwrap_or("")
    }

    /// Rows listed in the table; the first row only names the milestone
    pub fn entries(&self) -> &[TraceItem] {
        self.items.get(1..).unwrap_or(&[])
    }

    pub fn title(&self) -> String {
        format!("Requirements for {} ({})", self.id, self.subject())
    }

    /// Renders the milestone as a Confluence panel fragment
    pub fn to_html(&self) -> String {
        let headers: Vec<String> = MILESTONE_HEADERS.iter().map(|h| h.to_string()).collect();
        let rows: Vec<Vec<String>> = self.entries().iter().map(TraceItem::cells).collect();

        let mut output = String::new();
        push_html_table(&mut output, &self.title(), &headers, &rows);
        output.push('\n');
        output
    }

    /// File name of the milestone's table, safe for use as a single path component
    pub fn file_name(&self) -> String {
        let stem: String = self
            .id
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        format!("{}.html", stem)
    }
}

/// Milestones of one tracing sheet, sorted by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MilestoneTrace {
    pub milestones: Vec<Milestone>,
    pub rows: usize,
    pub used: usize,
}

impl MilestoneTrace {
    pub fn get(&self, id: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id == id)
    }
}

fn parse_tracing_row(row: &Row, order: usize, cols: &TracingConfig) -> Option<(String, TraceItem)> {
    if row.value(&cols.activated).trim() != cols.activated_value {
        return None;
    }
    if row.value(&cols.subject_domain).trim() != cols.milestone_domain {
        return None;
    }

    let id = row.value(&cols.subject_id).trim();
    if id.is_empty() {
        log::debug!("{} row {} skipped: missing milestone id", cols.sheet, order);
        return None;
    }

    let item = TraceItem {
        item_id: row.value(&cols.sort_id).trim().to_string(),
        subject: row.value(&cols.subject_title).to_string(),
        relationship: row.value(&cols.relationship).to_string(),
        object: row.value(&cols.object_title).to_string(),
        sub_relationship: row.value(&cols.sub_relationship).to_string(),
        sub_object: row.value(&cols.subobject_title).to_string(),
        description: row.value(&cols.description).to_string(),
        order,
    };
    Some((id.to_string(), item))
}

/// Groups the activated milestone rows of the tracing sheet by milestone id
pub fn collect_milestones(
    workbook: &Workbook,
    config: &TraceConfig,
) -> Result<MilestoneTrace, TraceError> {
    let cols = &config.tracing;
    let Some(rows) = workbook.sheet(&cols.sheet) else {
        log::error!(
            "Sheet {} not found, workbook has: {}",
            cols.sheet,
            workbook.sheet_names().join(", ")
        );
        return Err(TraceError::TracingSheetNotFound(cols.sheet.clone()));
    };

    log::info!("Parsing sheet {}", cols.sheet);
    let mut grouped: BTreeMap<String, Vec<TraceItem>> = BTreeMap::new();
    let mut used = 0;

    for (order, row) in rows.iter().enumerate() {
        if let Some((id, item)) = parse_tracing_row(row, order, cols) {
            grouped.entry(id).or_default().push(item);
            used += 1;
        }
    }
    log::info!(" ...using {} of {} rows", used, rows.len());

    Ok(MilestoneTrace {
        milestones: grouped
            .into_iter()
            .map(|(id, items)| Milestone { id, items })
            .collect(),
        rows: rows.len(),
        used,
    })
}

/// Writes one HTML table per milestone into `dir`, returning the files written
pub fn export_milestones(trace: &MilestoneTrace, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))?;

    let mut written = Vec::with_capacity(trace.milestones.len());
    for milestone in &trace.milestones {
        let path = dir.join(milestone.file_name());
        fs::write(&path, milestone.to_html())
            .with_context(|| format!("Failed to write milestone table to {:?}", path))?;
        log::debug!("Wrote {} ({} rows)", path.display(), milestone.entries().len());
        written.push(path);
    }

    log::info!(
        "Exported {} milestone tables to {}",
        written.len(),
        dir.display()
    );
    Ok(written)
}
