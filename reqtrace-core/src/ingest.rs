//! Turns workbook rows into requirement nodes
//!
//! Each level has its own row parser, looked up once from [`ROW_PARSERS`].
//! Parsers only build nodes; link registration happens after all levels are
//! loaded (see [`crate::links::link_graph`]).

use serde::Serialize;

use crate::config::TraceConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::TraceError;
use crate::links::resolve;
use crate::models::{Level, RequirementNode, TraceGraph};
use crate::workbook::{Row, Workbook};

/// What a row parser decided about one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Keep(RequirementNode),
    Skip(&'static str),
}

/// Parses one row of a level's sheet; `order` is the row position
pub type RowParser = fn(&Row, usize, &TraceConfig) -> RowOutcome;

/// Row parser for every level, coarsest first, indexed by `Level as usize`
pub const ROW_PARSERS: [(Level, RowParser); 3] = [
    (Level::L2, parse_l2_row as RowParser),
    (Level::L3, parse_l3_row as RowParser),
    (Level::L4, parse_l4_row as RowParser),
];

/// Row usage for one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub level: Level,
    pub sheet: String,
    pub rows: usize,
    pub used: usize,
}

/// Row usage for all sheets of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub sheets: Vec<SheetSummary>,
}

impl IngestSummary {
    pub fn for_level(&self, level: Level) -> Option<&SheetSummary> {
        self.sheets.iter().find(|s| s.level == level)
    }
}

fn parse_l2_row(row: &Row, order: usize, config: &TraceConfig) -> RowOutcome {
    let cols = &config.columns;
    let id = row.value(&cols.id).trim();
    if id.is_empty() {
        return RowOutcome::Skip("missing id");
    }

    RowOutcome::Keep(RequirementNode::new(id, Level::L2, row.value(&cols.text), order))
}

fn parse_l3_row(row: &Row, order: usize, config: &TraceConfig) -> RowOutcome {
    let cols = &config.columns;
    let id = row.value(&cols.id).trim();
    if id.is_empty() {
        return RowOutcome::Skip("missing id");
    }

    let text = row.value(&cols.text);
    if text.trim().is_empty() && row.value(&cols.item_class).trim().is_empty() {
        return RowOutcome::Skip("blank text and item class");
    }

    let links = resolve(row.get(&cols.l2_link), &config.prefixes.l2);
    RowOutcome::Keep(RequirementNode::new(id, Level::L3, text, order).with_links(links))
}

fn parse_l4_row(row: &Row, order: usize, config: &TraceConfig) -> RowOutcome {
    let cols = &config.columns;
    if !config.is_approved_item_class(row.value(&cols.item_class)) {
        return RowOutcome::Skip("item class not approved");
    }

    let id = row.value(&cols.id).trim();
    if id.is_empty() {
        return RowOutcome::Skip("missing id");
    }

    let item_type = row.value(&cols.item_type).trim();
    let proposed = row.value(&cols.proposed_change);
    let text = if !proposed.trim().is_empty() && item_type != config.deprecated_item_type {
        proposed
    } else {
        row.value(&cols.text)
    };

    let links = resolve(row.get(&cols.l3_link), &config.prefixes.l3);
    let mut node = RequirementNode::new(id, Level::L4, text, order)
        .with_links(links)
        .with_group(row.value(&cols.group).trim());
    if !item_type.is_empty() {
        node.item_type = Some(item_type.to_string());
    }

    RowOutcome::Keep(node)
}

/// Loads every level's sheet into a fresh graph.
///
/// A missing sheet is fatal. Duplicate ids are reported and the later row
/// replaces the earlier one.
pub fn ingest(
    workbook: &Workbook,
    config: &TraceConfig,
    diagnostics: &mut Diagnostics,
) -> Result<(TraceGraph, IngestSummary), TraceError> {
    let mut graph = TraceGraph::new();
    let mut summary = IngestSummary::default();

    for (level, parser) in ROW_PARSERS {
        let sheet = config.sheet_for(level);
        let Some(rows) = workbook.sheet(sheet) else {
            log::error!(
                "Sheet {} not found, workbook has: {}",
                sheet,
                workbook.sheet_names().join(", ")
            );
            return Err(TraceError::SheetNotFound {
                sheet: sheet.to_string(),
                level,
            });
        };

        log::info!("Parsing sheet {}", sheet);
        let store = graph.store_mut(level);
        let mut used = 0;

        for (order, row) in rows.iter().enumerate() {
            match parser(row, order, config) {
                RowOutcome::Keep(node) => {
                    used += 1;
                    let id = node.id.clone();
                    if store.insert(node).is_some() {
                        diagnostics.push(Diagnostic::DuplicateId { level, id });
                    }
                }
                RowOutcome::Skip(reason) => {
                    log::debug!("{} row {} skipped: {}", sheet, order, reason);
                }
            }
        }

        log::info!(" ...using {} of {} rows", used, rows.len());
        summary.sheets.push(SheetSummary {
            level,
            sheet: sheet.to_string(),
            rows: rows.len(),
            used,
        });
    }

    Ok((graph, summary))
}
