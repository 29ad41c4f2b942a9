//! Report matrices
//!
//! For each adjacent level pair the report holds a detail table (one row per
//! parent/child edge) and a summary table (one row per parent). Rows follow
//! parent input order, then child registration order, so identical input
//! always yields identical tables.

use serde::Serialize;

use crate::models::{RecordStore, RequirementNode, TraceGraph};
use crate::rollup::{LevelRollup, NodeRollup, Rollup};

/// Marker written when a child id does not resolve
pub const NOT_FOUND: &str = "ERROR: NOT FOUND";

/// Child side of a detail row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailChild {
    /// Placeholder for a parent without children
    None,
    /// Child id that is not in the child store
    Missing { id: String },
    Found {
        id: String,
        text: String,
        /// Number of parents the child links to
        parents: usize,
        /// Raw group for L4 children, status and status2 for L3 children
        tags: Vec<String>,
    },
}

/// One row of a detail table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub parent_id: String,
    pub parent_text: String,
    pub child: DetailChild,
}

impl DetailRow {
    fn cells(&self, tag_columns: usize) -> Vec<String> {
        let mut cells = vec![self.parent_id.clone(), self.parent_text.clone()];
        match &self.child {
            DetailChild::None => {
                cells.extend(std::iter::repeat(String::new()).take(3 + tag_columns));
            }
            DetailChild::Missing { id } => {
                cells.push(id.clone());
                cells.push(NOT_FOUND.to_string());
                cells.extend(std::iter::repeat(String::new()).take(1 + tag_columns));
            }
            DetailChild::Found {
                id,
                text,
                parents,
                tags,
            } => {
                cells.push(id.clone());
                cells.push(text.clone());
                cells.push(parents.to_string());
                cells.extend(tags.iter().cloned());
                cells.resize(5 + tag_columns, String::new());
            }
        }
        cells
    }
}

/// One row of a summary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub id: String,
    pub text: String,
    pub rollup: NodeRollup,
}

impl SummaryRow {
    fn cells(&self, with_coverage: bool) -> Vec<String> {
        let counts = &self.rollup.counts;
        let c = &self.rollup.classification;

        let mut cells = vec![
            self.id.clone(),
            self.text.clone(),
            counts.total.to_string(),
            blank_zero(counts.verified as i64),
            blank_zero(counts.expected_near as i64),
            blank_zero(counts.expected_far as i64),
            blank_zero(counts.out as i64),
            blank_zero(counts.other()),
        ];
        if with_coverage {
            cells.push(blank_zero(self.rollup.addressed as i64));
            cells.push(blank_zero(self.rollup.not_addressed as i64));
        }
        cells.push(c.status.label().to_string());
        cells.push(c.status2.label().to_string());
        cells.push(c.percent_complete.map(|p| p.to_string()).unwrap_or_default());
        cells
    }
}

fn blank_zero(n: i64) -> String {
    if n == 0 {
        String::new()
    } else {
        n.to_string()
    }
}

/// A named table ready for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }
}

pub const L3_L4_HEADERS: [&str; 6] = ["SRC_ID", "SRC_Text", "TARG_ID", "TARG_Text", "Parents", "Group"];
pub const L3_HEADERS: [&str; 11] = [
    "L3_ID", "SRC_Text", "Num L4", "Num Ver", "Num Near", "Num Far", "Num OUT", "Num Other",
    "Status1", "Status2", "Percent",
];
pub const L2_L3_HEADERS: [&str; 7] = [
    "SRC_ID", "SRC_Text", "TARG_ID", "TARG_Text", "Parents", "Status1", "Status2",
];
pub const L2_HEADERS: [&str; 13] = [
    "L2_ID", "SRC_Text", "Num L3", "Num Ver", "Num Near", "Num Far", "Num Out", "Num Other",
    "Num Addressed", "Num Not", "Status1", "Status2", "Percent",
];

/// Detail and summary tables for both level pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceReport {
    pub l3_l4: Vec<DetailRow>,
    pub l3: Vec<SummaryRow>,
    pub l2_l3: Vec<DetailRow>,
    pub l2: Vec<SummaryRow>,
}

impl TraceReport {
    /// Builds all four tables from a linked and rolled-up graph
    pub fn build(graph: &TraceGraph, rollup: &Rollup) -> Self {
        let l3_l4 = detail_rows(&graph.l3, &graph.l4, |child| {
            vec![child.group.clone().unwrap_or_default()]
        });
        let l2_l3 = detail_rows(&graph.l2, &graph.l3, |child| match rollup.l3.get(&child.id) {
            Some(r) => vec![
                r.classification.status.label().to_string(),
                r.classification.status2.label().to_string(),
            ],
            None => vec![String::new(), String::new()],
        });

        Self {
            l3_l4,
            l3: summary_rows(&graph.l3, &rollup.l3),
            l2_l3,
            l2: summary_rows(&graph.l2, &rollup.l2),
        }
    }

    /// Tables in output order with their fixed header rows
    pub fn sheets(&self) -> Vec<Sheet> {
        vec![
            Sheet::new(
                "L3_L4",
                &L3_L4_HEADERS,
                self.l3_l4.iter().map(|r| r.cells(1)).collect(),
            ),
            Sheet::new(
                "L3",
                &L3_HEADERS,
                self.l3.iter().map(|r| r.cells(false)).collect(),
            ),
            Sheet::new(
                "L2_L3",
                &L2_L3_HEADERS,
                self.l2_l3.iter().map(|r| r.cells(2)).collect(),
            ),
            Sheet::new(
                "L2",
                &L2_HEADERS,
                self.l2.iter().map(|r| r.cells(true)).collect(),
            ),
        ]
    }
}

fn detail_rows<F>(parents: &RecordStore, children: &RecordStore, tags: F) -> Vec<DetailRow>
where
    F: Fn(&RequirementNode) -> Vec<String>,
{
    let mut rows = Vec::new();

    for parent in parents.in_order() {
        if parent.inbound_links.is_empty() {
            rows.push(DetailRow {
                parent_id: parent.id.clone(),
                parent_text: parent.text.clone(),
                child: DetailChild::None,
            });
            continue;
        }

        for child_id in &parent.inbound_links {
            let child = match children.get(child_id) {
                Some(child) => DetailChild::Found {
                    id: child.id.clone(),
                    text: child.text.clone(),
                    parents: child.outbound_links.len(),
                    tags: tags(child),
                },
                None => DetailChild::Missing {
                    id: child_id.clone(),
                },
            };
            rows.push(DetailRow {
                parent_id: parent.id.clone(),
                parent_text: parent.text.clone(),
                child,
            });
        }
    }

    rows
}

fn summary_rows(parents: &RecordStore, rollup: &LevelRollup) -> Vec<SummaryRow> {
    parents
        .in_order()
        .into_iter()
        .filter_map(|parent| {
            rollup.get(&parent.id).map(|r| SummaryRow {
                id: parent.id.clone(),
                text: parent.text.clone(),
                rollup: *r,
            })
        })
        .collect()
}
