//! One traceability run: load → link → roll up → report
//!
//! Milestone tracing reads the same kind of workbook and is run on its own.

use std::path::Path;

use crate::config::TraceConfig;
use crate::diagnostics::Diagnostics;
use crate::error::TraceError;
use crate::ingest::{ingest, IngestSummary};
use crate::links::link_graph;
use crate::milestones::{collect_milestones, MilestoneTrace};
use crate::models::TraceGraph;
use crate::report::TraceReport;
use crate::rollup::{self, Rollup};
use crate::source::{create_source, SourceFormat};
use crate::workbook::Workbook;

/// Everything produced by one run
#[derive(Debug, Clone)]
pub struct TraceRun {
    pub graph: TraceGraph,
    pub rollup: Rollup,
    pub report: TraceReport,
    pub diagnostics: Diagnostics,
    pub ingest: IngestSummary,
}

/// Runs the full pipeline over an in-memory workbook
pub fn analyze(workbook: &Workbook, config: &TraceConfig) -> Result<TraceRun, TraceError> {
    let mut diagnostics = Diagnostics::new();

    let (mut graph, ingest) = ingest(workbook, config, &mut diagnostics)?;
    link_graph(&mut graph, &mut diagnostics);
    let rollup = rollup::run(&mut graph, config);
    let report = TraceReport::build(&graph, &rollup);

    if !diagnostics.is_empty() {
        log::warn!("Run finished with {} warnings", diagnostics.len());
    }

    Ok(TraceRun {
        graph,
        rollup,
        report,
        diagnostics,
        ingest,
    })
}

/// Loads a workbook file and runs the full pipeline over it.
///
/// A missing input file fails before anything is parsed.
pub fn analyze_file(
    path: &Path,
    format: Option<SourceFormat>,
    config: &TraceConfig,
) -> Result<TraceRun, TraceError> {
    let source = create_source(path, format);
    let workbook = source.load()?;
    analyze(&workbook, config)
}

/// Loads a workbook file and groups its milestone tracing rows
pub fn trace_milestones_file(
    path: &Path,
    format: Option<SourceFormat>,
    config: &TraceConfig,
) -> Result<MilestoneTrace, TraceError> {
    let source = create_source(path, format);
    let workbook = source.load()?;
    collect_milestones(&workbook, config)
}
