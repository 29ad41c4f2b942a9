pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod ingest;
pub mod links;
pub mod milestones;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod rollup;
pub mod source;
pub mod status;
pub mod workbook;

// Re-export commonly used types
pub use config::{get_config_dir, get_config_path, TraceConfig, TracingConfig, CONFIG_ENV_VAR};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::TraceError;
pub use export::{default_output_path, export_report, ExportFormat};
pub use ingest::{IngestSummary, SheetSummary};
pub use milestones::{collect_milestones, export_milestones, Milestone, MilestoneTrace, TraceItem};
pub use models::{Level, RecordStore, RequirementNode, TraceGraph};
pub use pipeline::{analyze, analyze_file, trace_milestones_file, TraceRun};
pub use report::{DetailChild, DetailRow, Sheet, SummaryRow, TraceReport};
pub use rollup::{LevelRollup, NodeRollup, Rollup};
pub use source::{create_source, SourceFormat, WorkbookSource};
pub use status::{classify, Category, ChildCounts, Classification, Coverage, Status};
pub use workbook::{Row, Workbook};
