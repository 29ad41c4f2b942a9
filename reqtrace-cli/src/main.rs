mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use colored::{ColoredString, Colorize};
use log::LevelFilter;
use std::path::{Path, PathBuf};

use reqtrace_core::{
    analyze_file, default_output_path, export_milestones, export_report, trace_milestones_file,
    ExportFormat, Level, LevelRollup, MilestoneTrace, Status, TraceConfig, TraceRun,
};

use crate::cli::Cli;

/// Input used when no path is given
const DEFAULT_INPUT: &str = "requirements.yaml";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = TraceConfig::resolve(cli.config.as_deref())?;

    if let Some(path) = &cli.dump_config {
        config.save(path)?;
        if !cli.quiet {
            println!("{} {}", "Configuration written to".green(), path.display());
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    if cli.milestones {
        run_milestones(cli, &config, &input)
    } else {
        run_report(cli, &config, &input)
    }
}

fn run_report(cli: &Cli, config: &TraceConfig, input: &Path) -> Result<()> {
    // an unusable format must fail before the workbook is read
    let format = resolve_format(cli.format.as_deref(), cli.output.as_deref())?;

    let run = analyze_file(input, None, config)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(format));
    export_report(&run.report, &output, format)?;

    if !cli.quiet {
        print_summary(input, &run, &output, format);
    }

    Ok(())
}

fn run_milestones(cli: &Cli, config: &TraceConfig, input: &Path) -> Result<()> {
    let trace = trace_milestones_file(input, None, config)
        .with_context(|| format!("Failed to read milestones from {}", input.display()))?;

    let dir = cli
        .output
        .clone()
        .unwrap_or_else(|| config.tracing.output_dir.clone());
    let written = export_milestones(&trace, &dir)?;

    if !cli.quiet {
        print_milestone_summary(input, config, &trace, &dir, written.len());
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, _) => LevelFilter::Debug,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Picks the report format: explicit flag, then output extension, then HTML
fn resolve_format(flag: Option<&str>, output: Option<&Path>) -> Result<ExportFormat> {
    if let Some(name) = flag {
        return Ok(name.parse()?);
    }
    Ok(output.map(ExportFormat::from_path).unwrap_or(ExportFormat::Html))
}

fn status_label(status: Status) -> ColoredString {
    let label = match status {
        Status::Empty => "(blank)",
        other => other.label(),
    };
    match status {
        Status::Verified => label.green(),
        Status::ExpectedNear | Status::ExpectedFar | Status::Partial => label.yellow(),
        Status::MissingChildren => label.red(),
        Status::Out | Status::Other => label.normal(),
        Status::Empty => label.dimmed(),
    }
}

fn print_histogram(level: Level, rollup: &LevelRollup) {
    println!("{} status:", level.to_string().bold());
    for (status, count) in rollup.status_histogram() {
        println!("  {:<18} {}", status_label(status), count);
    }
}

fn print_summary(input: &Path, run: &TraceRun, output: &Path, format: ExportFormat) {
    println!("{} {}", "Requirements trace for".bold(), input.display());
    for sheet in &run.ingest.sheets {
        println!(
            "  {} {}: using {} of {} rows",
            sheet.level, sheet.sheet, sheet.used, sheet.rows
        );
    }
    println!();

    print_histogram(Level::L3, &run.rollup.l3);
    print_histogram(Level::L2, &run.rollup.l2);
    println!();

    let diagnostics = &run.diagnostics;
    if diagnostics.is_empty() {
        println!("{}", "No warnings".green());
    } else {
        println!(
            "{} duplicate ids: {}, dangling links: {}, duplicate links: {}",
            format!("{} warnings.", diagnostics.len()).yellow(),
            diagnostics.duplicate_ids(),
            diagnostics.dangling_links(),
            diagnostics.duplicate_links()
        );
    }

    println!(
        "{} {} ({})",
        "Report written to".green(),
        output.display(),
        format
    );
}

fn print_milestone_summary(
    input: &Path,
    config: &TraceConfig,
    trace: &MilestoneTrace,
    dir: &Path,
    files: usize,
) {
    println!("{} {}", "Milestone tracing for".bold(), input.display());
    println!(
        "  {}: using {} of {} rows",
        config.tracing.sheet, trace.used, trace.rows
    );
    for milestone in &trace.milestones {
        println!(
            "  {:<12} {} ({} rows)",
            milestone.id.bold(),
            milestone.subject(),
            milestone.entries().len()
        );
    }
    println!();
    println!(
        "{} {} tables to {}",
        "Wrote".green(),
        files,
        dir.display()
    );
}
