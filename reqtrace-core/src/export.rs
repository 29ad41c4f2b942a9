use anyhow::{Context, Result};
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::TraceError;
use crate::report::{Sheet, TraceReport};

/// Directory used when no output path is given
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Output formats for a trace report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Json,
    Yaml,
    Markdown,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Html => write!(f, "html"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Yaml => write!(f, "yaml"),
            ExportFormat::Markdown => write!(f, "md"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" | "htm" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            other => Err(TraceError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl ExportFormat {
    /// Infers the format from a file extension, defaulting to HTML
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
            .unwrap_or(ExportFormat::Html)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Timestamped output path under [`DEFAULT_OUTPUT_DIR`]
pub fn default_output_path(format: ExportFormat) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(DEFAULT_OUTPUT_DIR).join(format!("reqtrace_{}.{}", stamp, format.extension()))
}

/// Renders the report's sheets in the given format
pub fn render(report: &TraceReport, format: ExportFormat) -> Result<String> {
    let sheets = report.sheets();
    let output = match format {
        ExportFormat::Html => render_html(&sheets),
        ExportFormat::Markdown => render_markdown(&sheets),
        ExportFormat::Json => serde_json::to_string_pretty(&sheets)?,
        ExportFormat::Yaml => serde_yaml::to_string(&sheets)?,
    };
    Ok(output)
}

/// Writes the report to `output_path`, creating parent directories
pub fn export_report(report: &TraceReport, output_path: &Path, format: ExportFormat) -> Result<()> {
    let content = render(report, format)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {:?}", parent))?;
        }
    }

    fs::write(output_path, content)
        .with_context(|| format!("Failed to write report to {:?}", output_path))?;

    log::info!(
        "Exported {} report: {} ({} L3 / {} L2 requirements)",
        format,
        output_path.display(),
        report.l3.len(),
        report.l2.len()
    );

    Ok(())
}

const HTABLE_START: &str = r#"
<div class="panel" style="border-width: 1px;">
  <div class="panelContent">
    <h3>%%TITLE%%</h3>
    <div class='table-wrap'>
      <table class='confluenceTable'>"#;

const HTABLE_END: &str = r#"
      </table>
    </div>
  </div>
</div>"#;

const HTABLE_SEP: &str = r#"
<p>
  <br class="atl-forced-newline" />
</p>"#;

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '\n' => escaped.push_str("<br/>"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Appends one Confluence panel holding a titled table
pub(crate) fn push_html_table(
    output: &mut String,
    title: &str,
    headers: &[String],
    rows: &[Vec<String>],
) {
    output.push_str(&HTABLE_START.replace("%%TITLE%%", &escape_html(title)));

    output.push_str("\n        <tr>");
    for header in headers {
        output.push_str(&format!(
            "\n          <th class='confluenceTh'>{}</th>",
            escape_html(header)
        ));
    }
    output.push_str("\n        </tr>");

    for row in rows {
        output.push_str("\n        <tr>");
        for cell in row {
            output.push_str(&format!(
                "\n          <td class='confluenceTd'>{}</td>",
                escape_html(cell)
            ));
        }
        output.push_str("\n        </tr>");
    }

    output.push_str(HTABLE_END);
}

fn render_html(sheets: &[Sheet]) -> String {
    let mut output = String::from("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Requirements Trace</title></head>\n<body>");

    for (i, sheet) in sheets.iter().enumerate() {
        if i > 0 {
            output.push_str(HTABLE_SEP);
        }
        push_html_table(&mut output, &sheet.name, &sheet.headers, &sheet.rows);
    }

    output.push_str("\n</body>\n</html>\n");
    output
}

fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

fn render_markdown(sheets: &[Sheet]) -> String {
    let mut output = String::from("# Requirements Trace\n");

    for sheet in sheets {
        output.push_str(&format!("\n## {}\n\n", sheet.name));
        output.push_str(&format!("| {} |\n", sheet.headers.join(" | ")));
        output.push_str(&format!("|{}\n", "---|".repeat(sheet.headers.len())));
        for row in &sheet.rows {
            let cells: Vec<String> = row.iter().map(|c| escape_markdown(c)).collect();
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
    }

    output
}
