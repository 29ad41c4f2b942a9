use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Requirements traceability rollup: links L2/L3/L4 requirements and reports verification status"
)]
pub struct Cli {
    /// Workbook with the L2, L3 and L4 sheets (YAML or JSON)
    pub input: Option<PathBuf>,

    /// Report file to write; defaults to a timestamped file under output/.
    /// With --milestones, the directory receiving the milestone tables.
    pub output: Option<PathBuf>,

    /// Configuration file (sheet names, columns, link prefixes, group mapping)
    #[clap(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Report format (html, json, yaml, md); inferred from the output path if omitted
    #[clap(long, short = 'f')]
    pub format: Option<String>,

    /// Write one HTML table per milestone from the tracing sheet instead of the rollup report
    #[clap(long, short = 'm', conflicts_with = "format")]
    pub milestones: bool,

    /// Write the effective configuration to this file and exit
    #[clap(long, value_name = "PATH")]
    pub dump_config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[clap(long, short = 'q')]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments_are_optional() {
        let cli = Cli::try_parse_from(["reqtrace"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.output.is_none());
        assert_eq!(cli.verbose, 0);

        let cli = Cli::try_parse_from(["reqtrace", "in.yaml", "out.html", "-vv"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("in.yaml")));
        assert_eq!(cli.output, Some(PathBuf::from("out.html")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "reqtrace",
            "in.json",
            "--config",
            "trace.yaml",
            "--format",
            "md",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("trace.yaml")));
        assert_eq!(cli.format.as_deref(), Some("md"));
        assert!(cli.quiet);
    }

    #[test]
    fn test_milestones_mode() {
        let cli = Cli::try_parse_from(["reqtrace", "trace.yaml", "tables", "-m"]).unwrap();
        assert!(cli.milestones);
        assert_eq!(cli.output, Some(PathBuf::from("tables")));

        assert!(Cli::try_parse_from(["reqtrace", "--milestones", "--format", "md"]).is_err());
    }

    #[test]
    fn test_dump_config() {
        let cli = Cli::try_parse_from(["reqtrace", "--dump-config", "trace.yaml"]).unwrap();
        assert_eq!(cli.dump_config, Some(PathBuf::from("trace.yaml")));
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_rejects_third_positional() {
        assert!(Cli::try_parse_from(["reqtrace", "a", "b", "c"]).is_err());
    }
}
