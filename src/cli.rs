//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::dashboard::{DashboardKind, Request};
use crate::models::CategorySelector;
use clap::Parser;
use std::path::PathBuf;

/// esgdash - ESG disclosure dashboards
///
/// Ranks the most reported indicators of a company, compares firms within an
/// industry and maps indicator prevalence across industries and years.
/// Renders SVG, HTML, JSON or Markdown, or serves the dashboards locally.
///
/// Examples:
///   esgdash --dashboard frequency --company "Acme Energy" --category environmental
///   esgdash --dashboard leaders --industry Energy --format markdown
///   esgdash --dashboard heatmap --year1 2020 --year2 2021 --category all --format html
///   esgdash --serve
///   esgdash --list
///   esgdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dashboard to render
    #[arg(
        short,
        long,
        value_name = "NAME",
        required_unless_present_any = ["serve", "list", "init_config"]
    )]
    pub dashboard: Option<DashboardKind>,

    /// Path to the disclosure dataset CSV
    ///
    /// Can also be set via ESGDASH_DATA env var or .esgdash.toml config.
    #[arg(long, value_name = "FILE", env = "ESGDASH_DATA")]
    pub data: Option<PathBuf>,

    /// Path to the indicator alias CSV (Alias,indicator)
    #[arg(long, value_name = "FILE", env = "ESGDASH_ALIASES")]
    pub aliases: Option<PathBuf>,

    /// Company to chart (frequency dashboard)
    #[arg(long, value_name = "NAME")]
    pub company: Option<String>,

    /// Industry to rank (leaders dashboard)
    #[arg(long, value_name = "NAME")]
    pub industry: Option<String>,

    /// Indicator category: all, environmental, social or governance
    ///
    /// The dropdown values top_5, top_5_environmental, ... are accepted too.
    #[arg(long, value_name = "CATEGORY", ignore_case = true)]
    pub category: Option<CategorySelector>,

    /// First year to compare (heatmap dashboard)
    #[arg(long, value_name = "YEAR")]
    pub year1: Option<i32>,

    /// Second year to compare (heatmap dashboard)
    #[arg(long, value_name = "YEAR")]
    pub year2: Option<i32>,

    /// Output file path
    ///
    /// Defaults to the config's output path with the format's extension.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (svg, html, json, markdown)
    #[arg(long, default_value = "svg", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Serve the dashboards over HTTP instead of writing a file
    #[arg(long)]
    pub serve: bool,

    /// Address to bind when serving
    #[arg(long, value_name = "ADDR", env = "ESGDASH_BIND")]
    pub bind: Option<String>,

    /// Number of indicators in the frequency chart
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Minimum distinct reporting years for the leaders dashboard
    #[arg(long, value_name = "YEARS")]
    pub min_years: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .esgdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the available companies, industries and years, then exit
    #[arg(long)]
    pub list: bool,

    /// Generate a default .esgdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for rendered dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// SVG chart (default)
    #[default]
    Svg,
    /// Standalone HTML page
    Html,
    /// JSON result with metadata
    Json,
    /// Markdown table (leaders only)
    Markdown,
}

impl OutputFormat {
    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.format == OutputFormat::Markdown
            && !self.serve
            && self.dashboard != Some(DashboardKind::Leaders)
        {
            return Err("Markdown output is only available for the leaders dashboard".to_string());
        }

        if self.top_n == Some(0) {
            return Err("--top-n must be at least 1".to_string());
        }

        // Validate dataset path if provided
        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Dataset file does not exist: {}", data.display()));
            }
            if data.is_dir() {
                return Err(format!("Dataset path is a directory: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings. `config_verbose`
    /// is the config file's `general.verbose`; `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The dropdown values given on the command line, as a request for
    /// `kind`.
    pub fn request(&self, kind: DashboardKind) -> Request {
        match kind {
            DashboardKind::Frequency => Request::Frequency {
                company: self.company.clone(),
                category: self.category,
            },
            DashboardKind::Leaders => Request::Leaders {
                industry: self.industry.clone(),
            },
            DashboardKind::Heatmap => Request::Heatmap {
                year1: self.year1,
                year2: self.year2,
                category: self.category,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            dashboard: Some(DashboardKind::Frequency),
            data: None,
            aliases: None,
            company: Some("Acme Energy".to_string()),
            industry: None,
            category: Some(CategorySelector::All),
            year1: None,
            year2: None,
            output: None,
            format: OutputFormat::Svg,
            serve: false,
            bind: None,
            top_n: None,
            min_years: None,
            config: None,
            verbose: false,
            quiet: false,
            list: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_markdown_requires_leaders() {
        let mut args = make_args();
        args.format = OutputFormat::Markdown;
        assert!(args.validate().is_err());

        args.dashboard = Some(DashboardKind::Leaders);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_dataset() {
        let mut args = make_args();
        args.data = Some(PathBuf::from("/definitely/not/here.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_request_for_heatmap() {
        let mut args = make_args();
        args.year1 = Some(2020);

        assert_eq!(
            args.request(DashboardKind::Heatmap),
            Request::Heatmap {
                year1: Some(2020),
                year2: None,
                category: Some(CategorySelector::All),
            }
        );
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "esgdash",
            "--dashboard",
            "leaders",
            "--industry",
            "Energy",
            "--format",
            "markdown",
        ])
        .unwrap();

        assert_eq!(args.dashboard, Some(DashboardKind::Leaders));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(OutputFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_category_accepts_dropdown_values() {
        let args = Args::try_parse_from([
            "esgdash",
            "--dashboard",
            "frequency",
            "--category",
            "top_5_social",
        ])
        .unwrap();

        assert_eq!(args.category, Some(CategorySelector::Social));
    }

    #[test]
    fn test_dashboard_not_required_when_serving() {
        assert!(Args::try_parse_from(["esgdash", "--serve"]).is_ok());
        assert!(Args::try_parse_from(["esgdash", "--company", "Acme"]).is_err());
    }
}
