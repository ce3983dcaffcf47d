//! File exports: JSON for every dashboard, Markdown for the leaders table.

use crate::dashboard::{DashboardKind, DashboardOutput};
use crate::models::{ExportMetadata, LeaderBoard};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

/// Metadata for a result computed now from `dataset`.
pub fn export_metadata(kind: DashboardKind, dataset: &str) -> ExportMetadata {
    ExportMetadata {
        dashboard: kind.to_string(),
        generated_at: Utc::now(),
        dataset: dataset.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    metadata: &'a ExportMetadata,
    #[serde(flatten)]
    output: &'a DashboardOutput,
}

/// Serialize a result with its metadata as pretty JSON.
pub fn generate_json_report(output: &DashboardOutput, metadata: &ExportMetadata) -> Result<String> {
    serde_json::to_string_pretty(&JsonExport { metadata, output }).map_err(Into::into)
}

/// Leaders table as a Markdown document.
pub fn generate_markdown_report(board: &LeaderBoard, metadata: &ExportMetadata) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", board.title()));

    output.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset));
    output.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "- **Minimum years reported:** {}\n\n",
        board.min_years_reported
    ));

    if board.companies.is_empty() {
        output.push_str("_No firms met the reporting threshold._\n");
    } else {
        output.push_str("| Rank | Company | E | S | G | Years Reported | Total |\n");
        output.push_str("|-----:|---------|--:|--:|--:|---------------:|------:|\n");
        for (i, c) in board.companies.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                i + 1,
                c.company.replace('|', "\\|"),
                c.environmental,
                c.social,
                c.governance,
                c.years_reported,
                c.total
            ));
        }
    }

    output.push_str(&format!(
        "\n---\n\n*Generated by esgdash v{}*\n",
        metadata.version
    ));
    output
}

/// Write rendered output to disk.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output to {}", path.display()))
}
