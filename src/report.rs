//! Human-readable and JSON renderings of a [`ComparisonResult`]

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::diff::ComparisonResult;
use crate::error::Result;

/// Output format for reports
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// Render a result in the requested format
pub fn render(result: &ComparisonResult, format: ReportFormat, pretty: bool) -> Result<String> {
    match format {
        ReportFormat::Json if pretty => Ok(serde_json::to_string_pretty(result)?),
        ReportFormat::Json => Ok(serde_json::to_string(result)?),
        ReportFormat::Text => Ok(render_text(result)),
    }
}

/// Plain-text drift report, grouped per target
pub fn render_text(result: &ComparisonResult) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();
    let _ = write_text(&mut out, result);
    out
}

fn write_text(out: &mut String, result: &ComparisonResult) -> std::fmt::Result {
    writeln!(out, "═══════════════════════════════════════════════════════════════════")?;
    writeln!(out, "                     CATALOG DRIFT REPORT                          ")?;
    writeln!(out, "═══════════════════════════════════════════════════════════════════\n")?;

    if result.is_clean() {
        writeln!(out, "No drift detected - all targets match the source\n")?;
    }

    for label in result.drifted_targets() {
        writeln!(out, "Target: {}", label)?;

        let tables: Vec<_> = result
            .table_diffs
            .iter()
            .filter(|d| d.target_label == label)
            .collect();
        if !tables.is_empty() {
            writeln!(out, "  TABLES ({}):", tables.len())?;
            for diff in tables {
                let marker = if diff.source_only { '-' } else { '+' };
                writeln!(out, "    {} {}: {}", marker, diff.table, diff.issue())?;
            }
        }

        let columns: Vec<_> = result
            .column_diffs
            .iter()
            .filter(|d| d.target_label == label)
            .collect();
        if !columns.is_empty() {
            writeln!(out, "  COLUMNS ({}):", columns.len())?;
            for diff in columns {
                writeln!(out, "    ~ {}.{}: {}", diff.table, diff.column, diff.issue)?;
            }
        }

        let indexes: Vec<_> = result
            .index_diffs
            .iter()
            .filter(|d| d.target_label == label)
            .collect();
        if !indexes.is_empty() {
            writeln!(out, "  INDEXES ({}):", indexes.len())?;
            for diff in indexes {
                writeln!(out, "    ~ {}.{}: {}", diff.table, diff.index_name, diff.issue)?;
            }
        }

        writeln!(out)?;
    }

    let summary = &result.summary;
    writeln!(out, "SUMMARY:")?;
    writeln!(out, "   Source tables:         {}", summary.total_tables)?;
    writeln!(out, "   Tables with diffs:     {}", summary.tables_with_diffs)?;
    writeln!(out, "   Only in source:        {}", summary.tables_only_in_source)?;
    writeln!(out, "   Only in targets:       {}", summary.tables_only_in_targets)?;
    writeln!(out, "   Column differences:    {}", summary.columns_with_diffs)?;
    writeln!(out, "   Index differences:     {}", summary.indexes_with_diffs)?;
    Ok(())
}
