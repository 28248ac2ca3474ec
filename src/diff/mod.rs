//! Difference records and the aggregated comparison result
//!
//! Each comparison dimension has its own record type. Every record carries
//! the table it belongs to and the label of the target that produced it.
//! [`ComparisonResult`] collects the records of all targets together with
//! the [`SummaryCounters`] downstream reporting relies on.

pub mod columns;
pub mod indexes;
pub mod tables;

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;
use crate::schema::{ColumnDescriptor, DefaultLiteral, IndexDescriptor, IndexKind};

pub use columns::{compare_columns, defaults_match};
pub use indexes::compare_indexes;
pub use tables::{compare_tables, TableSetDiff};

/// A table present on only one side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDifference {
    pub table: String,
    pub source_only: bool,
    pub target_only: bool,
    pub target_label: String,
}

impl TableDifference {
    pub fn source_only(table: impl Into<String>, target_label: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            source_only: true,
            target_only: false,
            target_label: target_label.into(),
        }
    }

    pub fn target_only(table: impl Into<String>, target_label: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            source_only: false,
            target_only: true,
            target_label: target_label.into(),
        }
    }

    pub fn issue(&self) -> &'static str {
        if self.source_only {
            "Table exists in source but missing in target"
        } else {
            "Table exists in target but missing in source"
        }
    }
}

/// Compared attributes of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAttributes {
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
    pub default: Option<DefaultLiteral>,
    pub extra: String,
}

impl From<&ColumnDescriptor> for ColumnAttributes {
    fn from(column: &ColumnDescriptor) -> Self {
        Self {
            column_type: column.column_type.clone(),
            nullable: column.nullable,
            default: column.default.clone(),
            extra: column.extra.clone(),
        }
    }
}

/// A column missing on one side, or present on both with differing attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDifference {
    pub table: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ColumnAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ColumnAttributes>,
    pub issue: String,
    pub target_label: String,
}

/// Compared attributes of one index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexAttributes {
    pub columns: Vec<String>,
    #[serde(rename = "type")]
    pub kind: IndexKind,
}

impl From<&IndexDescriptor> for IndexAttributes {
    fn from(index: &IndexDescriptor) -> Self {
        Self {
            columns: index.columns.clone(),
            kind: index.kind,
        }
    }
}

/// An index missing on one side, or present on both with differing definitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDifference {
    pub table: String,
    pub index_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<IndexAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<IndexAttributes>,
    pub issue: String,
    pub target_label: String,
}

/// Counters accumulated over every target of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounters {
    /// Number of tables in the source
    pub total_tables: usize,
    /// Table/target pairs with column or index drift
    pub tables_with_diffs: usize,
    pub tables_only_in_source: usize,
    pub tables_only_in_targets: usize,
    pub columns_with_diffs: usize,
    pub indexes_with_diffs: usize,
}

/// Aggregated outcome of comparing one source against its targets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub table_diffs: Vec<TableDifference>,
    pub column_diffs: Vec<ColumnDifference>,
    pub index_diffs: Vec<IndexDifference>,
    pub summary: SummaryCounters,
}

impl ComparisonResult {
    pub fn new(total_tables: usize) -> Self {
        Self {
            summary: SummaryCounters {
                total_tables,
                ..SummaryCounters::default()
            },
            ..Self::default()
        }
    }

    /// Returns true if no target drifted from the source
    pub fn is_clean(&self) -> bool {
        self.table_diffs.is_empty() && self.column_diffs.is_empty() && self.index_diffs.is_empty()
    }

    /// Record the table set reconciliation of one target
    pub fn record_tables(&mut self, diff: &TableSetDiff) {
        self.summary.tables_only_in_source += diff.source_only_count();
        self.summary.tables_only_in_targets += diff.target_only_count();
        self.table_diffs.extend(diff.differences.iter().cloned());
    }

    /// Record the column differences of one table; returns true if there were any
    pub fn record_columns(&mut self, diffs: Vec<ColumnDifference>) -> bool {
        self.summary.columns_with_diffs += diffs.len();
        let drifted = !diffs.is_empty();
        self.column_diffs.extend(diffs);
        drifted
    }

    /// Record the index differences of one table; returns true if there were any
    pub fn record_indexes(&mut self, diffs: Vec<IndexDifference>) -> bool {
        self.summary.indexes_with_diffs += diffs.len();
        let drifted = !diffs.is_empty();
        self.index_diffs.extend(diffs);
        drifted
    }

    /// Count one table/target pair with drift
    pub fn record_drifted_table(&mut self) {
        self.summary.tables_with_diffs += 1;
    }

    /// Labels of the targets that produced at least one record, in first-seen order
    pub fn drifted_targets(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        let all = self
            .table_diffs
            .iter()
            .map(|d| d.target_label.as_str())
            .chain(self.column_diffs.iter().map(|d| d.target_label.as_str()))
            .chain(self.index_diffs.iter().map(|d| d.target_label.as_str()));
        for label in all {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// SHA256 fingerprint of the canonical JSON form
    pub fn fingerprint(&self) -> crate::Result<Checksum> {
        let canonical = serde_json::to_string(self)?;
        Ok(Checksum::from_content(&canonical))
    }
}
