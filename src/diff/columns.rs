//! Column reconciliation for one table

use indexmap::IndexMap;

use super::{ColumnAttributes, ColumnDifference};
use crate::schema::{ColumnDescriptor, DefaultLiteral};

const MISSING_IN_TARGET: &str = "Column exists in source but missing in target";
const MISSING_IN_SOURCE: &str = "Column exists in target but missing in source";

/// Whether two column defaults count as equal.
///
/// Both absent, or both present with identical string forms. No deeper
/// equivalence is attempted: `'0'` and `0` differ.
pub fn defaults_match(source: Option<&DefaultLiteral>, target: Option<&DefaultLiteral>) -> bool {
    match (source, target) {
        (None, None) => true,
        (Some(a), Some(b)) => a.to_string() == b.to_string(),
        _ => false,
    }
}

fn nullability(nullable: bool) -> &'static str {
    if nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

fn default_display(default: Option<&DefaultLiteral>) -> String {
    default.map_or_else(|| "NULL".to_string(), |d| d.to_string())
}

fn extra_display(extra: &str) -> &str {
    if extra.is_empty() {
        "none"
    } else {
        extra
    }
}

/// Describe every attribute that differs between two same-named columns
fn attribute_mismatches(source: &ColumnDescriptor, target: &ColumnDescriptor) -> Vec<String> {
    let mut issues = Vec::new();

    if source.column_type != target.column_type {
        issues.push(format!(
            "type mismatch ({} vs {})",
            source.column_type, target.column_type
        ));
    }

    if source.nullable != target.nullable {
        issues.push(format!(
            "nullability mismatch ({} vs {})",
            nullability(source.nullable),
            nullability(target.nullable)
        ));
    }

    if source.extra != target.extra {
        issues.push(format!(
            "extra attributes mismatch ({} vs {})",
            extra_display(&source.extra),
            extra_display(&target.extra)
        ));
    }

    if !defaults_match(source.default.as_ref(), target.default.as_ref()) {
        issues.push(format!(
            "default value mismatch ({} vs {})",
            default_display(source.default.as_ref()),
            default_display(target.default.as_ref())
        ));
    }

    issues
}

/// Compare the columns of one table between source and a target.
///
/// Records come out in source ordinal order (missing or mismatched), followed
/// by target-only columns in target ordinal order. A column yields at most one
/// record.
pub fn compare_columns(
    table: &str,
    source: &[ColumnDescriptor],
    target: &[ColumnDescriptor],
    target_label: &str,
) -> Vec<ColumnDifference> {
    let source_map: IndexMap<&str, &ColumnDescriptor> =
        source.iter().map(|c| (c.name.as_str(), c)).collect();
    let target_map: IndexMap<&str, &ColumnDescriptor> =
        target.iter().map(|c| (c.name.as_str(), c)).collect();

    let mut diffs = Vec::new();

    for (name, source_col) in &source_map {
        match target_map.get(name) {
            None => diffs.push(ColumnDifference {
                table: table.to_string(),
                column: name.to_string(),
                source: Some(ColumnAttributes::from(*source_col)),
                target: None,
                issue: MISSING_IN_TARGET.to_string(),
                target_label: target_label.to_string(),
            }),
            Some(target_col) => {
                let issues = attribute_mismatches(source_col, target_col);
                if !issues.is_empty() {
                    diffs.push(ColumnDifference {
                        table: table.to_string(),
                        column: name.to_string(),
                        source: Some(ColumnAttributes::from(*source_col)),
                        target: Some(ColumnAttributes::from(*target_col)),
                        issue: format!("Column {}", issues.join(", ")),
                        target_label: target_label.to_string(),
                    });
                }
            }
        }
    }

    for (name, target_col) in &target_map {
        if !source_map.contains_key(name) {
            diffs.push(ColumnDifference {
                table: table.to_string(),
                column: name.to_string(),
                source: None,
                target: Some(ColumnAttributes::from(*target_col)),
                issue: MISSING_IN_SOURCE.to_string(),
                target_label: target_label.to_string(),
            });
        }
    }

    diffs
}
