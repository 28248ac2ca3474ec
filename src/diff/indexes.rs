//! Index reconciliation for one table

use indexmap::IndexMap;

use super::{IndexAttributes, IndexDifference};
use crate::schema::IndexDescriptor;

const MISSING_IN_TARGET: &str = "Index exists in source but missing in target";
const MISSING_IN_SOURCE: &str = "Index exists in target but missing in source";

fn definition_mismatches(source: &IndexDescriptor, target: &IndexDescriptor) -> Vec<String> {
    let mut issues = Vec::new();

    // Key-part order matters: (a,b) and (b,a) are different indexes.
    if source.columns != target.columns {
        issues.push(format!(
            "columns mismatch ({} vs {})",
            source.column_list(),
            target.column_list()
        ));
    }

    if source.kind != target.kind {
        issues.push(format!("type mismatch ({} vs {})", source.kind, target.kind));
    }

    issues
}

/// Compare the indexes of one table between source and a target, keyed by index name
pub fn compare_indexes(
    table: &str,
    source: &[IndexDescriptor],
    target: &[IndexDescriptor],
    target_label: &str,
) -> Vec<IndexDifference> {
    let source_map: IndexMap<&str, &IndexDescriptor> =
        source.iter().map(|i| (i.name.as_str(), i)).collect();
    let target_map: IndexMap<&str, &IndexDescriptor> =
        target.iter().map(|i| (i.name.as_str(), i)).collect();

    let mut diffs = Vec::new();

    for (name, source_idx) in &source_map {
        match target_map.get(name) {
            None => diffs.push(IndexDifference {
                table: table.to_string(),
                index_name: name.to_string(),
                source: Some(IndexAttributes::from(*source_idx)),
                target: None,
                issue: MISSING_IN_TARGET.to_string(),
                target_label: target_label.to_string(),
            }),
            Some(target_idx) => {
                let issues = definition_mismatches(source_idx, target_idx);
                if !issues.is_empty() {
                    diffs.push(IndexDifference {
                        table: table.to_string(),
                        index_name: name.to_string(),
                        source: Some(IndexAttributes::from(*source_idx)),
                        target: Some(IndexAttributes::from(*target_idx)),
                        issue: format!("Index {}", issues.join(", ")),
                        target_label: target_label.to_string(),
                    });
                }
            }
        }
    }

    for (name, target_idx) in &target_map {
        if !source_map.contains_key(name) {
            diffs.push(IndexDifference {
                table: table.to_string(),
                index_name: name.to_string(),
                source: None,
                target: Some(IndexAttributes::from(*target_idx)),
                issue: MISSING_IN_SOURCE.to_string(),
                target_label: target_label.to_string(),
            });
        }
    }

    diffs
}
