//! Table set reconciliation

use std::collections::HashSet;

use super::TableDifference;

/// Outcome of reconciling the table sets of a source and one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSetDiff {
    /// Source-only records first, then target-only records
    pub differences: Vec<TableDifference>,
    /// Tables present on both sides, in source order
    pub common: Vec<String>,
}

impl TableSetDiff {
    pub fn source_only_count(&self) -> usize {
        self.differences.iter().filter(|d| d.source_only).count()
    }

    pub fn target_only_count(&self) -> usize {
        self.differences.iter().filter(|d| d.target_only).count()
    }
}

/// Compare the table names of a source and a target.
///
/// Emission follows the order of the given sequences, which snapshots keep
/// sorted.
pub fn compare_tables(source: &[String], target: &[String], target_label: &str) -> TableSetDiff {
    let source_set: HashSet<&str> = source.iter().map(String::as_str).collect();
    let target_set: HashSet<&str> = target.iter().map(String::as_str).collect();

    let mut differences = Vec::new();
    let mut common = Vec::new();

    for table in source {
        if target_set.contains(table.as_str()) {
            common.push(table.clone());
        } else {
            differences.push(TableDifference::source_only(table, target_label));
        }
    }

    for table in target {
        if !source_set.contains(table.as_str()) {
            differences.push(TableDifference::target_only(table, target_label));
        }
    }

    TableSetDiff {
        differences,
        common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_and_extra_tables() {
        let diff = compare_tables(&names(&["orders", "users"]), &names(&["payments", "users"]), "prod");

        assert_eq!(
            diff.differences,
            vec![
                TableDifference::source_only("orders", "prod"),
                TableDifference::target_only("payments", "prod"),
            ]
        );
        assert_eq!(diff.common, names(&["users"]));
        assert_eq!(diff.source_only_count(), 1);
        assert_eq!(diff.target_only_count(), 1);
    }

    #[test]
    fn test_identical_sets() {
        let tables = names(&["a", "b", "c"]);
        let diff = compare_tables(&tables, &tables, "prod");
        assert!(diff.differences.is_empty());
        assert_eq!(diff.common, tables);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let diff = compare_tables(&names(&["Users"]), &names(&["users"]), "prod");
        assert_eq!(diff.source_only_count(), 1);
        assert_eq!(diff.target_only_count(), 1);
        assert!(diff.common.is_empty());
    }

    #[test]
    fn test_swapping_sides_mirrors_records() {
        let a = names(&["orders", "users"]);
        let b = names(&["payments", "users"]);
        let forward = compare_tables(&a, &b, "t");
        let backward = compare_tables(&b, &a, "t");

        for record in &forward.differences {
            let mirrored = backward
                .differences
                .iter()
                .find(|d| d.table == record.table)
                .unwrap();
            assert_eq!(mirrored.source_only, record.target_only);
            assert_eq!(mirrored.target_only, record.source_only);
        }
    }
}
