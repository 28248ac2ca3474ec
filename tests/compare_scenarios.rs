//! End-to-end comparison scenarios over offline catalog fixtures.

use catalog_drift::{
    CatalogDump, CatalogReader, ComparisonEngine, ComparisonRequest, ConnectionProfile,
    DriftError, IndexKind,
};

fn fixture(name: &str) -> CatalogDump {
    let content = match name {
        "staging" => include_str!("fixtures/staging.json"),
        "prod" => include_str!("fixtures/prod.json"),
        "replica" => include_str!("fixtures/replica.json"),
        other => panic!("unknown fixture {}", other),
    };
    CatalogDump::from_json(content).unwrap()
}

fn profile(name: &str) -> ConnectionProfile {
    ConnectionProfile::new(name, format!("{}-db.internal", name), "shop")
}

fn engine() -> ComparisonEngine<CatalogReader> {
    let reader = CatalogReader::new()
        .with_catalog("staging", fixture("staging"))
        .with_catalog("staging-copy", fixture("staging"))
        .with_catalog("prod", fixture("prod"))
        .with_catalog("replica", fixture("replica"));
    ComparisonEngine::new(reader)
}

// =============================================================================
// Single target
// =============================================================================

#[tokio::test]
async fn test_database_against_itself_is_clean() {
    let result = engine()
        .compare(&profile("staging"), &[profile("staging-copy")])
        .await
        .unwrap();

    assert!(result.table_diffs.is_empty());
    assert!(result.column_diffs.is_empty());
    assert!(result.index_diffs.is_empty());
    assert_eq!(result.summary.tables_with_diffs, 0);
    assert_eq!(result.summary.total_tables, 2);
}

#[tokio::test]
async fn test_missing_and_extra_tables() {
    let result = engine()
        .compare(&profile("staging"), &[profile("prod")])
        .await
        .unwrap();

    assert_eq!(result.table_diffs.len(), 2);
    assert_eq!(result.table_diffs[0].table, "orders");
    assert!(result.table_diffs[0].source_only);
    assert_eq!(result.table_diffs[1].table, "payments");
    assert!(result.table_diffs[1].target_only);
    assert!(result.table_diffs.iter().all(|d| d.target_label == "prod"));
    assert_eq!(result.summary.tables_only_in_source, 1);
    assert_eq!(result.summary.tables_only_in_targets, 1);
}

#[tokio::test]
async fn test_column_type_drift() {
    let result = engine()
        .compare(&profile("staging"), &[profile("prod")])
        .await
        .unwrap();

    // credits defaults 0 and "0" share a string form, so only email drifts
    assert_eq!(result.column_diffs.len(), 1);
    let diff = &result.column_diffs[0];
    assert_eq!(diff.table, "users");
    assert_eq!(diff.column, "email");
    assert_eq!(diff.issue, "Column type mismatch (varchar(255) vs varchar(191))");
    assert_eq!(result.summary.tables_with_diffs, 1);
}

#[tokio::test]
async fn test_replica_column_and_index_drift() {
    let result = engine()
        .compare(&profile("staging"), &[profile("replica")])
        .await
        .unwrap();

    let issues: Vec<(&str, &str, &str)> = result
        .column_diffs
        .iter()
        .map(|d| (d.table.as_str(), d.column.as_str(), d.issue.as_str()))
        .collect();
    assert_eq!(
        issues,
        vec![
            ("orders", "status", "Column nullability mismatch (NOT NULL vs NULL)"),
            ("orders", "note", "Column exists in target but missing in source"),
            ("users", "email", "Column type mismatch (varchar(255) vs varchar(191))"),
            ("users", "credits", "Column default value mismatch (0 vs '0')"),
        ]
    );

    assert_eq!(result.index_diffs.len(), 2);
    let reordered = &result.index_diffs[0];
    assert_eq!(reordered.index_name, "idx_user_status");
    assert_eq!(
        reordered.issue,
        "Index columns mismatch (user_id,status vs status,user_id), type mismatch (INDEX vs UNIQUE)"
    );
    assert_eq!(reordered.target.as_ref().map(|t| t.kind), Some(IndexKind::Unique));

    let dropped = &result.index_diffs[1];
    assert_eq!(dropped.index_name, "uq_email");
    assert_eq!(dropped.issue, "Index exists in source but missing in target");
    assert!(dropped.target.is_none());

    assert_eq!(result.summary.tables_with_diffs, 2);
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test]
async fn test_swapping_sides_mirrors_table_records() {
    let engine = engine();
    let forward = engine.compare(&profile("staging"), &[profile("prod")]).await.unwrap();
    let backward = engine.compare(&profile("prod"), &[profile("staging")]).await.unwrap();

    assert_eq!(forward.table_diffs.len(), backward.table_diffs.len());
    for record in &forward.table_diffs {
        let mirrored = backward
            .table_diffs
            .iter()
            .find(|d| d.table == record.table)
            .unwrap();
        assert_eq!(mirrored.source_only, record.target_only);
        assert_eq!(mirrored.target_only, record.source_only);
    }
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let engine = engine();
    let targets = [profile("prod"), profile("replica")];
    let first = engine.compare(&profile("staging"), &targets).await.unwrap();
    let second = engine.compare(&profile("staging"), &targets).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[tokio::test]
async fn test_counters_match_records() {
    let result = engine()
        .compare(&profile("staging"), &[profile("prod"), profile("replica")])
        .await
        .unwrap();

    assert_eq!(result.summary.columns_with_diffs, result.column_diffs.len());
    assert_eq!(result.summary.indexes_with_diffs, result.index_diffs.len());
    assert_eq!(result.summary.total_tables, 2);
}

// =============================================================================
// Multiple targets
// =============================================================================

#[tokio::test]
async fn test_drift_is_counted_per_table_target_pair() {
    let result = engine()
        .compare(&profile("staging"), &[profile("prod"), profile("replica")])
        .await
        .unwrap();

    // users drifts against both targets, orders only against replica
    assert_eq!(result.summary.tables_with_diffs, 3);
    assert_eq!(result.summary.columns_with_diffs, 5);
    assert_eq!(result.summary.indexes_with_diffs, 2);
    assert_eq!(result.summary.tables_only_in_source, 1);
    assert_eq!(result.summary.tables_only_in_targets, 1);

    let email_labels: Vec<&str> = result
        .column_diffs
        .iter()
        .filter(|d| d.column == "email")
        .map(|d| d.target_label.as_str())
        .collect();
    assert_eq!(email_labels, vec!["prod", "replica"]);
}

#[tokio::test]
async fn test_bad_target_fails_whole_run() {
    let err = engine()
        .compare(
            &profile("staging"),
            &[profile("prod"), profile("offline"), profile("replica")],
        )
        .await
        .unwrap_err();

    match err {
        DriftError::TargetUnavailable { target, source } => {
            assert_eq!(target, "offline");
            assert_eq!(source.host, "offline-db.internal");
        }
        other => panic!("Expected TargetUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_without_source_is_rejected() {
    let request = ComparisonRequest {
        source: None,
        targets: vec![profile("prod")],
    };
    let err = engine().compare_request(&request).await.unwrap_err();
    assert!(matches!(err, DriftError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_json_output_shape() {
    let result = engine()
        .compare(&profile("staging"), &[profile("prod")])
        .await
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["summary"]["tablesOnlyInSource"], 1);
    assert_eq!(json["columnDiffs"][0]["targetLabel"], "prod");
    assert_eq!(json["columnDiffs"][0]["source"]["type"], "varchar(255)");
    assert_eq!(json["columnDiffs"][0]["target"]["type"], "varchar(191)");
}
