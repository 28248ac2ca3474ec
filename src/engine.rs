//! Comparison engine
//!
//! Runs the table, column and index comparators of one source against every
//! target of a request and merges the outcome into one [`ComparisonResult`].
//!
//! Targets are processed sequentially in request order, so the record order of
//! a result is fully deterministic: target by target, then table by table in
//! snapshot order, then column (ordinal) or index (name) order.
//!
//! Failure policy is fail-fast: if any target cannot be read the whole run
//! fails with [`DriftError::TargetUnavailable`] naming it, and nothing from
//! the targets already processed is returned.

use tracing::{debug, info};

use crate::diff::{compare_columns, compare_indexes, compare_tables, ComparisonResult};
use crate::error::{DriftError, Result};
use crate::profile::{validate_profiles, ComparisonRequest, ConnectionProfile};
use crate::reader::SchemaReader;
use crate::schema::SchemaSnapshot;

/// Reachability of one profile
#[derive(Debug)]
pub struct PingOutcome {
    pub label: String,
    pub error: Option<crate::error::ConnectivityError>,
}

impl PingOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Compares database catalogs read through a [`SchemaReader`]
pub struct ComparisonEngine<R> {
    reader: R,
}

impl<R: SchemaReader> ComparisonEngine<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Validate a request and compare its source against every target
    pub async fn compare_request(&self, request: &ComparisonRequest) -> Result<ComparisonResult> {
        let source = request.validate()?;
        self.run(source, &request.targets).await
    }

    /// Compare `source` against each of `targets`, in order
    pub async fn compare(
        &self,
        source: &ConnectionProfile,
        targets: &[ConnectionProfile],
    ) -> Result<ComparisonResult> {
        validate_profiles(source, targets)?;
        self.run(source, targets).await
    }

    async fn run(
        &self,
        source: &ConnectionProfile,
        targets: &[ConnectionProfile],
    ) -> Result<ComparisonResult> {
        info!(source = %source.label(), targets = targets.len(), "starting catalog comparison");

        let source_snapshot = self
            .reader
            .snapshot(source)
            .await
            .map_err(|e| DriftError::SourceUnavailable {
                profile: source.label(),
                source: e,
            })?;

        let mut result = ComparisonResult::new(source_snapshot.table_count());

        for target in targets {
            self.compare_target(source, &source_snapshot, target, &mut result)
                .await?;
        }

        info!(
            tables_with_diffs = result.summary.tables_with_diffs,
            columns_with_diffs = result.summary.columns_with_diffs,
            indexes_with_diffs = result.summary.indexes_with_diffs,
            "catalog comparison finished"
        );
        Ok(result)
    }

    async fn compare_target(
        &self,
        source: &ConnectionProfile,
        source_snapshot: &SchemaSnapshot,
        target: &ConnectionProfile,
        result: &mut ComparisonResult,
    ) -> Result<()> {
        let label = target.label();
        let unavailable = |e| DriftError::TargetUnavailable {
            target: label.clone(),
            source: e,
        };

        let target_snapshot = self.reader.snapshot(target).await.map_err(unavailable)?;
        info!(target_label = %label, tables = target_snapshot.table_count(), "comparing target");

        let table_diff = compare_tables(&source_snapshot.tables, &target_snapshot.tables, &label);
        result.record_tables(&table_diff);

        for table in &table_diff.common {
            let source_columns = self
                .reader
                .columns(source, table)
                .await
                .map_err(|e| DriftError::SourceUnavailable {
                    profile: source.label(),
                    source: e,
                })?;
            let target_columns = self.reader.columns(target, table).await.map_err(unavailable)?;
            let columns_drifted =
                result.record_columns(compare_columns(table, &source_columns, &target_columns, &label));

            let source_indexes = self
                .reader
                .indexes(source, table)
                .await
                .map_err(|e| DriftError::SourceUnavailable {
                    profile: source.label(),
                    source: e,
                })?;
            let target_indexes = self.reader.indexes(target, table).await.map_err(unavailable)?;
            let indexes_drifted =
                result.record_indexes(compare_indexes(table, &source_indexes, &target_indexes, &label));

            if columns_drifted || indexes_drifted {
                debug!(target_label = %label, table = %table, "table drifted");
                result.record_drifted_table();
            }
        }

        Ok(())
    }

    /// Check reachability of every profile, without failing on the first error
    pub async fn ping(&self, profiles: &[ConnectionProfile]) -> Vec<PingOutcome> {
        let mut outcomes = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let error = self.reader.ping(profile).await.err();
            outcomes.push(PingOutcome {
                label: profile.label(),
                error,
            });
        }
        outcomes
    }
}
