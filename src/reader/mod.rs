//! Catalog readers
//!
//! A [`SchemaReader`] turns a [`ConnectionProfile`] into structural metadata.
//! The comparison engine only depends on this trait:
//!
//! - [`MysqlReader`] reads a live server through `information_schema`
//! - [`CatalogReader`] serves offline [`CatalogDump`](crate::schema::CatalogDump)s
//!
//! Readers own their timeouts and connection handling. The engine never
//! retries or caches on their behalf.

use std::future::Future;

use crate::error::ConnectivityError;
use crate::profile::ConnectionProfile;
use crate::schema::{ColumnDescriptor, IndexDescriptor, SchemaSnapshot};

pub mod catalog;
pub mod mysql;

pub use catalog::CatalogReader;
pub use mysql::{MysqlReader, ReaderOptions};

/// Source of structural metadata for a connection profile
pub trait SchemaReader {
    /// Snapshot of the base tables, sorted by name
    fn snapshot(
        &self,
        profile: &ConnectionProfile,
    ) -> impl Future<Output = Result<SchemaSnapshot, ConnectivityError>> + Send;

    /// Columns of a table in ordinal order
    fn columns(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> impl Future<Output = Result<Vec<ColumnDescriptor>, ConnectivityError>> + Send;

    /// Indexes of a table, grouped by name with columns in key-part order
    fn indexes(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> impl Future<Output = Result<Vec<IndexDescriptor>, ConnectivityError>> + Send;

    /// Check that the database is reachable
    fn ping(
        &self,
        profile: &ConnectionProfile,
    ) -> impl Future<Output = Result<(), ConnectivityError>> + Send;
}

/// Build a [`ConnectivityError`] for a profile
pub(crate) fn unreachable(
    profile: &ConnectionProfile,
    cause: impl Into<crate::error::Cause>,
) -> ConnectivityError {
    ConnectivityError::new(profile.host.clone(), profile.port, profile.database.clone(), cause)
}
