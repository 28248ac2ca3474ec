//! In-memory reader over offline catalog dumps

use std::collections::HashMap;
use std::path::Path;

use super::{unreachable, SchemaReader};
use crate::error::{ConnectivityError, Result};
use crate::profile::{ComparisonRequest, ConnectionProfile};
use crate::schema::{CatalogDump, ColumnDescriptor, IndexDescriptor, SchemaSnapshot, TableDump};

/// Serves catalogs registered under a profile label.
///
/// An unknown label, or a dump whose database differs from the profile's,
/// is reported as a [`ConnectivityError`] just like an unreachable server.
#[derive(Debug, Clone, Default)]
pub struct CatalogReader {
    catalogs: HashMap<String, CatalogDump>,
}

impl CatalogReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dump for the profile with the given label
    pub fn insert(&mut self, label: impl Into<String>, dump: CatalogDump) {
        self.catalogs.insert(label.into(), dump);
    }

    pub fn with_catalog(mut self, label: impl Into<String>, dump: CatalogDump) -> Self {
        self.insert(label, dump);
        self
    }

    /// Load a dump file and register it under `label`.
    ///
    /// Returns a profile that resolves to it.
    pub fn load(&mut self, label: &str, path: impl AsRef<Path>) -> Result<ConnectionProfile> {
        let path = path.as_ref();
        let dump = CatalogDump::load(path)?;
        let profile = ConnectionProfile::new(label, path.display().to_string(), dump.database.clone())
            .with_port(0);
        self.insert(label, dump);
        Ok(profile)
    }

    /// Load a source dump and its target dumps, each labelled by its path.
    ///
    /// A file given both as source and as target resolves to the same catalog.
    pub fn load_files<S: AsRef<Path>, T: AsRef<Path>>(
        &mut self,
        source: S,
        targets: &[T],
    ) -> Result<ComparisonRequest> {
        let source = self.load_path(source.as_ref())?;
        let targets = targets
            .iter()
            .map(|path| self.load_path(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(ComparisonRequest::new(source, targets))
    }

    fn load_path(&mut self, path: &Path) -> Result<ConnectionProfile> {
        self.load(&path.display().to_string(), path)
    }

    fn catalog(&self, profile: &ConnectionProfile) -> std::result::Result<&CatalogDump, ConnectivityError> {
        let label = profile.label();
        let dump = self
            .catalogs
            .get(&label)
            .ok_or_else(|| unreachable(profile, format!("no catalog registered for '{}'", label)))?;
        if dump.database != profile.database {
            return Err(unreachable(
                profile,
                format!("unknown database '{}'", profile.database),
            ));
        }
        Ok(dump)
    }

    fn table(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> std::result::Result<&TableDump, ConnectivityError> {
        self.catalog(profile)?
            .table(table)
            .ok_or_else(|| unreachable(profile, format!("unknown table '{}'", table)))
    }
}

impl SchemaReader for CatalogReader {
    async fn snapshot(&self, profile: &ConnectionProfile) -> std::result::Result<SchemaSnapshot, ConnectivityError> {
        Ok(self.catalog(profile)?.snapshot())
    }

    async fn columns(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> std::result::Result<Vec<ColumnDescriptor>, ConnectivityError> {
        Ok(self.table(profile, table)?.columns.clone())
    }

    async fn indexes(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> std::result::Result<Vec<IndexDescriptor>, ConnectivityError> {
        let mut indexes = self.table(profile, table)?.indexes.clone();
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(indexes)
    }

    async fn ping(&self, profile: &ConnectionProfile) -> std::result::Result<(), ConnectivityError> {
        self.catalog(profile).map(|_| ())
    }
}
