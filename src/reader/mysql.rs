//! Live MySQL/MariaDB catalog reader
//!
//! Reads structural metadata from `information_schema`. One lazily-connected
//! pool is kept per profile, so repeated column and index lookups against the
//! same database reuse its connections.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::Instrument;

use super::{unreachable, SchemaReader};
use crate::error::ConnectivityError;
use crate::profile::ConnectionProfile;
use crate::schema::{
    CatalogDump, ColumnDescriptor, DefaultLiteral, IndexDescriptor, SchemaSnapshot,
};

const TABLES_SQL: &str = "\
SELECT CAST(table_name AS CHAR) \
FROM information_schema.tables \
WHERE table_schema = ? AND table_type = 'BASE TABLE' \
ORDER BY table_name";

const COLUMNS_SQL: &str = "\
SELECT CAST(column_name AS CHAR), CAST(column_type AS CHAR), CAST(is_nullable AS CHAR), \
       CAST(column_default AS CHAR), CAST(extra AS CHAR) \
FROM information_schema.columns \
WHERE table_schema = ? AND table_name = ? \
ORDER BY ordinal_position";

const INDEXES_SQL: &str = "\
SELECT CAST(index_name AS CHAR), CAST(column_name AS CHAR), \
       CAST(non_unique AS SIGNED), CAST(index_type AS CHAR) \
FROM information_schema.statistics \
WHERE table_schema = ? AND table_name = ? \
ORDER BY index_name, seq_in_index";

type ColumnRow = (String, String, String, Option<String>, String);
type IndexRow = (String, Option<String>, i64, String);

/// Connection settings shared by every profile a reader opens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderOptions {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_connections() -> u32 {
    2
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

/// Reads catalogs from live MySQL servers
pub struct MysqlReader {
    options: ReaderOptions,
    pools: Mutex<HashMap<String, MySqlPool>>,
}

impl MysqlReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            options,
            pools: Mutex::new(HashMap::new()),
        }
    }

    fn connect_options(profile: &ConnectionProfile) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&profile.host)
            .port(profile.port)
            .username(&profile.user)
            .database(&profile.database);
        match profile.resolved_password() {
            Some(password) => options.password(&password),
            None => options,
        }
    }

    /// Pool for a profile, created without connecting on first use
    fn pool(&self, profile: &ConnectionProfile) -> Result<MySqlPool, ConnectivityError> {
        let key = format!("{}@{}", profile.user, profile.address());
        let mut pools = self
            .pools
            .lock()
            .map_err(|_| unreachable(profile, "connection pool registry poisoned"))?;
        let pool = pools.entry(key).or_insert_with(|| {
            MySqlPoolOptions::new()
                .max_connections(self.options.max_connections)
                .acquire_timeout(Duration::from_secs(self.options.connect_timeout_secs))
                .connect_lazy_with(Self::connect_options(profile))
        });
        Ok(pool.clone())
    }

    /// Close every pool this reader opened
    pub async fn close(&self) {
        let pools: Vec<MySqlPool> = match self.pools.lock() {
            Ok(mut pools) => pools.drain().map(|(_, pool)| pool).collect(),
            Err(_) => return,
        };
        for pool in pools {
            pool.close().await;
        }
    }

    /// Capture the full catalog of a database
    pub async fn dump(&self, profile: &ConnectionProfile) -> Result<CatalogDump, ConnectivityError> {
        let snapshot = self.snapshot(profile).await?;
        let mut dump = CatalogDump::new(snapshot.database_name.clone());
        for table in &snapshot.tables {
            let columns = self.columns(profile, table).await?;
            let indexes = self.indexes(profile, table).await?;
            dump = dump.with_table(table.clone(), columns, indexes);
        }
        Ok(dump)
    }
}

impl Default for MysqlReader {
    fn default() -> Self {
        Self::new(ReaderOptions::default())
    }
}

fn column_from_row((name, column_type, is_nullable, default, extra): ColumnRow) -> ColumnDescriptor {
    ColumnDescriptor {
        name,
        column_type,
        nullable: is_nullable == "YES",
        default: default.map(DefaultLiteral::Text),
        extra,
    }
}

/// Group per-key-part rows into one descriptor per index
fn group_index_rows(rows: Vec<IndexRow>) -> Vec<IndexDescriptor> {
    let mut grouped: IndexMap<String, IndexDescriptor> = IndexMap::new();
    for (name, column, non_unique, method) in rows {
        let entry = grouped.entry(name.clone()).or_insert_with(|| {
            IndexDescriptor::new(name, Vec::new(), non_unique != 0).with_method(method)
        });
        // Functional key parts have no column name.
        if let Some(column) = column {
            entry.columns.push(column);
        }
    }
    let mut indexes: Vec<IndexDescriptor> = grouped.into_values().collect();
    indexes.sort_by(|a, b| a.name.cmp(&b.name));
    indexes
}

impl SchemaReader for MysqlReader {
    async fn snapshot(&self, profile: &ConnectionProfile) -> Result<SchemaSnapshot, ConnectivityError> {
        let pool = self.pool(profile)?;
        let span = tracing::debug_span!("catalog.tables", database = %profile.database, rows = tracing::field::Empty);
        let tables: Vec<String> = sqlx::query_scalar(TABLES_SQL)
            .bind(&profile.database)
            .fetch_all(&pool)
            .instrument(span.clone())
            .await
            .map_err(|e| unreachable(profile, e))?;
        span.record("rows", tables.len());
        Ok(SchemaSnapshot::new(profile.database.clone(), tables))
    }

    async fn columns(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, ConnectivityError> {
        let pool = self.pool(profile)?;
        let span = tracing::debug_span!("catalog.columns", database = %profile.database, table, rows = tracing::field::Empty);
        let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
            .bind(&profile.database)
            .bind(table)
            .fetch_all(&pool)
            .instrument(span.clone())
            .await
            .map_err(|e| unreachable(profile, e))?;
        span.record("rows", rows.len());
        Ok(rows.into_iter().map(column_from_row).collect())
    }

    async fn indexes(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> Result<Vec<IndexDescriptor>, ConnectivityError> {
        let pool = self.pool(profile)?;
        let span = tracing::debug_span!("catalog.indexes", database = %profile.database, table, rows = tracing::field::Empty);
        let rows: Vec<IndexRow> = sqlx::query_as(INDEXES_SQL)
            .bind(&profile.database)
            .bind(table)
            .fetch_all(&pool)
            .instrument(span.clone())
            .await
            .map_err(|e| unreachable(profile, e))?;
        span.record("rows", rows.len());
        Ok(group_index_rows(rows))
    }

    async fn ping(&self, profile: &ConnectionProfile) -> Result<(), ConnectivityError> {
        let pool = self.pool(profile)?;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map(|_| ())
            .map_err(|e| unreachable(profile, e))
    }
}
