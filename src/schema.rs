//! Catalog snapshot types and structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point-in-time list of the base tables of one database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    /// Schema (database) name the tables were read from
    pub database_name: String,
    /// Table names, unique, sorted lexicographically
    pub tables: Vec<String>,
    /// When the catalog was read
    pub captured_at: DateTime<Utc>,
}

impl SchemaSnapshot {
    /// Build a snapshot, sorting and de-duplicating the table names
    pub fn new(database_name: impl Into<String>, tables: impl IntoIterator<Item = String>) -> Self {
        let mut tables: Vec<String> = tables.into_iter().collect();
        tables.sort();
        tables.dedup();
        Self {
            database_name: database_name.into(),
            tables,
            captured_at: Utc::now(),
        }
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.binary_search_by(|t| t.as_str().cmp(table)).is_ok()
    }
}

/// A raw column default as delivered by the catalog.
///
/// Drivers and dump files hand defaults over as different native
/// representations; comparison only ever looks at the `Display` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultLiteral {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for DefaultLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultLiteral::Bool(b) => write!(f, "{}", b),
            DefaultLiteral::Integer(i) => write!(f, "{}", i),
            DefaultLiteral::Float(x) => write!(f, "{}", x),
            DefaultLiteral::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DefaultLiteral {
    fn from(s: &str) -> Self {
        DefaultLiteral::Text(s.to_string())
    }
}

impl From<String> for DefaultLiteral {
    fn from(s: String) -> Self {
        DefaultLiteral::Text(s)
    }
}

impl From<i64> for DefaultLiteral {
    fn from(i: i64) -> Self {
        DefaultLiteral::Integer(i)
    }
}

/// One column of a table, in catalog (ordinal) order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Raw type string, e.g. `varchar(255)`
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<DefaultLiteral>,
    /// Extra attributes, e.g. `auto_increment`
    #[serde(default)]
    pub extra: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable,
            default: None,
            extra: String::new(),
        }
    }

    pub fn with_default(mut self, default: impl Into<DefaultLiteral>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

/// Kind of an index, derived once when the descriptor is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
}

impl IndexKind {
    /// Name of the primary key index in MySQL catalogs
    pub const PRIMARY_NAME: &'static str = "PRIMARY";

    /// Derive the kind from the index name and its uniqueness flag
    pub fn derive(index_name: &str, non_unique: bool) -> Self {
        if index_name == Self::PRIMARY_NAME {
            IndexKind::Primary
        } else if non_unique {
            IndexKind::Index
        } else {
            IndexKind::Unique
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Primary => "PRIMARY",
            IndexKind::Unique => "UNIQUE",
            IndexKind::Index => "INDEX",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One index of a table, grouped by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    /// Member columns in key-part order
    pub columns: Vec<String>,
    #[serde(rename = "type")]
    pub kind: IndexKind,
    /// Storage method (`BTREE`, `HASH`, ...); informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl IndexDescriptor {
    /// Build a descriptor, deriving its [`IndexKind`]
    pub fn new(name: impl Into<String>, columns: Vec<String>, non_unique: bool) -> Self {
        let name = name.into();
        let kind = IndexKind::derive(&name, non_unique);
        Self {
            name,
            columns,
            kind,
            method: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Member columns joined the way reports display them
    pub fn column_list(&self) -> String {
        self.columns.join(",")
    }
}

/// Full structural metadata of one table, as stored in a dump file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDump {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
}

/// Offline copy of a database catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDump {
    pub database: String,
    #[serde(default)]
    pub tables: Vec<TableDump>,
}

impl CatalogDump {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            tables: Vec::new(),
        }
    }

    /// Add a table
    pub fn with_table(
        mut self,
        name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        indexes: Vec<IndexDescriptor>,
    ) -> Self {
        self.tables.push(TableDump {
            name: name.into(),
            columns,
            indexes,
        });
        self
    }

    pub fn table(&self, name: &str) -> Option<&TableDump> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Snapshot of the table list
    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot::new(
            self.database.clone(),
            self.tables.iter().map(|t| t.name.clone()),
        )
    }

    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
