//! Catalog Drift
//!
//! Structural schema comparison for relational databases. One source database
//! is checked against any number of targets, and every difference in table
//! existence, column attributes, and index definitions is reported.
//!
//! ## Features
//!
//! - **Table reconciliation**: tables missing from, or extra in, each target
//! - **Column comparison**: type, nullability, extra attributes and defaults
//! - **Index comparison**: ordered member columns and index kind
//! - **Multi-target runs**: one aggregated result with summary counters
//! - **Pluggable readers**: live MySQL catalogs or offline JSON dumps
//!
//! ## Usage
//!
//! ```ignore
//! let engine = ComparisonEngine::new(MysqlReader::default());
//! let result = engine.compare(&staging, &[prod_eu, prod_us]).await?;
//! println!("{}", report::render_text(&result));
//! ```
//!
//! Only structural metadata is compared. Row data is never read, and no
//! corrective statements are generated.

pub mod checksum;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod profile;
pub mod reader;
pub mod report;
pub mod schema;

pub use checksum::Checksum;
pub use config::DriftConfig;
pub use diff::{
    ColumnAttributes, ColumnDifference, ComparisonResult, IndexAttributes, IndexDifference,
    SummaryCounters, TableDifference,
};
pub use engine::{ComparisonEngine, PingOutcome};
pub use error::{ConnectivityError, DriftError, Result};
pub use profile::{ComparisonRequest, ConnectionProfile};
pub use reader::{CatalogReader, MysqlReader, ReaderOptions, SchemaReader};
pub use report::ReportFormat;
pub use schema::{
    CatalogDump, ColumnDescriptor, DefaultLiteral, IndexDescriptor, IndexKind, SchemaSnapshot,
    TableDump,
};
