//! # table-viewer
//!
//! A minimal web front-end for browsing and exporting rows from a MySQL
//! database: submit connection credentials, list tables, view a table or run
//! a free-form query, and download the result set as CSV, JSON, or XLSX.
//!
//! ## Security Warning
//!
//! **This is a development tool only!**
//!
//! - No authentication/authorization built-in
//! - Exposes full database schema and data
//! - The custom-query export executes arbitrary SQL as supplied
//! - Should never be exposed in production or public networks
//!
//! Table names are validated against the introspected table list before they
//! are interpolated into SQL (identifiers cannot be bound as parameters);
//! free-form query text is executed without validation by design.

pub mod api;
pub mod database;
pub mod export;
pub mod schema;
pub mod state;
pub mod views;

pub use api::create_router;
pub use database::mysql::{row_set_from, rows_to_json};
pub use database::DatabaseError;
pub use export::{ExportError, ExportFormat, ExportPayload};
pub use schema::{ColumnInfo, ConnectionConfig, RowSet};
pub use state::AppState;
