//! Synchronous SQLite command/query gateway.
//!
//! # Intention
//!
//! - Provide a single owning wrapper around one SQLite connection,
//!   mediating all command/query access.
//! - Encapsulate SQLite-specific types, parameter binding, and error
//!   handling behind a small surface.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No business logic; callers drive the gateway with SQL text and typed
//!   parameters and consume tabular results.
//! - Diagnostics flow through an injected sink, never a global logger.

pub mod diagnostics;
pub mod error;
pub mod schema;
pub mod sqlite;

pub use diagnostics::{DiagnosticSink, TracingSink};
pub use error::{FailureKind, GatewayError, Result};
pub use schema::{
    ColumnConstraint, ColumnDefinition, DataType, ForeignKey, Schema, TableDefinition,
};
pub use sqlite::{Params, SqlCommand, SqliteConfig, SqliteGateway, Value};
