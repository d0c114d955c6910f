//! Injected diagnostics for the gateway.
//!
//! The gateway never talks to a global logger; everything it reports goes
//! through the [`DiagnosticSink`] chosen at construction. The default sink
//! forwards to `tracing`.

use tracing::{debug, error};

/// Structured-logging collaborator the gateway reports through.
pub trait DiagnosticSink {
    /// Lifecycle chatter: connection opened, schema applied.
    fn note(&self, message: &str);

    /// The literal SQL text, immediately before a statement runs.
    ///
    /// Parameter values are not redacted; acceptable for a local
    /// single-user store only.
    fn statement(&self, sql: &str);

    /// A failed non-query command with its offending SQL.
    fn failure(&self, sql: &str, detail: &str);
}

/// Default sink backed by the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn note(&self, message: &str) {
        debug!(target: "sqlite_gateway", "{message}");
    }

    fn statement(&self, sql: &str) {
        debug!(target: "sqlite_gateway", sql, "executing SQL");
    }

    fn failure(&self, sql: &str, detail: &str) {
        error!(target: "sqlite_gateway", sql, detail, "SQL command failed");
    }
}
