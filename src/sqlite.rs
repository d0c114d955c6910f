//! The gateway itself: one owned connection, named-parameter commands,
//! fully materialized query results.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Statement, ToSql};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{GatewayError, Result};
use crate::schema::Schema;

/// Core value types for SQLite parameters and result cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*r)),
            Value::Text(t) => ToSqlOutput::Borrowed(ValueRef::Text(t.as_bytes())),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Integer(i) => Ok(Value::Integer(i)),
            ValueRef::Real(r) => Ok(Value::Real(r)),
            ValueRef::Text(t) => std::str::from_utf8(t)
                .map(|s| Value::Text(s.to_string()))
                .map_err(|e| FromSqlError::Other(Box::new(e))),
            // BLOB cells are outside the scalar union; reading one is a
            // query failure.
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// Parameter bindings for SQL statements
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    pub values: HashMap<String, Value>,
}

impl Params {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value
    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }
}

/// SQL text with typed named parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlCommand {
    pub statement: String,
    pub params: Params,
}

impl SqlCommand {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: Params::new(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: String,
    /// Tables ensured to exist at startup
    pub schema: Schema,
}

impl SqliteConfig {
    /// Create a new SQLite config with path and schema
    pub fn new(db_path: impl Into<String>, schema: Schema) -> Self {
        Self {
            db_path: db_path.into(),
            schema,
        }
    }
}

/// Single owning wrapper around one SQLite connection.
///
/// Calls are synchronous and blocking; the gateway holds no state between
/// calls beyond the open connection and its diagnostics sink. Callers must
/// serialize access to one instance.
pub struct SqliteGateway {
    conn: Connection,
    sink: Box<dyn DiagnosticSink>,
}

impl std::fmt::Debug for SqliteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteGateway").finish_non_exhaustive()
    }
}

impl SqliteGateway {
    /// Return value of [`execute`](Self::execute) for failed commands.
    pub const FAILED_COMMAND: i64 = -1;

    /// Open the store at `path`, creating the file if absent.
    ///
    /// Propagates the open error; there is no retry.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_sink(path, Box::new(TracingSink))
    }

    /// Open with an injected diagnostics sink.
    pub fn open_with_sink<P: AsRef<Path>>(path: P, sink: Box<dyn DiagnosticSink>) -> Result<Self> {
        let path = path.as_ref();
        sink.note(&format!("opening sqlite database at {}", path.display()));
        let conn = Connection::open(path).map_err(|source| GatewayError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { conn, sink })
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| GatewayError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Ok(Self {
            conn,
            sink: Box::new(TracingSink),
        })
    }

    /// Open at the configured path and ensure the configured tables exist.
    pub fn from_config(config: &SqliteConfig) -> Result<Self> {
        let gateway = Self::open(&config.db_path)?;
        gateway.initialize_schema(&config.schema)?;
        Ok(gateway)
    }

    /// Replace the diagnostics sink
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Ensure every table in `schema` exists, one idempotent DDL statement
    /// per table.
    pub fn initialize_schema(&self, schema: &Schema) -> Result<()> {
        self.sink.note("initializing table creation");
        for table in &schema.tables {
            self.try_execute(&SqlCommand::new(&table.create_sql()))?;
        }
        self.sink.note("finished executing scripts for tables");
        Ok(())
    }

    /// Execute a non-query command (INSERT/UPDATE/DELETE/DDL).
    ///
    /// Returns the affected-row count, or [`FAILED_COMMAND`](Self::FAILED_COMMAND)
    /// on any failure. Never propagates; the failed SQL and error detail go
    /// to the sink. A zero-row UPDATE returns 0, never the sentinel.
    pub fn execute(&self, command: &SqlCommand) -> i64 {
        match self.try_execute(command) {
            Ok(count) => count as i64,
            Err(err) => {
                self.sink.failure(&command.statement, &err.to_string());
                Self::FAILED_COMMAND
            }
        }
    }

    /// Execute a non-query command, surfacing the failure detail.
    pub fn try_execute(&self, command: &SqlCommand) -> Result<usize> {
        self.run_non_query(command)
            .map_err(|source| GatewayError::Command {
                sql: command.statement.clone(),
                source,
            })
    }

    /// Run a query, materializing every row before returning.
    ///
    /// With `include_header` the first row is the ordered column names. A
    /// query matching no rows yields an empty data sequence (plus the
    /// header row when requested). Failures propagate; there is no safe
    /// "empty vs failed" signal for a read.
    pub fn query(&self, command: &SqlCommand, include_header: bool) -> Result<Vec<Vec<Value>>> {
        self.run_query(command, include_header)
            .map_err(|source| GatewayError::Query {
                sql: command.statement.clone(),
                source,
            })
    }

    /// Release the connection exactly once, suppressing any release error.
    ///
    /// Consuming `self` makes the gateway unusable afterward. Dropping a
    /// gateway without calling `close` releases the connection through the
    /// engine's own drop, which also suppresses errors.
    pub fn close(self) {
        let SqliteGateway { conn, .. } = self;
        let _ = conn.close();
    }

    fn run_non_query(&self, command: &SqlCommand) -> rusqlite::Result<usize> {
        self.sink.statement(&command.statement);
        let mut stmt = self.conn.prepare(&command.statement)?;
        bind_named(&mut stmt, &command.params)?;
        stmt.raw_execute()
    }

    fn run_query(
        &self,
        command: &SqlCommand,
        include_header: bool,
    ) -> rusqlite::Result<Vec<Vec<Value>>> {
        self.sink.statement(&command.statement);
        let mut stmt = self.conn.prepare(&command.statement)?;
        bind_named(&mut stmt, &command.params)?;

        let column_count = stmt.column_count();
        let mut result = Vec::new();
        if include_header {
            result.push(
                stmt.column_names()
                    .into_iter()
                    .map(|name| Value::Text(name.to_string()))
                    .collect(),
            );
        }

        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for index in 0..column_count {
                cells.push(row.get::<_, Value>(index)?);
            }
            result.push(cells);
        }
        Ok(result)
    }
}

const NAME_SIGILS: &[char] = &[':', '@', '$'];

/// Bind each supplied parameter to its placeholder, if the statement has
/// one. Names may be written with or without the SQLite sigil; names that
/// match no placeholder are ignored, and unbound placeholders stay NULL.
fn bind_named(stmt: &mut Statement<'_>, params: &Params) -> rusqlite::Result<()> {
    for (name, value) in &params.values {
        if let Some(index) = placeholder_index(stmt, name)? {
            stmt.raw_bind_parameter(index, value)?;
        }
    }
    Ok(())
}

fn placeholder_index(stmt: &Statement<'_>, name: &str) -> rusqlite::Result<Option<usize>> {
    if name.starts_with(NAME_SIGILS) {
        return stmt.parameter_index(name);
    }
    for sigil in NAME_SIGILS {
        if let Some(index) = stmt.parameter_index(&format!("{sigil}{name}"))? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
