/// SQLBind Error Module
///
/// This module defines the error types surfaced by connection, binding and
/// execution operations. Driver failures during execution are carried in an
/// [`ExecutionError`] that keeps the original driver error as its source and
/// records the failing statement and connection string next to it.
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Key under which the failing statement text is attached to an execution error.
pub const SQL_STATEMENT_KEY: &str = "SqlStatement";

/// Error type for every operation exposed by the crate.
#[derive(Error, Debug)]
pub enum DbError {
    /// Configure/open attempted without a usable connection string
    #[error("Connection string is not set")]
    MissingConnectionString,

    /// A required string argument was blank
    #[error("Invalid argument `{name}`: {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// Bind attempted with a blank statement
    #[error("Statement has not been provided")]
    EmptyStatement,

    /// Execute attempted without a pending command
    #[error("SQL statement has not been provided")]
    NoCommandSet { connection_string: Option<String> },

    /// An argument has no driver type mapping
    #[error("Unsupported parameter type: {type_name}")]
    UnsupportedParameterType { type_name: &'static str },

    /// The driver failed while executing a statement
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The driver failed while opening or closing a connection
    #[error("Connection error: {0}")]
    Connection(#[source] rusqlite::Error),

    /// Operation requires an open connection handle
    #[error("No connection has been created")]
    NotConnected,

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON rendering errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Connection string in effect when the error was raised, if the error carries one.
    pub fn connection_string(&self) -> Option<&str> {
        match self {
            DbError::NoCommandSet { connection_string } => connection_string.as_deref(),
            DbError::Execution(e) => e.connection_string(),
            _ => None,
        }
    }

    /// Statement text that failed, if the error carries one.
    pub fn statement(&self) -> Option<&str> {
        match self {
            DbError::Execution(e) => Some(e.statement()),
            _ => None,
        }
    }
}

/// Underlying cause of an execution failure.
#[derive(Error, Debug)]
pub enum DriverFault {
    /// Error reported by SQLite
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A command was pending but no connection handle was open
    #[error("connection is not open")]
    NotOpen,
}

/// A driver failure annotated with the statement and connection that produced it.
///
/// The driver error is kept intact and exposed through
/// [`std::error::Error::source`]; the context travels in [`ExecutionError::data`].
#[derive(Debug)]
pub struct ExecutionError {
    fault: DriverFault,
    connection_string: Option<String>,
    statement: String,
    data: BTreeMap<String, String>,
}

impl ExecutionError {
    pub(crate) fn new(
        fault: impl Into<DriverFault>,
        connection_string: Option<String>,
        statement: impl Into<String>,
    ) -> Self {
        let statement = statement.into();
        let mut data = BTreeMap::new();
        data.insert(SQL_STATEMENT_KEY.to_string(), statement.clone());
        ExecutionError {
            fault: fault.into(),
            connection_string,
            statement,
            data,
        }
    }

    pub fn fault(&self) -> &DriverFault {
        &self.fault
    }

    /// Returns the SQLite error if the failure came from the driver itself.
    pub fn sqlite_error(&self) -> Option<&rusqlite::Error> {
        match &self.fault {
            DriverFault::Sqlite(e) => Some(e),
            DriverFault::NotOpen => None,
        }
    }

    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Context attached to the error, keyed by name.
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Attaches an additional context entry, replacing any previous value.
    pub fn annotate(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Execution of `{}` failed: {}", self.statement, self.fault)
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.fault)
    }
}

/// Type alias for Result to use DbError as the error type.
pub type Result<T> = std::result::Result<T, DbError>;
