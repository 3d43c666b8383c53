/// Core Module for SQLBind
///
/// This module contains the connection facade and the error types shared by
/// every operation.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DbError, DriverFault, ExecutionError, Result, SQL_STATEMENT_KEY};
