// Core infrastructure modules
pub mod core;

// Command-line support
pub mod cli;
pub mod config;

pub use crate::core::db::{
    BoundParameter, Connection, ConnectionState, DataTable, LoggingEvent, ParamType, ParamValue,
    PendingCommand,
};
pub use crate::core::{DbError, Result};
