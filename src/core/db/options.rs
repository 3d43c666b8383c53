/// Connection String Parsing
///
/// A connection string is either a bare SQLite target (`app.db`, `:memory:`,
/// `file:app.db?mode=ro`) or a `Key=Value;Key=Value` list.

use crate::core::{DbError, Result};
use rusqlite::OpenFlags;
use std::time::Duration;
use tracing::debug;

/// Options extracted from a connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// Database path, `:memory:` or `file:` URI
    pub data_source: String,
    pub read_only: bool,
    pub busy_timeout: Option<Duration>,
    pub foreign_keys: bool,
}

impl ConnectionOptions {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// Returns `DbError::MissingConnectionString` when no data source can be
    /// found and `DbError::InvalidArgument` when a value cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlbind::core::db::ConnectionOptions;
    ///
    /// let opts = ConnectionOptions::parse("Data Source=app.db; Read Only=true").unwrap();
    /// assert_eq!(opts.data_source, "app.db");
    /// assert!(opts.read_only);
    /// ```
    pub fn parse(connection_string: &str) -> Result<Self> {
        let trimmed = connection_string.trim();
        if trimmed.is_empty() {
            return Err(DbError::MissingConnectionString);
        }

        let mut opts = ConnectionOptions {
            data_source: String::new(),
            read_only: false,
            busy_timeout: None,
            foreign_keys: true,
        };

        // URIs may carry '=' in their query string; only key lists are split
        if !trimmed.contains('=') || trimmed.starts_with("file:") {
            opts.data_source = trimmed.to_string();
            return Ok(opts);
        }

        for pair in trimmed.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').ok_or_else(|| DbError::InvalidArgument {
                name: "connection_string",
                message: format!("expected Key=Value, found `{}`", pair),
            })?;
            let value = value.trim();

            match normalize_key(key).as_str() {
                "datasource" | "filename" => opts.data_source = value.to_string(),
                "readonly" => opts.read_only = parse_bool(key, value)?,
                "foreignkeys" => opts.foreign_keys = parse_bool(key, value)?,
                "busytimeout" => {
                    let millis = value.parse::<u64>().map_err(|_| DbError::InvalidArgument {
                        name: "connection_string",
                        message: format!("`{}` is not a number of milliseconds", value),
                    })?;
                    opts.busy_timeout = Some(Duration::from_millis(millis));
                }
                _ => debug!(key = key.trim(), "ignoring unknown connection string key"),
            }
        }

        if opts.data_source.is_empty() {
            return Err(DbError::MissingConnectionString);
        }
        Ok(opts)
    }

    pub(crate) fn open_flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.read_only {
            base | OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        }
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(DbError::InvalidArgument {
            name: "connection_string",
            message: format!("`{}` expects a boolean, found `{}`", key.trim(), value),
        }),
    }
}
