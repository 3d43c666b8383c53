/// Query Execution Module
///
/// The four execution modes on [`Connection`]. Each one consumes the pending
/// command, notifies logging subscribers, runs the statement and maps the
/// result. Driver failures come back as [`DbError::Execution`] carrying the
/// statement text; the pending command is gone afterwards either way.

use crate::core::db::command::PendingCommand;
use crate::core::db::connection::{Connection, ConnectionState};
use crate::core::db::logging::LoggingEvent;
use crate::core::db::params::ParamValue;
use crate::core::db::table::{value_to_text, DataColumn, DataTable};
use crate::core::error::{DriverFault, ExecutionError};
use crate::core::{DbError, Result};
use rusqlite::types::Value;
use tracing::debug;

impl Connection {
    /// Executes the pending command and discards any rows it returns.
    pub fn execute_non_query(&mut self) -> Result<()> {
        self.run(|conn, command| {
            let mut stmt = conn.prepare_bound(command)?;
            if stmt.column_count() == 0 {
                *conn.state = ConnectionState::Executing;
                stmt.raw_execute()?;
            } else {
                let mut rows = stmt.raw_query();
                *conn.state = ConnectionState::Fetching;
                while rows.next()?.is_some() {}
            }
            Ok(())
        })
    }

    /// Binds `statement` and executes it as a non-query.
    pub fn execute_non_query_with(&mut self, statement: &str, args: &[ParamValue]) -> Result<()> {
        self.set_command(statement, Some(args))?;
        self.execute_non_query()
    }

    /// Executes the pending command and returns the first column of the first row.
    ///
    /// Returns `None` when the statement produces no rows or no columns.
    pub fn scalar(&mut self) -> Result<Option<Value>> {
        self.run(|conn, command| {
            let mut stmt = conn.prepare_bound(command)?;
            let has_columns = stmt.column_count() > 0;
            *conn.state = ConnectionState::Executing;
            let mut rows = stmt.raw_query();
            let value = match rows.next()? {
                Some(row) if has_columns => {
                    *conn.state = ConnectionState::Fetching;
                    Some(row.get::<_, Value>(0)?)
                }
                _ => None,
            };
            Ok(value)
        })
    }

    /// Binds `statement` and returns its scalar result.
    pub fn scalar_with(&mut self, statement: &str, args: &[ParamValue]) -> Result<Option<Value>> {
        self.set_command(statement, Some(args))?;
        self.scalar()
    }

    /// Executes the pending command with every column read as text and returns
    /// the first cell of the first row.
    ///
    /// Numbers are rendered from the stored value, so nothing is lost to an
    /// intermediate numeric conversion. A NULL cell yields `Some("")`; no rows
    /// yields `None`.
    pub fn full_precision_scalar(&mut self) -> Result<Option<String>> {
        self.run(|conn, command| {
            let mut stmt = conn.prepare_bound(command)?;
            if stmt.column_count() == 0 {
                *conn.state = ConnectionState::Executing;
                stmt.raw_execute()?;
                return Ok(None);
            }
            *conn.state = ConnectionState::Executing;
            let mut rows = stmt.raw_query();
            let mut first = None;
            while let Some(row) = rows.next()? {
                *conn.state = ConnectionState::Fetching;
                if first.is_none() {
                    first = Some(value_to_text(row.get_ref(0)?));
                }
            }
            Ok(first)
        })
    }

    /// Binds `statement` and returns its first cell as full-precision text.
    pub fn full_precision_scalar_with(
        &mut self,
        statement: &str,
        args: &[ParamValue],
    ) -> Result<Option<String>> {
        self.set_command(statement, Some(args))?;
        self.full_precision_scalar()
    }

    /// Executes the pending command and returns every row.
    pub fn data_table(&mut self) -> Result<DataTable> {
        self.run(read_table)
    }

    /// Binds `statement` and returns the full result table.
    pub fn data_table_with(&mut self, statement: &str, args: &[ParamValue]) -> Result<DataTable> {
        self.set_command(statement, Some(args))?;
        self.data_table()
    }

    /// Shared protocol for every execution mode.
    ///
    /// The missing-command check runs before subscribers are notified; the
    /// command is taken out of its slot before the driver is called, so it is
    /// cleared on success and failure alike.
    fn run<T, F>(&mut self, exec: F) -> Result<T>
    where
        F: FnOnce(&mut Executor<'_>, &PendingCommand) -> std::result::Result<T, DriverFault>,
    {
        let command = self.pending.take().ok_or_else(|| DbError::NoCommandSet {
            connection_string: self.connection_string.clone(),
        })?;

        let event = LoggingEvent {
            connection_string: self.connection_string.clone(),
            statement: command.statement().to_string(),
        };
        self.subscribers.notify(&event);
        debug!(
            statement = %command.statement(),
            parameters = command.parameters().len(),
            subscribers = self.subscribers.len(),
            "executing statement"
        );

        let result = match self.handle.as_ref() {
            Some(handle) => {
                self.state = ConnectionState::Executing;
                let mut executor = Executor {
                    handle,
                    state: &mut self.state,
                };
                let result = exec(&mut executor, &command);
                self.state = ConnectionState::Open;
                result
            }
            None => Err(DriverFault::NotOpen),
        };

        result.map_err(|fault| {
            debug!(statement = %command.statement(), error = %fault, "statement failed");
            ExecutionError::new(fault, self.connection_string.clone(), command.statement()).into()
        })
    }
}

/// Reads every row of `command` into a table. The state stays `Executing`
/// until the first row arrives.
fn read_table(
    conn: &mut Executor<'_>,
    command: &PendingCommand,
) -> std::result::Result<DataTable, DriverFault> {
    let mut stmt = conn.prepare_bound(command)?;
    let columns = stmt
        .columns()
        .iter()
        .map(|c| DataColumn {
            name: c.name().to_string(),
            decl_type: c.decl_type().map(str::to_string),
        })
        .collect();
    let mut table = DataTable::new(columns);
    *conn.state = ConnectionState::Executing;
    if table.columns.is_empty() {
        stmt.raw_execute()?;
        return Ok(table);
    }
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        *conn.state = ConnectionState::Fetching;
        table.push_row(row)?;
    }
    Ok(table)
}

/// Driver access for a single execution, tracking the busy state it reaches.
struct Executor<'a> {
    handle: &'a rusqlite::Connection,
    state: &'a mut ConnectionState,
}

impl<'a> Executor<'a> {
    fn prepare_bound(&self, command: &PendingCommand) -> std::result::Result<rusqlite::Statement<'a>, DriverFault> {
        let mut stmt = self.handle.prepare(command.statement())?;
        command.bind_to(&mut stmt)?;
        Ok(stmt)
    }
}
