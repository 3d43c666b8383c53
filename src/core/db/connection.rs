/// Connection Management Module
///
/// This module owns the single driver connection behind a [`Connection`]:
/// configuring the connection string, opening, reconnecting and closing the
/// handle, and holding the one pending command bound to it.

use crate::core::db::command::PendingCommand;
use crate::core::db::logging::{LoggingEvent, Subscribers, SubscriptionId};
use crate::core::db::options::ConnectionOptions;
use crate::core::db::params::ParamValue;
use crate::core::{DbError, Result};
use tracing::{debug, info};

/// Represents the state of the driver connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No open handle
    #[default]
    Closed,
    /// Handle open and idle
    Open,
    /// A statement is being stepped
    Executing,
    /// Result rows are being read
    Fetching,
}

impl ConnectionState {
    /// True for every state in which the handle must be closed before reopening
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ConnectionState::Open | ConnectionState::Executing | ConnectionState::Fetching
        )
    }
}

/// A single logical database connection with one pending-command slot.
///
/// Not meant for concurrent use; callers serialise access themselves.
#[derive(Debug, Default)]
pub struct Connection {
    pub(super) connection_string: Option<String>,
    pub(super) handle: Option<rusqlite::Connection>,
    pub(super) state: ConnectionState,
    pub(super) pending: Option<PendingCommand>,
    pub(super) subscribers: Subscribers,
}

impl Connection {
    /// Creates an unconfigured connection
    pub fn new() -> Self {
        Connection::default()
    }

    /// Creates a connection with a stored connection string. A blank string
    /// leaves the connection unconfigured.
    pub fn with_connection_string(connection_string: &str) -> Self {
        let mut conn = Connection::new();
        if !connection_string.trim().is_empty() {
            conn.connection_string = Some(connection_string.to_string());
        }
        conn
    }

    /// Stores the connection string without opening anything.
    pub fn configure(&mut self, connection_string: &str) -> Result<()> {
        if connection_string.trim().is_empty() {
            return Err(DbError::MissingConnectionString);
        }
        self.connection_string = Some(connection_string.to_string());
        Ok(())
    }

    /// Creates and opens a new handle using the stored connection string.
    ///
    /// Any previous handle is replaced without being closed first; use
    /// [`Connection::reconnect`] to close it explicitly.
    ///
    /// # Errors
    ///
    /// `DbError::MissingConnectionString` when nothing is configured,
    /// `DbError::Connection` when SQLite refuses to open the target.
    pub fn open(&mut self) -> Result<()> {
        let connection_string = match self.connection_string.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Err(DbError::MissingConnectionString),
        };
        let opts = ConnectionOptions::parse(connection_string)?;

        let handle = rusqlite::Connection::open_with_flags(&opts.data_source, opts.open_flags())
            .map_err(DbError::Connection)?;

        let pragma = if opts.foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        };
        handle.execute_batch(pragma).map_err(DbError::Connection)?;
        if let Some(timeout) = opts.busy_timeout {
            handle.busy_timeout(timeout).map_err(DbError::Connection)?;
        }

        info!(data_source = %opts.data_source, read_only = opts.read_only, "connection opened");
        self.handle = Some(handle);
        self.state = ConnectionState::Open;
        Ok(())
    }

    /// Stores `connection_string` and opens a new handle with it.
    pub fn open_with(&mut self, connection_string: &str) -> Result<()> {
        require_connection_string(connection_string)?;
        self.connection_string = Some(connection_string.to_string());
        self.open()
    }

    /// Closes the current handle if it is active, then opens a new one.
    pub fn reconnect(&mut self, connection_string: &str) -> Result<()> {
        require_connection_string(connection_string)?;
        self.connection_string = Some(connection_string.to_string());

        if self.handle.is_some() && self.state.is_active() {
            self.close()?;
        } else {
            debug!("reconnect: no active handle, skipping close");
        }

        info!("reconnecting");
        self.open()
    }

    /// Closes the current handle.
    ///
    /// # Errors
    ///
    /// `DbError::NotConnected` when no handle was ever created. If SQLite
    /// refuses to close, the handle is kept and `DbError::Connection` returned.
    pub fn close(&mut self) -> Result<()> {
        let handle = self.handle.take().ok_or(DbError::NotConnected)?;
        if let Err((handle, e)) = handle.close() {
            self.handle = Some(handle);
            return Err(DbError::Connection(e));
        }
        self.state = ConnectionState::Closed;
        info!("connection closed");
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some() && self.state.is_active()
    }

    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    /// Binds `statement` with `args` and stores it as the pending command,
    /// replacing any command that was not executed.
    ///
    /// A blank statement is rejected before anything changes. Once the
    /// statement is accepted the previous command is discarded, so an argument
    /// that fails to bind leaves no command pending.
    pub fn set_command(&mut self, statement: &str, args: Option<&[ParamValue]>) -> Result<()> {
        if statement.trim().is_empty() {
            return Err(DbError::EmptyStatement);
        }
        if let Some(previous) = self.pending.take() {
            debug!(statement = %previous.statement(), "discarding unexecuted command");
        }
        self.pending = Some(PendingCommand::bind(statement, args)?);
        Ok(())
    }

    /// The command the next execution will consume
    pub fn pending_command(&self) -> Option<&PendingCommand> {
        self.pending.as_ref()
    }

    /// Registers a callback fired with the statement right before each execution.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LoggingEvent) + 'static,
    {
        self.subscribers.add(Box::new(callback))
    }

    /// Removes a callback; returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Direct access to the open driver handle
    pub fn handle(&self) -> Option<&rusqlite::Connection> {
        self.handle.as_ref()
    }
}

fn require_connection_string(connection_string: &str) -> Result<()> {
    if connection_string.trim().is_empty() {
        return Err(DbError::InvalidArgument {
            name: "connection_string",
            message: "Connection string has not been set".to_string(),
        });
    }
    Ok(())
}
