/// Database Module
///
/// This module provides the connection facade for SQLBind, organized into
/// focused submodules.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`, `options.rs`): connection string,
///   open/reconnect/close and the pending-command slot
/// - **Parameters** (`params.rs`): argument values and driver type inference
/// - **Command Binding** (`command.rs`): positional placeholder rewriting
/// - **Query Execution** (`execute.rs`, `table.rs`): the four execution modes
///   and their result types
/// - **Logging** (`logging.rs`): callbacks fired before every execution
///
/// ## Error Handling
///
/// All database operations return the crate's `DbError`; execution failures
/// carry the statement text that failed.
pub mod command;
pub mod connection;
pub mod execute;
pub mod logging;
pub mod options;
pub mod params;
pub mod table;

pub use command::*;
pub use connection::*;
pub use logging::{LoggingEvent, SubscriptionId};
pub use options::*;
pub use params::*;
pub use table::*;
