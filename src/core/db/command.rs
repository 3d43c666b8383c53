/// Command Binding Module
///
/// Turns a statement template with positional placeholders (`{0}`, `{1}`, ...)
/// into named-parameter SQL plus the ordered list of bound parameters.

use crate::core::db::params::{BoundParameter, ParamValue};
use crate::core::{DbError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static POSITIONAL_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\d+\}").expect("placeholder pattern is valid"));

/// A bound statement waiting for its single execution.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommand {
    statement: String,
    parameters: Vec<BoundParameter>,
}

impl PendingCommand {
    /// Binds `args` into `statement`.
    ///
    /// Every literal `{i}` is replaced by `:par{i}` and a parameter named
    /// `par{i}` is appended, in argument order. Without arguments the text is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns `DbError::EmptyStatement` for a blank statement and
    /// `DbError::UnsupportedParameterType` if an argument has no driver type.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlbind::core::db::{PendingCommand, ParamValue};
    ///
    /// let args = [ParamValue::from(7), ParamValue::from("Ann")];
    /// let cmd = PendingCommand::bind("SELECT * FROM T WHERE ID = {0} AND NAME = {1}", Some(&args[..])).unwrap();
    /// assert_eq!(cmd.statement(), "SELECT * FROM T WHERE ID = :par0 AND NAME = :par1");
    /// ```
    pub fn bind(statement: &str, args: Option<&[ParamValue]>) -> Result<Self> {
        if statement.trim().is_empty() {
            return Err(DbError::EmptyStatement);
        }

        let mut text = statement.to_string();
        let mut parameters = Vec::new();

        if let Some(args) = args {
            parameters.reserve(args.len());
            for (i, arg) in args.iter().enumerate() {
                let param = BoundParameter::new(i, arg.clone())?;
                text = text.replace(&format!("{{{}}}", i), &param.placeholder());
                parameters.push(param);
            }

            if POSITIONAL_PLACEHOLDER.is_match(&text) {
                warn!(
                    statement = %text,
                    bound = args.len(),
                    "statement still contains positional placeholders after binding"
                );
            }
        }

        Ok(PendingCommand {
            statement: text,
            parameters,
        })
    }

    /// Final statement text in named-parameter form
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn parameters(&self) -> &[BoundParameter] {
        &self.parameters
    }

    /// Attaches every parameter to `stmt` by name.
    pub(crate) fn bind_to(&self, stmt: &mut rusqlite::Statement<'_>) -> rusqlite::Result<()> {
        for param in &self.parameters {
            let placeholder = param.placeholder();
            match stmt.parameter_index(&placeholder)? {
                Some(index) => stmt.raw_bind_parameter(index, param)?,
                None => return Err(rusqlite::Error::InvalidParameterName(placeholder)),
            }
        }
        Ok(())
    }
}
