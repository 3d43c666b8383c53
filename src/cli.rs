//! Command-line argument handling for the `sqlbind` binary.

use crate::core::db::{Connection, ParamValue};
use crate::core::{DbError, Result};
use rusqlite::types::Value;
use std::path::PathBuf;

/// How the statement given on the command line is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Table,
    Scalar,
    FullPrecision,
    NonQuery,
}

/// A parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub mode: Mode,
    pub config_path: Option<PathBuf>,
    /// `None` means "use the configured connection string"
    pub connection_string: Option<String>,
    pub statement: String,
    pub args: Vec<ParamValue>,
}

pub const USAGE: &str = "usage: sqlbind [--config PATH] [--scalar|--full|--exec] <connection-string|-> <statement> [args...]";

/// Parses the arguments following the program name.
pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut mode = Mode::Table;
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if !positional.is_empty() {
            positional.push(arg);
            continue;
        }
        match arg.as_str() {
            "--scalar" => mode = Mode::Scalar,
            "--full" => mode = Mode::FullPrecision,
            "--exec" => mode = Mode::NonQuery,
            "--config" => {
                let path = iter.next().ok_or_else(|| usage_error("--config needs a path"))?;
                config_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => {
                return Err(usage_error(&format!("unknown option `{}`", flag)))
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let connection_string = match positional.next() {
        Some(s) if s == "-" => None,
        Some(s) => Some(s),
        None => return Err(usage_error("missing connection string")),
    };
    let statement = positional
        .next()
        .ok_or_else(|| usage_error("missing statement"))?;
    let args = positional.map(|a| parse_value(&a)).collect();

    Ok(Invocation {
        mode,
        config_path,
        connection_string,
        statement,
        args,
    })
}

/// Interprets a command-line argument as a parameter value.
///
/// `NULL` is a null, integers become `Int64`, other numbers `Double`,
/// anything else stays text.
pub fn parse_value(arg: &str) -> ParamValue {
    if arg == "NULL" {
        ParamValue::Null
    } else if let Ok(i) = arg.parse::<i64>() {
        ParamValue::Int64(i)
    } else if let Ok(f) = arg.parse::<f64>() {
        ParamValue::Double(f)
    } else {
        ParamValue::Text(arg.to_string())
    }
}

/// Runs the invocation against an open connection and renders the result.
pub fn run(conn: &mut Connection, invocation: &Invocation) -> Result<String> {
    let (statement, args) = (invocation.statement.as_str(), invocation.args.as_slice());
    match invocation.mode {
        Mode::Table => {
            let table = conn.data_table_with(statement, args)?;
            Ok(serde_json::to_string_pretty(&table.to_json())?)
        }
        Mode::Scalar => Ok(conn
            .scalar_with(statement, args)?
            .map(|v| render_scalar(&v))
            .unwrap_or_default()),
        Mode::FullPrecision => Ok(conn
            .full_precision_scalar_with(statement, args)?
            .unwrap_or_default()),
        Mode::NonQuery => {
            conn.execute_non_query_with(statement, args)?;
            Ok(String::new())
        }
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

fn usage_error(message: &str) -> DbError {
    DbError::InvalidArgument {
        name: "args",
        message: format!("{}\n{}", message, USAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let inv = parse_args(args(&[
            "--scalar",
            ":memory:",
            "SELECT {0} || {1}",
            "42",
            "x",
        ]))
        .unwrap();
        assert_eq!(inv.mode, Mode::Scalar);
        assert_eq!(inv.connection_string.as_deref(), Some(":memory:"));
        assert_eq!(inv.statement, "SELECT {0} || {1}");
        assert_eq!(inv.args, vec![ParamValue::Int64(42), ParamValue::Text("x".to_string())]);
    }

    #[test]
    fn test_flags_after_statement_are_arguments() {
        let inv = parse_args(args(&["-", "SELECT {0}", "--exec"])).unwrap();
        assert_eq!(inv.mode, Mode::Table);
        assert_eq!(inv.connection_string, None);
        assert_eq!(inv.args, vec![ParamValue::Text("--exec".to_string())]);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&[":memory:"])).is_err());
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--verbose", ":memory:", "SELECT 1"])).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("NULL"), ParamValue::Null);
        assert_eq!(parse_value("-3"), ParamValue::Int64(-3));
        assert_eq!(parse_value("2.5"), ParamValue::Double(2.5));
        assert_eq!(parse_value("Ann"), ParamValue::Text("Ann".to_string()));
    }

    #[test]
    fn test_run_modes() {
        let mut conn = Connection::new();
        conn.open_with(":memory:").unwrap();

        let exec = parse_args(args(&["--exec", "-", "CREATE TABLE t (a INTEGER, b TEXT)"])).unwrap();
        assert_eq!(run(&mut conn, &exec).unwrap(), "");

        let insert = parse_args(args(&["--exec", "-", "INSERT INTO t VALUES ({0}, {1})", "1", "one"])).unwrap();
        run(&mut conn, &insert).unwrap();

        let scalar = parse_args(args(&["--scalar", "-", "SELECT b FROM t WHERE a = {0}", "1"])).unwrap();
        assert_eq!(run(&mut conn, &scalar).unwrap(), "one");

        let table = parse_args(args(&["-", "SELECT a, b FROM t"])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&run(&mut conn, &table).unwrap()).unwrap();
        assert_eq!(json[0]["b"], "one");
    }
}
