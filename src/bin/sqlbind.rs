use sqlbind::cli;
use sqlbind::config::{self, Config};
use sqlbind::core::db::Connection;
use sqlbind::core::{DbError, Result};
use tracing::{error, info};

fn main() {
    let invocation = match cli::parse_args(std::env::args().skip(1)) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let config = match load_config(&invocation) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    let level = match config.tracing_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let connection_string = match invocation
        .connection_string
        .as_deref()
        .or_else(|| config.connection_string())
    {
        Some(s) => s.to_string(),
        None => {
            eprintln!("{}", DbError::MissingConnectionString);
            std::process::exit(2);
        }
    };

    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match execute(&invocation, &config, &connection_string) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            error!(statement = e.statement().unwrap_or_default(), "{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(invocation: &cli::Invocation) -> Result<Config> {
    match &invocation.config_path {
        Some(path) => config::load_config(path),
        None => config::load_default_config(),
    }
}

fn execute(invocation: &cli::Invocation, config: &Config, connection_string: &str) -> Result<String> {
    let mut conn = Connection::new();
    if config.logging.log_statements {
        conn.subscribe(|event| info!(statement = %event.statement, "executing"));
    }
    conn.open_with(connection_string)?;

    let output = cli::run(&mut conn, invocation)?;
    conn.close()?;
    Ok(output)
}
