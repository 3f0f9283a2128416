//! json2sql: Convert JSON from an API endpoint into SQL statements
//!
//! Usage:
//!   # Fetch and write users.sql in the current directory
//!   json2sql https://api.example.com/users
//!
//!   # Send an API key header
//!   json2sql -H 'X-API-Key: YOUR_KEY' https://api.example.com/data
//!
//!   # Convert a local file and print the script
//!   json2sql --input orders.json --stdout
//!
//!   # No locator: prompts for the URL
//!   json2sql

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use json2sql::fetch::{parse_header, read_local};
use json2sql::naming::{sanitize_identifier, DEFAULT_TABLE};
use json2sql::output::write_script;
use json2sql::{
    table_name_for, Error, Fetcher, IdentifierPolicy, ScriptBuilder, ScriptWriter, SqlConfig,
};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "json2sql")]
#[command(about = "Convert JSON from an API endpoint into SQL statements", long_about = None)]
struct Args {
    /// API URL to fetch (prompted for if omitted)
    #[arg(value_name = "URL")]
    locator: Option<String>,

    /// Request header, e.g. -H 'X-API-Key: YOUR_KEY' (repeatable)
    #[arg(short = 'H', long = "header", value_name = "KEY: VALUE", conflicts_with = "input")]
    headers: Vec<String>,

    /// Read JSON from a file ('-' for stdin) instead of fetching
    #[arg(short, long, value_name = "FILE")]
    input: Option<String>,

    /// Table name (derived from the URL path if omitted)
    #[arg(short, long)]
    table: Option<String>,

    /// Directory for the generated .sql file
    #[arg(short, long, default_value = ".")]
    output_dir: String,

    /// Print the script to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Omit the provenance comment header
    #[arg(long)]
    no_header: bool,

    /// Restrict table and column names to letters, digits and underscores
    #[arg(long)]
    strict_identifiers: bool,

    /// Print the inferred columns as JSON instead of SQL
    #[arg(long)]
    schema: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The user supplied no locator, neither as an argument nor at the prompt
#[derive(Debug, thiserror::Error)]
#[error("API URL is required")]
struct MissingLocator;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Best effort; nothing left to report to if stderr is gone
            let _ = report(&err, &mut io::stderr().lock());
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    // Progress goes to stderr when stdout carries the output
    let quiet_stdout = args.stdout || args.schema;
    let status = |msg: &str| {
        if quiet_stdout {
            eprintln!("{}", msg);
        } else {
            println!("{}", msg);
        }
    };

    let policy = if args.strict_identifiers {
        IdentifierPolicy::Strict
    } else {
        IdentifierPolicy::Legacy
    };

    let (value, locator) = if let Some(path) = &args.input {
        status(&format!("\nReading data from: {}", path));
        let value = read_local(path).with_context(|| format!("failed to load {}", path))?;
        let locator = args.locator.clone().unwrap_or_else(|| path.clone());
        (value, locator)
    } else {
        let locator = match args.locator.clone() {
            Some(locator) => locator,
            None => prompt_locator()?.ok_or(MissingLocator)?,
        };

        let headers = args
            .headers
            .iter()
            .map(|raw| parse_header(raw))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)?;

        status(&format!("\nFetching data from: {}", locator));
        if !headers.is_empty() {
            let names: Vec<&str> = headers.iter().map(|(name, _)| name.as_str()).collect();
            status(&format!("Using custom headers: {}", names.join(", ")));
        }

        let fetcher = Fetcher::new(&headers).map_err(Error::from)?;
        let value = fetcher.fetch(&locator)?;
        status("✓ JSON data fetched successfully");
        (value, locator)
    };

    let table = match (&args.table, policy) {
        (Some(table), IdentifierPolicy::Strict) => sanitize_identifier(table, DEFAULT_TABLE),
        (Some(table), IdentifierPolicy::Legacy) => table.clone(),
        (None, _) => table_name_for(&locator, policy),
    };
    status(&format!("✓ Using table name: {}", table));

    let config = SqlConfig {
        identifiers: policy,
        include_header: !args.no_header,
        source: Some(locator),
        generated_at: Some(Utc::now()),
    };

    status("Converting JSON to SQL...");
    let script = ScriptBuilder::new(&table, config).build(&value);
    status("✓ Conversion complete");

    if args.schema {
        let json = serde_json::to_string_pretty(script.schema())?;
        println!("{}", json);
        return Ok(());
    }

    if args.stdout {
        write_script(io::stdout().lock(), &script).context("failed to write to stdout")?;
        return Ok(());
    }

    let writer = ScriptWriter::new(&args.output_dir).map_err(Error::from)?;
    let path = writer.write(&table, &script).map_err(Error::from)?;
    let location = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());

    status(&format!("\nSQL file saved as: {}", path.display()));
    status(&format!("Location: {}", location.display()));
    status("\nDone!");

    Ok(())
}

/// Ask for the URL interactively. Returns None on empty input or EOF.
fn prompt_locator() -> Result<Option<String>> {
    print!("Enter API URL: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();

    Ok((!line.is_empty()).then(|| line.to_string()))
}

/// Exit status per failure kind: 1 usage, 2 retrieval, 3 decode, 4 persistence
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(Error::Fetch(_)) | Some(Error::Io(_)) => 2,
        Some(Error::Decode(_)) => 3,
        Some(Error::Persistence(_)) => 4,
        Some(Error::Schema(_)) | None => 1,
    }
}

/// Write the diagnostic followed by usage guidance. Every failure gets both.
fn report<W: Write>(err: &anyhow::Error, out: &mut W) -> io::Result<()> {
    writeln!(out, "❌ Error: {:#}", err)?;
    writeln!(out, "\nExample of correct usage:")?;
    writeln!(out, "  json2sql https://api.example.com/data?api_key=YOUR_KEY")?;
    writeln!(out, "\nIf using API key in headers, use the -H flag:")?;
    writeln!(out, "  json2sql -H 'X-API-Key: YOUR_KEY' https://api.example.com/data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use json2sql::FetchError;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_repeatable_headers() {
        let args = Args::parse_from([
            "json2sql",
            "-H",
            "X-API-Key: abc",
            "-H",
            "Accept: application/json",
            "https://api.example.com/users",
        ]);
        assert_eq!(args.headers.len(), 2);
        assert_eq!(args.locator.as_deref(), Some("https://api.example.com/users"));
        assert_eq!(args.output_dir, ".");
    }

    #[test]
    fn test_exit_codes() {
        let fetch: anyhow::Error = Error::from(FetchError::InvalidUrl("x".into())).into();
        assert_eq!(exit_code(&fetch), 2);

        let missing: anyhow::Error = MissingLocator.into();
        assert_eq!(exit_code(&missing), 1);

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let decode: anyhow::Error = Error::from(json2sql::DecodeError::from(decode)).into();
        assert_eq!(exit_code(&decode), 3);
    }

    fn reported(err: &anyhow::Error) -> String {
        let mut out = Vec::new();
        report(err, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_every_failure_prints_usage() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let decode: anyhow::Error = Error::from(json2sql::DecodeError::from(decode)).into();

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let persistence: anyhow::Error = Error::from(json2sql::PersistenceError::Write {
            path: "out/users.sql".into(),
            source: io_err,
        })
        .into();

        let fetch: anyhow::Error = Error::from(FetchError::InvalidUrl("x".into())).into();
        let missing: anyhow::Error = MissingLocator.into();

        for err in [&decode, &persistence, &fetch, &missing] {
            let text = reported(err);
            assert!(text.starts_with("❌ Error: "), "{}", text);
            assert!(text.contains("Example of correct usage:"), "{}", text);
            assert!(text.contains("json2sql -H 'X-API-Key: YOUR_KEY'"), "{}", text);
        }
        assert_eq!(exit_code(&persistence), 4);
    }

    #[test]
    fn test_headers_conflict_with_input() {
        let err = Args::try_parse_from(["json2sql", "-i", "x.json", "-H", "A: b"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let args = Args::try_parse_from(["json2sql", "-i", "x.json"]).unwrap();
        assert!(args.headers.is_empty());
    }

    #[test]
    fn test_read_failure_keeps_decode_code_through_context() {
        let decode = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err = anyhow::Error::from(Error::from(json2sql::DecodeError::from(decode)))
            .context("failed to load data.json");
        assert_eq!(exit_code(&err), 3);
    }
}
