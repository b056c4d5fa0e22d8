//! Shared command-line entry point for the report binaries.
//!
//! Each binary is `main_for(kind)`: one positional input path, the report on
//! stdout, diagnostics on stderr, exit code 0 on success and 1 on any error.

use crate::pipeline::{run, write_report};
use crate::schema::EntityKind;
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
pub struct ToolArgs {
    /// JSON file holding an array of records
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

/// Parse arguments for the tool of `kind`; the first item is the program name.
pub fn parse_args<I, T>(kind: EntityKind, args: I) -> Result<ToolArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = ToolArgs::command()
        .name(kind.tool_name())
        .about(kind.about());
    let matches = command.try_get_matches_from_mut(args)?;
    ToolArgs::from_arg_matches(&matches).map_err(|e| e.format(&mut command))
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn main_for(kind: EntityKind) -> ExitCode {
    init_tracing();

    let args = match parse_args(kind, std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let result = run(kind, &args.input)
        .and_then(|output| write_report(&mut io::stdout().lock(), &output));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "report failed");
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
