//! bindstamp: resolve file and archive member timestamps from the command line.

mod cli;
mod commands;
mod errors;
mod tracing;

use std::io::{self, Write};
use std::process::ExitCode;

/// Exit status for errors, distinct from a `stale` verdict.
const FAILURE: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            let _ = writeln!(io::stderr().lock(), "{report:?}");
            ExitCode::from(FAILURE)
        }
    }
}

fn run() -> miette::Result<ExitCode> {
    let cli = cli::parse();
    crate::tracing::init_tracing(&cli.tracing_config())?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    let outcome = commands::execute(&cli, &mut stdout.lock(), &mut stderr.lock())?;
    Ok(outcome.exit_code())
}
