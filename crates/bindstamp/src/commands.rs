//! Command execution
//!
//! Every command builds one resolver for the session, writes its results to
//! `out` and releases the resolver's bindings before returning.

use crate::cli::{Cli, Commands};
use crate::command_span;
use crate::errors::CliError;
use bindstamp_bindings::{Progress, ResolverStats, TimestampResolver};
use bindstamp_filesys::{FileSystem, LocalFileSystem};
use bindstamp_timestamp::Timestamp;
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// `stale` found the target out of date.
    Stale,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Stale => ExitCode::from(1),
        }
    }
}

#[derive(Debug, Serialize)]
struct StampRecord<'a> {
    path: &'a str,
    progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted: Option<String>,
}

impl<'a> StampRecord<'a> {
    fn new(path: &'a str, progress: Progress, time: Timestamp) -> Self {
        let found = progress == Progress::Found;
        Self {
            path,
            progress,
            time: found.then_some(time),
            formatted: found.then(|| time.to_string()),
        }
    }

    fn time_text(&self) -> &str {
        self.formatted.as_deref().unwrap_or("-")
    }
}

#[derive(Debug, Serialize)]
struct StaleReport<'a> {
    target: &'a str,
    stale: bool,
}

#[derive(Debug, Serialize)]
struct NowReport {
    time: Timestamp,
    formatted: String,
}

fn emit<T: Serialize>(
    out: &mut dyn Write,
    what: &'static str,
    value: &T,
) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(|e| CliError::json(what, e))?;
    writeln!(out).map_err(|e| CliError::output(what, e))
}

fn record<'a, F: FileSystem>(resolver: &TimestampResolver<F>, path: &'a str) -> StampRecord<'a> {
    let time = resolver.resolve(path);
    let progress = resolver.progress(path).unwrap_or(Progress::Init);
    StampRecord::new(path, progress, time)
}

fn stamp<F: FileSystem>(
    resolver: &TimestampResolver<F>,
    paths: &[String],
    json: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let records: Vec<StampRecord<'_>> = paths.iter().map(|p| record(resolver, p)).collect();
    if json {
        emit(out, "stamps", &records)?;
    } else {
        for rec in &records {
            writeln!(out, "{}\t{}\t{}", rec.path, rec.progress, rec.time_text())
                .map_err(|e| CliError::output("stamps", e))?;
        }
    }
    Ok(Outcome::Success)
}

fn newest<F: FileSystem>(
    resolver: &TimestampResolver<F>,
    paths: &[String],
    json: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let Some((path, time)) = resolver.newest(paths.iter().map(String::as_str)) else {
        return Ok(Outcome::Success);
    };
    let progress = resolver.progress(path).unwrap_or(Progress::Init);
    let rec = StampRecord::new(path, progress, time);
    if json {
        emit(out, "newest path", &rec)?;
    } else {
        writeln!(out, "{}\t{}", rec.time_text(), rec.path)
            .map_err(|e| CliError::output("newest path", e))?;
    }
    Ok(Outcome::Success)
}

fn stale<F: FileSystem>(
    resolver: &TimestampResolver<F>,
    target: &str,
    deps: &[String],
    json: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let stale = resolver.is_stale(target, deps);
    tracing::info!(target_path = target, deps = deps.len(), stale, "Checked staleness");
    if json {
        emit(out, "staleness", &StaleReport { target, stale })?;
    } else {
        writeln!(out, "{}", if stale { "stale" } else { "fresh" })
            .map_err(|e| CliError::output("staleness", e))?;
    }
    Ok(if stale { Outcome::Stale } else { Outcome::Success })
}

fn now(json: bool, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let time = Timestamp::now();
    if json {
        let report = NowReport {
            time,
            formatted: time.to_string(),
        };
        emit(out, "current time", &report)?;
    } else {
        writeln!(out, "{time}").map_err(|e| CliError::output("current time", e))?;
    }
    Ok(Outcome::Success)
}

fn report_stats(stats: ResolverStats, json: bool, diag: &mut dyn Write) -> Result<(), CliError> {
    if json {
        return emit(diag, "statistics", &stats);
    }
    writeln!(
        diag,
        "directory scans: {}\narchive scans: {}\ntime queries: {}",
        stats.directory_scans, stats.archive_scans, stats.time_queries
    )
    .map_err(|e| CliError::output("statistics", e))
}

/// Runs the parsed command against the local file system.
///
/// Results go to `out`; `--stats` counters go to `diag`.
pub fn execute(
    cli: &Cli,
    out: &mut dyn Write,
    diag: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let span = command_span!(cli.command.name());
    let _entered = span.enter();

    let mut resolver = TimestampResolver::with_config(
        LocalFileSystem::new(cli.scan_config()),
        cli.resolver_config(),
    );

    let outcome = match &cli.command {
        Commands::Stamp { paths } => stamp(&resolver, paths, cli.json, out)?,
        Commands::Newest { paths } => newest(&resolver, paths, cli.json, out)?,
        Commands::Stale { target, deps } => stale(&resolver, target, deps, cli.json, out)?,
        Commands::Now => now(cli.json, out)?,
    };

    let stats = resolver.stats();
    tracing::debug!(
        directory_scans = stats.directory_scans,
        archive_scans = stats.archive_scans,
        time_queries = stats.time_queries,
        "Resolver statistics"
    );
    if cli.stats {
        report_stats(stats, cli.json, diag)?;
    }

    let released = resolver.teardown();
    tracing::debug!(bindings = released, "Released bindings");
    Ok(outcome)
}
