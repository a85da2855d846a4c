use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use bindstamp_bindings::ResolverConfig;
use bindstamp_filesys::ScanConfig;
use bindstamp_pathsys::KeyStyle;
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bindstamp")]
#[command(about = "Resolve file and archive member timestamps with one scan per directory")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(
        long,
        global = true,
        value_name = "DIRECTIVES",
        help = "Tracing filter directives; overrides --level and RUST_LOG"
    )]
    pub log_filter: Option<String>,

    #[arg(long, global = true, help = "Output results and logs as JSON")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "BINDSTAMP_DEBUG_BINDSCAN",
        value_parser = BoolishValueParser::new(),
        help = "Trace every entry a scan records"
    )]
    pub debug_bindscan: bool,

    #[arg(
        long,
        global = true,
        env = "BINDSTAMP_STAT_ENTRIES",
        value_parser = BoolishValueParser::new(),
        help = "Time every directory entry during the scan"
    )]
    pub stat_entries: bool,

    #[arg(
        long,
        global = true,
        env = "BINDSTAMP_FOLD_CASE",
        value_parser = BoolishValueParser::new(),
        help = "Match paths case-insensitively, treating '\\' as '/'"
    )]
    pub fold_case: bool,

    #[arg(long, global = true, help = "Print scan and stat counts to stderr")]
    pub stats: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Print the progress and timestamp of each path")]
    Stamp {
        #[arg(required = true, help = "Paths; archive members as 'lib.a(member.o)'")]
        paths: Vec<String>,
    },
    #[command(about = "Print the newest of the given paths")]
    Newest {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    #[command(about = "Check whether a target is older than its dependencies (exit 1 when stale)")]
    Stale {
        target: String,
        #[arg(help = "Dependencies of the target")]
        deps: Vec<String>,
    },
    #[command(about = "Print the current time")]
    Now,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stamp { .. } => "stamp",
            Self::Newest { .. } => "newest",
            Self::Stale { .. } => "stale",
            Self::Now => "now",
        }
    }
}

impl Cli {
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: if self.json {
                TracingFormat::Json
            } else {
                self.log_format
            },
            level: self.level.into(),
            bindscan: self.debug_bindscan,
            filter: self.log_filter.clone(),
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default().with_stat_entries(self.stat_entries)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        let key_style = if self.fold_case {
            KeyStyle::CaseFolded
        } else {
            KeyStyle::default()
        };
        ResolverConfig::default()
            .with_key_style(key_style)
            .with_trace_bindscan(self.debug_bindscan)
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
