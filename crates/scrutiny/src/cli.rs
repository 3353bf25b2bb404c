//! Clap derive structures for the `scrutiny` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// scrutiny -- poll a Scrutiny instance and aggregate per-disk health data
#[derive(Debug, Parser)]
#[command(
    name = "scrutiny",
    version,
    about = "Poll Scrutiny and aggregate disk health data",
    long_about = "Polls a Scrutiny web instance for its device roster and per-device\n\
        SMART details, and merges them into one record per disk.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "SCRUTINY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Scrutiny host (overrides config)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// Scrutiny port (overrides config)
    #[arg(long, short = 'P', global = true)]
    pub port: Option<u16>,

    /// Use HTTPS instead of HTTP
    #[arg(long, global = true)]
    pub https: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SCRUTINY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Log Enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one WWN per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll on the configured interval until interrupted
    Poll(PollArgs),

    /// Run one refresh cycle and print every disk
    #[command(alias = "ls")]
    Snapshot(SnapshotArgs),

    /// Run one refresh cycle and print a single disk
    Device(DeviceArgs),

    /// Check that Scrutiny is reachable and answers the summary call
    Check,

    /// Manage the configuration file
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct PollArgs {
    /// Refresh interval in minutes (overrides config)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Skip the refresh at startup; wait for the first interval instead
    #[arg(long)]
    pub no_first_refresh: bool,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Exit non-zero if any disk's detail call failed
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// World Wide Name of the disk, as Scrutiny lists it
    pub wwn: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file, after checking that Scrutiny answers
    Init(ConfigInitArgs),

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Refresh interval in minutes
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Write the file without contacting Scrutiny first
    #[arg(long)]
    pub skip_check: bool,

    /// Overwrite an existing config file
    #[arg(long, short = 'f')]
    pub force: bool,
}
