//! Devscope CLI
//!
//! Command-line interface for inspecting a monitored server's logs, metrics and
//! recommendations straight from its `var` directory.
//!
//! # Usage
//!
//! ```bash
//! devscope --help
//! devscope tail var/log/app.log -n 50 --filter error
//! devscope --var-dir /srv/app/var logs --parallel 4
//! devscope metrics
//! ```

#![deny(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::config::{DevToolsConfig, DEFAULT_RUNTIME_STATS_PREFIX};
use shared::insights::InsightsCollector;
use shared::logs::tail;
use tracing_subscriber::EnvFilter;

/// Devscope CLI - developer-tools dashboard from the command line
#[derive(Debug, Parser)]
#[command(name = "devscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the stats files and `log/`
    #[arg(long, env = "DEVSCOPE_VAR_DIR", default_value = "var")]
    var_dir: PathBuf,

    /// Application name used in the stats file names
    #[arg(long, env = "DEVSCOPE_APP_NAME", default_value = "devscope")]
    app_name: String,

    /// Configured memory limit, e.g. `512M`; `-1` for none
    #[arg(long, env = "DEVSCOPE_MEMORY_LIMIT", default_value = "-1", allow_hyphen_values = true)]
    memory_limit: String,

    /// Configured number of workers
    #[arg(long, env = "DEVSCOPE_WORKER_NUM", default_value_t = 4)]
    worker_num: u32,

    /// Prefix of the runtime stats file, e.g. `swoole-stats`
    #[arg(
        long,
        env = "DEVSCOPE_RUNTIME_STATS_PREFIX",
        default_value = DEFAULT_RUNTIME_STATS_PREFIX
    )]
    runtime_stats_prefix: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the last lines of a file
    Tail {
        /// File to read
        file: PathBuf,

        /// Maximum number of lines
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: usize,

        /// Only lines containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the newest parsed lines across all log files as JSON
    Logs {
        /// Maximum number of lines
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: usize,

        /// Only lines containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,

        /// Read files on this many threads
        #[arg(long, value_name = "WORKERS")]
        parallel: Option<usize>,
    },
    /// Print runtime, application and memory metrics as JSON
    Metrics,
    /// Print advisory recommendations as JSON
    Recommendations,
    /// Print the full dashboard report as JSON
    Insights,
}

impl Cli {
    fn devtools_config(&self) -> DevToolsConfig {
        DevToolsConfig::new(&self.var_dir)
            .with_app_name(&self.app_name)
            .with_memory_limit(&self.memory_limit)
            .with_worker_num(self.worker_num)
            .with_runtime_stats_prefix(&self.runtime_stats_prefix)
    }

    fn collector(&self) -> Result<InsightsCollector> {
        Ok(InsightsCollector::new(self.devtools_config())?)
    }
}

#[derive(Serialize)]
struct RecommendationsOutput<T> {
    recommendations: T,
}

fn print_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Some(Commands::Tail {
            file,
            lines,
            filter,
        }) => {
            for line in tail(file, *lines, filter.as_deref()) {
                writeln!(out, "{}", line.line)?;
            }
        }
        Some(Commands::Logs {
            lines,
            filter,
            parallel,
        }) => {
            let aggregator = cli.devtools_config().aggregator()?;
            let logs = match parallel {
                Some(workers) => aggregator.collect_parallel(*lines, filter.as_deref(), *workers),
                None => aggregator.collect(*lines, filter.as_deref()),
            };
            tracing::debug!(files = logs.files.len(), lines = logs.total_lines(), "Collected logs");
            print_json(out, &logs)?;
        }
        Some(Commands::Metrics) => print_json(out, &cli.collector()?.metrics())?,
        Some(Commands::Recommendations) => print_json(
            out,
            &RecommendationsOutput {
                recommendations: cli.collector()?.recommendations(),
            },
        )?,
        Some(Commands::Insights) => print_json(out, &cli.collector()?.collect())?,
        None => {
            writeln!(out, "devscope CLI v{}", env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "Use --help for usage information")?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}
