mod cli;
mod event_reader;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowrelay_core::models::LogLevel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flowrelay")]
#[command(version)]
#[command(about = "Relay pipeline events to Flowdock with optional rate limiting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forward JSONL events to Flowdock
    ///
    /// Reads one JSON object per line from stdin (or --input). Each delivered
    /// event is echoed to stdout with its send `time`; throttled events are
    /// dropped silently; failures are logged to stderr.
    ///
    /// Examples:
    ///   tail -f events.jsonl | flowrelay forward
    ///   flowrelay forward --input events.jsonl --interval 5000
    Forward {
        /// Path to configuration file (default: ~/.config/flowrelay/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Minimum milliseconds between sends, overrides the config file
        #[arg(long)]
        interval: Option<u64>,

        /// Display name, overrides the config file
        #[arg(long)]
        nick: Option<String>,

        /// Log level: error, warn, info, debug, trace
        #[arg(long)]
        log_level: Option<LogLevel>,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Path to configuration file (default: ~/.config/flowrelay/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Forward {
            config,
            input,
            interval,
            nick,
            log_level,
        } => {
            let forward_config = cli::forward::ForwardConfig {
                config_path: config,
                input_file: input,
                interval,
                nick,
                log_level,
            };
            cli::forward::execute_forward(forward_config).await?;
        }
        Commands::CheckConfig { config } => {
            let report = cli::check_config::execute_check_config(config)?;
            println!("{}", report);
        }
    }

    Ok(())
}
