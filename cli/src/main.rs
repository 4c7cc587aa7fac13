// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # astrodex
//!
//! The `astrodex` binary runs the discovery moderation service.
//!
//! ## Commands
//!
//! - `astrodex serve` - Run the HTTP service
//! - `astrodex config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use astrodex::commands::{self, ConfigCommand, ServeArgs};
use astrodex::logging::init_logging;
use astrodex_core::application::config::{CatalogConfig, LogFormat};

/// astrodex - crowd-sourced discovery moderation
#[derive(Parser)]
#[command(name = "astrodex")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "ASTRODEX_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format (default: observability.log_format)
    #[arg(long, global = true, env = "ASTRODEX_LOG_FORMAT", value_enum)]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the moderation HTTP service
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            // logging format may come from the file, so load it first
            let mut config = CatalogConfig::load_or_default(cli.config.clone())
                .context("Failed to load configuration")?;
            args.apply(&mut config);

            let format = cli
                .log_format
                .map(LogFormat::from)
                .unwrap_or(config.observability.log_format);
            init_logging(&cli.log_level, format)?;

            info!(
                config = ?cli.config,
                backend = ?config.storage.backend,
                "Starting astrodex"
            );
            commands::serve::run(config).await
        }
        Commands::Config { command } => {
            init_logging(&cli.log_level, cli.log_format.map(LogFormat::from).unwrap_or_default())?;
            commands::config::handle_command(command, cli.config).await
        }
    }
}
