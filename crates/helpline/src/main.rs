// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpline - customer-service chat backend.
//!
//! This is the binary entry point: it loads configuration, initializes
//! logging, and dispatches to the serve/shell/config subcommands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod serve;
mod shell;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Helpline - customer-service chat backend.
#[derive(Parser, Debug)]
#[command(name = "helpline", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP/WebSocket server.
    Serve,
    /// Launch an interactive chat session against the local pipeline.
    Shell,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match helpline_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("helpline: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run(config).await,
        Some(Commands::Shell) => shell::run(config).await,
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(helpline_core::HelplineError::Config(format!(
                    "failed to render config: {e}"
                ))),
            }
        }
        None => {
            println!("helpline: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "helpline exited with error");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber once. `RUST_LOG` overrides the
/// configured level.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
