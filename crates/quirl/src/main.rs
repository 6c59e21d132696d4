// SPDX-FileCopyrightText: 2026 Quirl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quirl - a Telegram bot that turns messages into QR codes.
//!
//! Binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use clap::{Parser, Subcommand};

/// Quirl - a Telegram bot that turns messages into QR codes.
#[derive(Parser, Debug)]
#[command(name = "quirl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Quirl bot server.
    Serve,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match quirl_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            quirl_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("quirl serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("failed to render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("quirl: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn default_config_is_valid() {
        let config =
            quirl_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.agent.name, "quirl");
        assert_eq!(config.limits.max_size, 16000);
    }
}
