//! finpulse CLI - Batch personal-finance analytics
//!
//! Usage:
//!   finpulse generate --data-dir data    Write a synthetic dataset
//!   finpulse run --data-dir data         Run the full pipeline
//!   finpulse summary --user 1            Print daily summary lines
//!   finpulse recommend                   Print investment signals

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            data_dir,
            output_dir,
            z_threshold,
            recent_months,
            json,
        } => commands::cmd_run(
            config,
            &data_dir,
            &output_dir,
            &commands::Overrides {
                z_threshold,
                recent_months,
            },
            json,
        ),
        Commands::Generate {
            data_dir,
            users,
            days,
            seed,
            end_date,
        } => commands::cmd_generate(&data_dir, users, days, seed, end_date.as_deref()),
        Commands::Summary {
            data_dir,
            user,
            weekly,
        } => commands::cmd_summary(config, &data_dir, user, weekly),
        Commands::Recommend { data_dir } => commands::cmd_recommend(config, &data_dir),
    }
}
