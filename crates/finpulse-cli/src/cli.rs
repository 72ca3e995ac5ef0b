//! CLI argument definitions using clap
//!
//! The command implementations live in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// finpulse - Spending analytics, budgets and investment signals
#[derive(Parser)]
#[command(name = "finpulse")]
#[command(about = "Batch analytics over personal-finance CSVs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pipeline config file (TOML)
    ///
    /// Defaults to ~/.local/share/finpulse/config/pipeline.toml when present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write every output table
    Run {
        /// Directory holding users.csv, transactions.csv and prices.csv
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Directory the output tables are written to
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Flag anomalies with |z| above this value
        #[arg(long)]
        z_threshold: Option<f64>,

        /// Average category spend over the last N months only
        #[arg(long)]
        recent_months: Option<u32>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a synthetic dataset
    Generate {
        /// Directory the input CSVs are written to
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Number of users
        #[arg(long, default_value = "5")]
        users: usize,

        /// Number of days of activity
        #[arg(long, default_value = "180")]
        days: u32,

        /// Seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,

        /// Last generated day (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Print readable summary lines
    Summary {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Only this user
        #[arg(long)]
        user: Option<i64>,

        /// Weekly instead of daily lines
        #[arg(long)]
        weekly: bool,
    },

    /// Print investment recommendations
    Recommend {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}
