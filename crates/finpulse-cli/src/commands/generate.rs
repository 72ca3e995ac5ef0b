//! Synthetic dataset command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use finpulse_core::generate::{generate, write_inputs};
use finpulse_core::GeneratorConfig;

pub fn cmd_generate(
    data_dir: &Path,
    users: usize,
    days: u32,
    seed: Option<u64>,
    end_date: Option<&str>,
) -> Result<()> {
    if users == 0 || days == 0 {
        anyhow::bail!("--users and --days must be at least 1");
    }

    let end_date = match end_date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --end-date format (use YYYY-MM-DD)")?,
        None => Local::now().date_naive(),
    };

    let config = GeneratorConfig {
        users,
        days,
        end_date,
        seed,
    };
    let data = generate(&config).context("Failed to generate dataset")?;
    write_inputs(&data, data_dir)
        .with_context(|| format!("Failed to write dataset to {}", data_dir.display()))?;

    println!();
    println!("🎲 Synthetic Dataset");
    println!("   Directory: {}", data_dir.display());
    println!("   Period: {} to {}", config.start_date(), config.end_date);
    println!("   ─────────────────────────────────────────────");
    println!("   Users:        {:>8}", data.users.len());
    println!("   Transactions: {:>8}", data.transactions.len());
    println!("   Price points: {:>8}", data.prices.len());
    if let Some(seed) = seed {
        println!("   Seed:         {:>8}", seed);
    }

    Ok(())
}
