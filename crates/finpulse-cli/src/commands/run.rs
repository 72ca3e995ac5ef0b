//! Full pipeline run

use std::path::Path;

use anyhow::{Context, Result};
use finpulse_core::{write_outputs, Pipeline, RunReport};
use tracing::info;

use super::{load_config, open_inputs, Overrides};

/// Load inputs, run every stage and write the output tables
pub fn run_pipeline(
    config_path: Option<&Path>,
    data_dir: &Path,
    output_dir: &Path,
    overrides: &Overrides,
) -> Result<RunReport> {
    let config = load_config(config_path, overrides)?;
    let inputs = open_inputs(data_dir)?;

    info!(
        "Loaded {} users, {} transactions, {} price points",
        inputs.users.len(),
        inputs.transactions.len(),
        inputs.prices.len()
    );

    let outputs = Pipeline::with_config(config).run(&inputs);
    write_outputs(&inputs, &outputs, output_dir)
        .with_context(|| format!("Failed to write outputs to {}", output_dir.display()))
}

pub fn cmd_run(
    config_path: Option<&Path>,
    data_dir: &Path,
    output_dir: &Path,
    overrides: &Overrides,
    json: bool,
) -> Result<()> {
    let report = run_pipeline(config_path, data_dir, output_dir, overrides)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📊 Pipeline Complete");
    println!("   Output: {}", report.output_dir.display());
    println!("   ─────────────────────────────────────────────");
    println!("   Users:             {:>8}", report.users);
    println!("   Transactions:      {:>8}", report.transactions);
    println!("   Price points:      {:>8}", report.price_points);
    println!("   Anomalies flagged: {:>8}", report.anomalies_flagged);
    println!();
    println!("   {:30} │ {:>8}", "File", "Rows");
    println!("   ───────────────────────────────┼──────────");
    for table in &report.tables {
        println!("   {:30} │ {:>8}", table.file, table.rows);
    }

    Ok(())
}
