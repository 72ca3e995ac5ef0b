//! Report command implementations

use std::path::Path;

use anyhow::Result;
use finpulse_core::models::Recommendation;
use finpulse_core::{Pipeline, SummaryFormatter};

use super::{load_config, open_inputs, truncate, Overrides};

/// Summary lines for every user-day (or user-week), optionally for one user
pub fn summary_lines(
    config_path: Option<&Path>,
    data_dir: &Path,
    user: Option<i64>,
    weekly: bool,
) -> Result<Vec<String>> {
    let config = load_config(config_path, &Overrides::default())?;
    let formatter = SummaryFormatter::with_currency(&config.currency_symbol);
    let inputs = open_inputs(data_dir)?;
    let outputs = Pipeline::with_config(config).run(&inputs);

    let lines = if weekly {
        let weekly_rows: Vec<_> = outputs
            .weekly
            .into_iter()
            .filter(|w| user.map_or(true, |id| w.user_id == id))
            .collect();
        formatter
            .compose_weekly_summary(&weekly_rows)
            .into_iter()
            .map(|s| s.summary)
            .collect()
    } else {
        formatter
            .compose_daily_summary(&outputs.features, &outputs.transaction_anomalies, user)
            .into_iter()
            .map(|s| s.summary)
            .collect()
    };

    Ok(lines)
}

pub fn cmd_summary(
    config_path: Option<&Path>,
    data_dir: &Path,
    user: Option<i64>,
    weekly: bool,
) -> Result<()> {
    let lines = summary_lines(config_path, data_dir, user, weekly)?;

    println!();
    if weekly {
        println!("📅 Weekly Summaries");
    } else {
        println!("📅 Daily Summaries");
    }
    println!("   ─────────────────────────────────────────────────────────────");

    if lines.is_empty() {
        match user {
            Some(id) => println!("   No activity found for user {}.", id),
            None => println!("   No activity found."),
        }
        return Ok(());
    }

    for line in &lines {
        println!("   {}", line);
    }
    Ok(())
}

/// Investment signals for the dataset in `data_dir`
pub fn recommendations(config_path: Option<&Path>, data_dir: &Path) -> Result<Vec<Recommendation>> {
    let config = load_config(config_path, &Overrides::default())?;
    let inputs = open_inputs(data_dir)?;
    Ok(Pipeline::with_config(config).run(&inputs).recommendations)
}

pub fn cmd_recommend(config_path: Option<&Path>, data_dir: &Path) -> Result<()> {
    let recs = recommendations(config_path, data_dir)?;

    println!();
    println!("💡 Investment Recommendations");
    println!("   ─────────────────────────────────────────────────────────────");

    if recs.is_empty() {
        println!("   No assets meet the buy or take-profit rules right now.");
        return Ok(());
    }

    println!(
        "   {:>5} │ {:10} │ {:22} │ {:>10} │ {}",
        "User", "Asset", "Action", "Price", "Reason"
    );
    println!("   ──────┼────────────┼────────────────────────┼────────────┼──────────────────────");
    for rec in &recs {
        println!(
            "   {:>5} │ {:10} │ {:22} │ {:>10.2} │ {}",
            rec.user_id,
            truncate(&rec.asset, 10),
            rec.action.as_str(),
            rec.price,
            truncate(&rec.reason, 60)
        );
    }
    println!();
    println!("   {} recommendation(s)", recs.len());

    Ok(())
}
