//! End-to-end batch run
//!
//! Stages run in a fixed order, each materializing its whole table before
//! the next starts:
//! transactions -> daily -> {features, weekly, anomalies, budgets, summaries}
//! prices -> momentum -> recommendations (joined with mean savings rate)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::aggregate::{add_rolling_features, daily_user_aggregates, weekly_user_aggregates};
use crate::anomaly::{daily_net_anomalies, transaction_zscore_anomalies};
use crate::budget::BudgetEstimator;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::export::{write_table_file, Table};
use crate::import::Inputs;
use crate::investment::{asset_momentum, investment_recommendations, user_savings_rates};
use crate::models::{
    AssetMomentum, CategoryBudget, DailyAggregate, DailyAnomaly, DailyFeatureRow, DailySummary,
    OverallBudget, Recommendation, TransactionAnomaly, WeeklyAggregate, WeeklySummary,
};
use crate::summaries::SummaryFormatter;

/// Every table one run produces
#[derive(Debug, Clone, Default)]
pub struct PipelineOutputs {
    pub daily: Vec<DailyAggregate>,
    pub features: Vec<DailyFeatureRow>,
    pub weekly: Vec<WeeklyAggregate>,
    pub transaction_anomalies: Vec<TransactionAnomaly>,
    pub daily_anomalies: Vec<DailyAnomaly>,
    pub category_budgets: Vec<CategoryBudget>,
    pub overall_budgets: Vec<OverallBudget>,
    pub momentum: Vec<AssetMomentum>,
    pub recommendations: Vec<Recommendation>,
    pub daily_summaries: Vec<DailySummary>,
    pub weekly_summaries: Vec<WeeklySummary>,
}

/// One written output file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    pub file: String,
    pub rows: usize,
}

/// What a run wrote and where
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub users: usize,
    pub transactions: usize,
    pub price_points: usize,
    pub anomalies_flagged: usize,
    pub tables: Vec<TableReport>,
}

impl RunReport {
    pub fn rows(&self, file: &str) -> Option<usize> {
        self.tables.iter().find(|t| t.file == file).map(|t| t.rows)
    }
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run every stage over the loaded inputs
    pub fn run(&self, inputs: &Inputs) -> PipelineOutputs {
        let cfg = &self.config;

        info!("Computing daily aggregates...");
        let daily = daily_user_aggregates(&inputs.transactions);

        info!("Adding rolling features...");
        let features = add_rolling_features(&daily, cfg.rolling_window);

        info!("Weekly aggregates...");
        let weekly = weekly_user_aggregates(&daily);

        info!("Detecting anomalies (transaction-level)...");
        let transaction_anomalies =
            transaction_zscore_anomalies(&inputs.transactions, cfg.z_threshold);

        info!("Detecting anomalies (daily net)...");
        let daily_anomalies = daily_net_anomalies(&daily, cfg.z_threshold);

        info!("Budget suggestions...");
        let estimator = BudgetEstimator::with_rules(cfg.budget.clone());
        let category_budgets = estimator.category_monthly_budget(&inputs.transactions);
        let overall_budgets = estimator.smart_overall_budget(&features);

        info!("Asset momentum & investment recommendations...");
        let momentum = asset_momentum(&inputs.prices, cfg.window_short, cfg.window_long);
        let savings = user_savings_rates(&features);
        let recommendations =
            investment_recommendations(&savings, &momentum, &cfg.recommendations);
        if recommendations.is_empty() {
            info!("No recommendations qualify for this data and rules");
        }

        info!("Producing readable summaries...");
        let formatter = SummaryFormatter::with_currency(&cfg.currency_symbol);
        let daily_summaries = formatter.compose_daily_summary(&features, &transaction_anomalies, None);
        let weekly_summaries = formatter.compose_weekly_summary(&weekly);

        PipelineOutputs {
            daily,
            features,
            weekly,
            transaction_anomalies,
            daily_anomalies,
            category_budgets,
            overall_budgets,
            momentum,
            recommendations,
            daily_summaries,
            weekly_summaries,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn write_one<T: Table>(dir: &Path, file: &str, rows: &[T], tables: &mut Vec<TableReport>) -> Result<()> {
    write_table_file(&dir.join(file), rows)?;
    info!("Saved {} ({} rows)", file, rows.len());
    tables.push(TableReport {
        file: file.to_string(),
        rows: rows.len(),
    });
    Ok(())
}

/// Write every output table into `output_dir`, creating it if needed
pub fn write_outputs(inputs: &Inputs, outputs: &PipelineOutputs, output_dir: &Path) -> Result<RunReport> {
    fs::create_dir_all(output_dir)?;

    let mut tables = Vec::new();
    write_one(output_dir, "daily_aggregates.csv", &outputs.daily, &mut tables)?;
    write_one(output_dir, "daily_features.csv", &outputs.features, &mut tables)?;
    write_one(output_dir, "weekly_aggregates.csv", &outputs.weekly, &mut tables)?;
    write_one(
        output_dir,
        "anomalies_transactions.csv",
        &outputs.transaction_anomalies,
        &mut tables,
    )?;
    write_one(output_dir, "anomalies_daily.csv", &outputs.daily_anomalies, &mut tables)?;
    write_one(
        output_dir,
        "budgets_by_category.csv",
        &outputs.category_budgets,
        &mut tables,
    )?;
    write_one(output_dir, "budgets_overall.csv", &outputs.overall_budgets, &mut tables)?;
    write_one(output_dir, "asset_momentum.csv", &outputs.momentum, &mut tables)?;
    write_one(output_dir, "recommendations.csv", &outputs.recommendations, &mut tables)?;
    write_one(output_dir, "daily_summaries.csv", &outputs.daily_summaries, &mut tables)?;
    write_one(output_dir, "weekly_summaries.csv", &outputs.weekly_summaries, &mut tables)?;

    Ok(RunReport {
        output_dir: output_dir.to_path_buf(),
        users: inputs.users.len(),
        transactions: inputs.transactions.len(),
        price_points: inputs.prices.len(),
        anomalies_flagged: outputs
            .transaction_anomalies
            .iter()
            .filter(|a| a.is_anomaly)
            .count(),
        tables,
    })
}
