//! Budget recommendations
//!
//! Two estimates per user:
//! - Per category: average monthly spend plus slack
//! - Overall: latest rolling daily spend scaled to a month, trimmed when the
//!   user saves too little

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::debug;

use crate::models::{CategoryBudget, DailyFeatureRow, OverallBudget, Transaction, TransactionType};
use crate::stats::{group_by, mean, round2, round2_decimal};

/// Thresholds and multipliers used by [`BudgetEstimator`]
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRules {
    /// Multiplier on average monthly category spend (default 1.05)
    pub category_slack: f64,
    /// Restrict category averages to this many trailing calendar months
    /// (default None = every month in the input)
    pub recent_months: Option<u32>,
    /// Mean savings rate below which the overall budget is cut (default 0.10)
    pub low_savings_rate: f64,
    /// Multiplier applied to low savers' estimate (default 0.9)
    pub low_savings_factor: f64,
    /// Days used to scale a daily average to a month (default 30)
    pub days_per_month: f64,
}

impl Default for BudgetRules {
    fn default() -> Self {
        Self {
            category_slack: 1.05,
            recent_months: None,
            low_savings_rate: 0.10,
            low_savings_factor: 0.9,
            days_per_month: 30.0,
        }
    }
}

pub struct BudgetEstimator {
    rules: BudgetRules,
}

/// Months since year 0, so consecutive months differ by one
fn month_index(year: i32, month: u32) -> i64 {
    year as i64 * 12 + month as i64 - 1
}

impl BudgetEstimator {
    pub fn new() -> Self {
        Self {
            rules: BudgetRules::default(),
        }
    }

    pub fn with_rules(rules: BudgetRules) -> Self {
        Self { rules }
    }

    /// Average monthly spend per (user, category) and a proposed budget
    ///
    /// Only `spend` transactions count. Months with no spend in a category are
    /// not averaged in. With `recent_months = Some(n)` only the `n` calendar
    /// months ending at the latest spend month are considered.
    pub fn category_monthly_budget(&self, transactions: &[Transaction]) -> Vec<CategoryBudget> {
        let mut monthly: BTreeMap<(i64, String, i64), f64> = BTreeMap::new();
        for tx in transactions.iter().filter(|t| t.kind == TransactionType::Spend) {
            let date = tx.date();
            let month = month_index(date.year(), date.month());
            *monthly
                .entry((tx.user_id, tx.category.clone(), month))
                .or_insert(0.0) += tx.amount;
        }

        let cutoff = match (self.rules.recent_months, monthly.keys().map(|k| k.2).max()) {
            (Some(n), Some(latest)) => Some(latest - n as i64 + 1),
            _ => None,
        };

        let in_window = monthly
            .into_iter()
            .filter(|((_, _, month), _)| cutoff.map_or(true, |c| *month >= c));

        let mut budgets = Vec::new();
        for ((user_id, category), sums) in group_by(in_window, |((u, c, _), _)| (*u, c.clone())) {
            let totals: Vec<f64> = sums.into_iter().map(|(_, total)| total).collect();
            let Some(avg_monthly_spend) = mean(&totals) else {
                continue;
            };
            budgets.push(CategoryBudget {
                user_id,
                category,
                avg_monthly_spend,
                proposed_budget: round2(avg_monthly_spend * self.rules.category_slack),
            });
        }

        debug!("Proposed {} category budgets", budgets.len());
        budgets
    }

    /// Monthly budget from the latest rolling spend and mean savings rate
    pub fn smart_overall_budget(&self, features: &[DailyFeatureRow]) -> Vec<OverallBudget> {
        let mut budgets = Vec::new();

        for (user_id, rows) in group_by(features.iter(), |f| f.user_id) {
            let Some(latest) = rows.iter().max_by_key(|f| f.date) else {
                continue;
            };
            let rates: Vec<f64> = rows.iter().map(|f| f.savings_rate).collect();
            let savings_rate = mean(&rates).unwrap_or(0.0);

            let estimated_monthly_spend =
                round2(latest.spend_7d_avg * self.rules.days_per_month);
            budgets.push(OverallBudget {
                user_id,
                estimated_monthly_spend,
                savings_rate,
                recommended_monthly_budget: self.adjust_for_savings(
                    estimated_monthly_spend,
                    savings_rate,
                ),
            });
        }

        budgets
    }

    /// Cut the estimate for users saving less than the threshold
    ///
    /// The result is rounded on its exact decimal value, not on `x * 100`.
    pub fn adjust_for_savings(&self, estimated: f64, savings_rate: f64) -> f64 {
        if savings_rate < self.rules.low_savings_rate {
            round2_decimal(estimated * self.rules.low_savings_factor)
        } else {
            round2_decimal(estimated)
        }
    }
}

impl Default for BudgetEstimator {
    fn default() -> Self {
        Self::new()
    }
}
