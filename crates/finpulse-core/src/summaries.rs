//! Human-readable daily and weekly summary lines

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{DailyFeatureRow, DailySummary, TransactionAnomaly, WeeklyAggregate, WeeklySummary};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Renders summary text with a fixed currency symbol
pub struct SummaryFormatter {
    currency: String,
}

impl SummaryFormatter {
    pub fn new() -> Self {
        Self::with_currency(DEFAULT_CURRENCY_SYMBOL)
    }

    pub fn with_currency(symbol: &str) -> Self {
        Self {
            currency: symbol.to_string(),
        }
    }

    /// One line per user-day, optionally restricted to a single user
    ///
    /// Each line counts the flagged transactions of that user on that date.
    pub fn compose_daily_summary(
        &self,
        features: &[DailyFeatureRow],
        anomalies: &[TransactionAnomaly],
        user_id: Option<i64>,
    ) -> Vec<DailySummary> {
        let mut flagged: HashMap<(i64, NaiveDate), usize> = HashMap::new();
        for a in anomalies.iter().filter(|a| a.is_anomaly) {
            *flagged.entry((a.user_id, a.timestamp.date())).or_insert(0) += 1;
        }

        features
            .iter()
            .filter(|f| user_id.map_or(true, |id| f.user_id == id))
            .map(|f| {
                let count = flagged.get(&(f.user_id, f.date)).copied().unwrap_or(0);
                DailySummary {
                    user_id: f.user_id,
                    date: f.date,
                    summary: format!(
                        "User {} | {} | Spent: {cur}{:.2}, Deposited: {cur}{:.2}, Savings rate: {:.2}, Anomalies: {}",
                        f.user_id,
                        f.date,
                        f.spend,
                        f.deposit,
                        f.savings_rate,
                        count,
                        cur = self.currency,
                    ),
                }
            })
            .collect()
    }

    pub fn compose_weekly_summary(&self, weekly: &[WeeklyAggregate]) -> Vec<WeeklySummary> {
        weekly
            .iter()
            .map(|w| WeeklySummary {
                user_id: w.user_id,
                week: w.week_start,
                summary: format!(
                    "User {} | Week starting {} | Spend: {cur}{:.2}, Deposits: {cur}{:.2}, Net: {cur}{:.2}",
                    w.user_id,
                    w.week_start,
                    w.spend,
                    w.deposit,
                    w.net,
                    cur = self.currency,
                ),
            })
            .collect()
    }
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn feature(user_id: i64, day: &str, spend: f64, deposit: f64) -> DailyFeatureRow {
        DailyFeatureRow {
            user_id,
            date: date(day),
            spend,
            deposit,
            transfer: 0.0,
            net: deposit - spend,
            spend_7d_avg: spend,
            deposit_7d_avg: deposit,
            savings_rate: crate::aggregate::savings_rate(deposit, spend),
        }
    }

    fn anomaly(user_id: i64, day: &str, is_anomaly: bool) -> TransactionAnomaly {
        TransactionAnomaly {
            transaction_id: 1,
            user_id,
            timestamp: date(day).and_hms_opt(14, 0, 0).unwrap(),
            amount: 5000.0,
            category: "travel".into(),
            kind: TransactionType::Spend,
            merchant: "merchant_3".into(),
            z: 4.0,
            is_anomaly,
        }
    }

    #[test]
    fn test_daily_summary_text() {
        let features = vec![feature(1, "2024-01-01", 50.0, 150.0)];
        let lines = SummaryFormatter::new().compose_daily_summary(&features, &[], None);

        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].summary,
            "User 1 | 2024-01-01 | Spent: ₹50.00, Deposited: ₹150.00, Savings rate: 0.75, Anomalies: 0"
        );
    }

    #[test]
    fn test_daily_summary_counts_flagged_only() {
        let features = vec![
            feature(1, "2024-01-01", 5000.0, 0.0),
            feature(1, "2024-01-02", 10.0, 0.0),
            feature(2, "2024-01-01", 10.0, 0.0),
        ];
        let anomalies = vec![
            anomaly(1, "2024-01-01", true),
            anomaly(1, "2024-01-01", true),
            anomaly(1, "2024-01-02", false),
        ];

        let lines = SummaryFormatter::new().compose_daily_summary(&features, &anomalies, None);
        assert!(lines[0].summary.ends_with("Anomalies: 2"));
        assert!(lines[1].summary.ends_with("Anomalies: 0"));
        assert!(lines[2].summary.ends_with("Anomalies: 0"));
    }

    #[test]
    fn test_daily_summary_user_filter() {
        let features = vec![feature(1, "2024-01-01", 1.0, 0.0), feature(2, "2024-01-01", 2.0, 0.0)];
        let lines = SummaryFormatter::new().compose_daily_summary(&features, &[], Some(2));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].user_id, 2);
    }

    #[test]
    fn test_weekly_summary_currency() {
        let weekly = vec![WeeklyAggregate {
            user_id: 3,
            week_start: date("2024-01-01"),
            spend: 12.5,
            deposit: 100.0,
            transfer: 0.0,
            net: 87.5,
        }];

        let lines = SummaryFormatter::with_currency("$").compose_weekly_summary(&weekly);
        assert_eq!(
            lines[0].summary,
            "User 3 | Week starting 2024-01-01 | Spend: $12.50, Deposits: $100.00, Net: $87.50"
        );
        assert_eq!(lines[0].week, date("2024-01-01"));
    }
}
