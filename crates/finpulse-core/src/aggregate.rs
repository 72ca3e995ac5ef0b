//! Daily and weekly spending aggregates
//!
//! Turns the raw transaction log into per-user tables:
//! - Daily totals per transaction type, pivoted into columns, with net
//! - Weekly (Monday-anchored) sums of the daily tables
//! - Rolling averages and savings rate on top of the daily table

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::models::{
    DailyAggregate, DailyFeatureRow, Transaction, TransactionType, WeeklyAggregate,
};
use crate::stats::{group_by, rolling_mean};

/// Default trailing window for rolling averages, in rows
pub const DEFAULT_ROLLING_WINDOW: usize = 7;

#[derive(Debug, Default, Clone, Copy)]
struct TypeTotals {
    spend: f64,
    deposit: f64,
    transfer: f64,
}

impl TypeTotals {
    fn add(&mut self, kind: TransactionType, amount: f64) {
        match kind {
            TransactionType::Spend => self.spend += amount,
            TransactionType::Deposit => self.deposit += amount,
            TransactionType::Transfer => self.transfer += amount,
        }
    }

    fn net(&self) -> f64 {
        self.deposit - self.spend - self.transfer
    }
}

/// Sum transactions per (user, calendar day), one column per type
///
/// Types missing on a day are 0. Rows are sorted by (user_id, date).
pub fn daily_user_aggregates(transactions: &[Transaction]) -> Vec<DailyAggregate> {
    let mut buckets: BTreeMap<(i64, NaiveDate), TypeTotals> = BTreeMap::new();

    for tx in transactions {
        buckets
            .entry((tx.user_id, tx.date()))
            .or_default()
            .add(tx.kind, tx.amount);
    }

    let daily: Vec<DailyAggregate> = buckets
        .into_iter()
        .map(|((user_id, date), totals)| DailyAggregate {
            user_id,
            date,
            spend: totals.spend,
            deposit: totals.deposit,
            transfer: totals.transfer,
            net: totals.net(),
        })
        .collect();

    debug!(
        "Aggregated {} transactions into {} user-days",
        transactions.len(),
        daily.len()
    );
    daily
}

/// Monday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sum daily rows per (user, week starting Monday)
pub fn weekly_user_aggregates(daily: &[DailyAggregate]) -> Vec<WeeklyAggregate> {
    let mut buckets: BTreeMap<(i64, NaiveDate), WeeklyAggregate> = BTreeMap::new();

    for day in daily {
        let week = week_start(day.date);
        let entry = buckets
            .entry((day.user_id, week))
            .or_insert_with(|| WeeklyAggregate {
                user_id: day.user_id,
                week_start: week,
                spend: 0.0,
                deposit: 0.0,
                transfer: 0.0,
                net: 0.0,
            });
        entry.spend += day.spend;
        entry.deposit += day.deposit;
        entry.transfer += day.transfer;
        entry.net += day.net;
    }

    buckets.into_values().collect()
}

/// deposit / (deposit + spend), 0 when nothing came in or went out
pub fn savings_rate(deposit: f64, spend: f64) -> f64 {
    let denominator = deposit + spend;
    if denominator > 0.0 {
        deposit / denominator
    } else {
        0.0
    }
}

/// Add trailing spend/deposit averages and savings rate to each daily row
///
/// Rows are sorted by date within each user before the window is applied,
/// so the first day of a user averages over itself only.
pub fn add_rolling_features(daily: &[DailyAggregate], window: usize) -> Vec<DailyFeatureRow> {
    let mut features = Vec::with_capacity(daily.len());

    for (_, mut rows) in group_by(daily.iter(), |d| d.user_id) {
        rows.sort_by_key(|d| d.date);

        let spend: Vec<f64> = rows.iter().map(|d| d.spend).collect();
        let deposit: Vec<f64> = rows.iter().map(|d| d.deposit).collect();
        let spend_avg = rolling_mean(&spend, window);
        let deposit_avg = rolling_mean(&deposit, window);

        for (i, day) in rows.into_iter().enumerate() {
            features.push(DailyFeatureRow {
                user_id: day.user_id,
                date: day.date,
                spend: day.spend,
                deposit: day.deposit,
                transfer: day.transfer,
                net: day.net,
                spend_7d_avg: spend_avg[i],
                deposit_7d_avg: deposit_avg[i],
                savings_rate: savings_rate(day.deposit, day.spend),
            });
        }
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn tx(id: i64, user_id: i64, timestamp: &str, amount: f64, kind: TransactionType) -> Transaction {
        Transaction {
            transaction_id: id,
            user_id,
            timestamp: ts(timestamp),
            amount,
            category: "groceries".into(),
            kind,
            merchant: "merchant_1".into(),
        }
    }

    fn day(user_id: i64, date: &str, spend: f64, deposit: f64) -> DailyAggregate {
        DailyAggregate {
            user_id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            spend,
            deposit,
            transfer: 0.0,
            net: deposit - spend,
        }
    }

    #[test]
    fn test_daily_pivot_and_net() {
        let txs = vec![
            tx(1, 1, "2024-01-01 09:00:00", 1000.0, TransactionType::Deposit),
            tx(2, 1, "2024-01-01 12:30:00", 40.0, TransactionType::Spend),
            tx(3, 1, "2024-01-01 18:00:00", 10.0, TransactionType::Spend),
            tx(4, 1, "2024-01-02 10:00:00", 200.0, TransactionType::Transfer),
        ];

        let daily = daily_user_aggregates(&txs);
        assert_eq!(daily.len(), 2);

        assert_eq!(daily[0].spend, 50.0);
        assert_eq!(daily[0].deposit, 1000.0);
        assert_eq!(daily[0].transfer, 0.0);
        assert_eq!(daily[0].net, 950.0);

        // Transfer-only day
        assert_eq!(daily[1].spend, 0.0);
        assert_eq!(daily[1].deposit, 0.0);
        assert_eq!(daily[1].transfer, 200.0);
        assert_eq!(daily[1].net, -200.0);

        for row in &daily {
            assert_eq!(row.net, row.deposit - row.spend - row.transfer);
        }
    }

    #[test]
    fn test_daily_row_count_matches_distinct_user_days() {
        let txs = vec![
            tx(1, 2, "2024-01-03 09:00:00", 5.0, TransactionType::Spend),
            tx(2, 1, "2024-01-03 09:00:00", 5.0, TransactionType::Spend),
            tx(3, 1, "2024-01-03 23:59:59", 5.0, TransactionType::Spend),
            tx(4, 1, "2024-01-04 00:00:00", 5.0, TransactionType::Spend),
        ];

        let daily = daily_user_aggregates(&txs);
        assert_eq!(daily.len(), 3);
        let keys: Vec<_> = daily.iter().map(|d| (d.user_id, d.date.day())).collect();
        assert_eq!(keys, vec![(1, 3), (1, 4), (2, 3)]);
    }

    #[test]
    fn test_daily_empty_input() {
        assert!(daily_user_aggregates(&[]).is_empty());
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(week_start(sunday), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn test_weekly_sums() {
        let daily = vec![
            day(1, "2024-01-01", 10.0, 0.0),
            day(1, "2024-01-07", 20.0, 100.0),
            day(1, "2024-01-08", 5.0, 0.0),
            day(2, "2024-01-02", 1.0, 0.0),
        ];

        let weekly = weekly_user_aggregates(&daily);
        assert_eq!(weekly.len(), 3);
        assert_eq!(weekly[0].week_start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(weekly[0].spend, 30.0);
        assert_eq!(weekly[0].deposit, 100.0);
        assert_eq!(weekly[0].net, 70.0);
        assert_eq!(weekly[1].week_start, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(weekly[2].user_id, 2);
    }

    #[test]
    fn test_rolling_first_day_equals_itself() {
        let daily = vec![
            day(1, "2024-01-02", 30.0, 0.0),
            day(1, "2024-01-01", 12.5, 7.0),
        ];

        let features = add_rolling_features(&daily, DEFAULT_ROLLING_WINDOW);
        assert_eq!(features[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(features[0].spend_7d_avg, 12.5);
        assert_eq!(features[0].deposit_7d_avg, 7.0);
        assert_eq!(features[1].spend_7d_avg, 21.25);
        assert_eq!(features[1].deposit_7d_avg, 3.5);
    }

    #[test]
    fn test_rolling_window_caps_at_seven_rows() {
        let daily: Vec<DailyAggregate> = (1..=9)
            .map(|d| day(1, &format!("2024-01-{:02}", d), d as f64, 0.0))
            .collect();

        let features = add_rolling_features(&daily, 7);
        // Rows 3..=9 -> mean 6
        assert_eq!(features[8].spend_7d_avg, 6.0);
        // Rows 1..=7 -> mean 4
        assert_eq!(features[6].spend_7d_avg, 4.0);
    }

    #[test]
    fn test_rolling_windows_do_not_cross_users() {
        let daily = vec![day(1, "2024-01-01", 100.0, 0.0), day(2, "2024-01-02", 2.0, 0.0)];
        let features = add_rolling_features(&daily, 7);
        assert_eq!(features[1].user_id, 2);
        assert_eq!(features[1].spend_7d_avg, 2.0);
    }

    #[test]
    fn test_savings_rate_bounds() {
        assert_eq!(savings_rate(0.0, 0.0), 0.0);
        assert_eq!(savings_rate(0.0, 50.0), 0.0);
        assert_eq!(savings_rate(50.0, 0.0), 1.0);
        assert_eq!(savings_rate(25.0, 75.0), 0.25);

        let daily = vec![DailyAggregate {
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            spend: 0.0,
            deposit: 0.0,
            transfer: 80.0,
            net: -80.0,
        }];
        let features = add_rolling_features(&daily, 7);
        assert_eq!(features[0].savings_rate, 0.0);
    }
}
