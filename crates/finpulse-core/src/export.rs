//! CSV writers for pipeline output tables
//!
//! Every table is written with its header row, so an empty result is still a
//! readable, zero-row table rather than an empty file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::Result;
use crate::models::{
    AssetMomentum, CategoryBudget, DailyAggregate, DailyAnomaly, DailyFeatureRow, DailySummary,
    OverallBudget, PricePoint, Recommendation, Transaction, TransactionAnomaly, User,
    WeeklyAggregate, WeeklySummary,
};

/// A row type with a fixed column layout
pub trait Table: Serialize {
    /// Column names in field order
    const COLUMNS: &'static [&'static str];
}

impl Table for User {
    const COLUMNS: &'static [&'static str] = &["user_id", "name", "starting_balance"];
}

impl Table for Transaction {
    const COLUMNS: &'static [&'static str] = &[
        "transaction_id",
        "user_id",
        "timestamp",
        "amount",
        "category",
        "type",
        "merchant",
    ];
}

impl Table for PricePoint {
    const COLUMNS: &'static [&'static str] = &["date", "asset", "price"];
}

impl Table for DailyAggregate {
    const COLUMNS: &'static [&'static str] =
        &["user_id", "date", "spend", "deposit", "transfer", "net"];
}

impl Table for WeeklyAggregate {
    const COLUMNS: &'static [&'static str] =
        &["user_id", "week_start", "spend", "deposit", "transfer", "net"];
}

impl Table for DailyFeatureRow {
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "date",
        "spend",
        "deposit",
        "transfer",
        "net",
        "spend_7d_avg",
        "deposit_7d_avg",
        "savings_rate",
    ];
}

impl Table for TransactionAnomaly {
    const COLUMNS: &'static [&'static str] = &[
        "transaction_id",
        "user_id",
        "timestamp",
        "amount",
        "category",
        "type",
        "merchant",
        "z",
        "is_anomaly",
    ];
}

impl Table for DailyAnomaly {
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "date",
        "spend",
        "deposit",
        "transfer",
        "net",
        "z_net",
        "is_anomaly",
    ];
}

impl Table for CategoryBudget {
    const COLUMNS: &'static [&'static str] =
        &["user_id", "category", "avg_monthly_spend", "proposed_budget"];
}

impl Table for OverallBudget {
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "estimated_monthly_spend",
        "savings_rate",
        "recommended_monthly_budget",
    ];
}

impl Table for AssetMomentum {
    const COLUMNS: &'static [&'static str] = &["asset", "date", "price", "pct_7d", "pct_30d"];
}

impl Table for Recommendation {
    const COLUMNS: &'static [&'static str] = &["user_id", "asset", "action", "reason", "price"];
}

impl Table for DailySummary {
    const COLUMNS: &'static [&'static str] = &["user_id", "date", "summary"];
}

impl Table for WeeklySummary {
    const COLUMNS: &'static [&'static str] = &["user_id", "week", "summary"];
}

/// Write a header row followed by every row
pub fn write_table<T: Table, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(T::COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table to `path`, replacing any existing file
pub fn write_table_file<T: Table>(path: &Path, rows: &[T]) -> Result<()> {
    write_table(File::create(path)?, rows)
}

/// Render a table as a CSV string
pub fn table_to_string<T: Table>(rows: &[T]) -> Result<String> {
    let mut buf = Vec::new();
    write_table(&mut buf, rows)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, TransactionType};
    use chrono::NaiveDate;

    /// Header the csv crate derives from the struct's fields
    fn derived_header<T: Serialize>(row: &T) -> String {
        let mut wtr = WriterBuilder::new().from_writer(Vec::new());
        wtr.serialize(row).unwrap();
        let bytes = wtr.into_inner().unwrap();
        String::from_utf8(bytes).unwrap().lines().next().unwrap().to_string()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_columns_match_fields() {
        let daily = DailyAggregate {
            user_id: 1,
            date: day(),
            spend: 1.0,
            deposit: 2.0,
            transfer: 0.0,
            net: 1.0,
        };
        assert_eq!(derived_header(&daily), DailyAggregate::COLUMNS.join(","));

        let anomaly = TransactionAnomaly {
            transaction_id: 1,
            user_id: 1,
            timestamp: day().and_hms_opt(9, 0, 0).unwrap(),
            amount: 5.0,
            category: "groceries".into(),
            kind: TransactionType::Spend,
            merchant: "m".into(),
            z: 0.0,
            is_anomaly: false,
        };
        assert_eq!(derived_header(&anomaly), TransactionAnomaly::COLUMNS.join(","));

        let rec = Recommendation {
            user_id: 1,
            asset: "gold".into(),
            action: Action::Buy,
            reason: "r".into(),
            price: 1.0,
        };
        assert_eq!(derived_header(&rec), Recommendation::COLUMNS.join(","));

        let momentum = AssetMomentum {
            asset: "gold".into(),
            date: day(),
            price: 1.0,
            pct_7d: 0.0,
            pct_30d: 0.0,
        };
        assert_eq!(derived_header(&momentum), AssetMomentum::COLUMNS.join(","));

        let weekly = WeeklySummary {
            user_id: 1,
            week: day(),
            summary: "s".into(),
        };
        assert_eq!(derived_header(&weekly), WeeklySummary::COLUMNS.join(","));
    }

    #[test]
    fn test_weekly_summary_columns() {
        let rows = vec![WeeklySummary {
            user_id: 4,
            week: day(),
            summary: "s".into(),
        }];
        let out = table_to_string(&rows).unwrap();
        assert_eq!(out, "user_id,week,summary\n4,2024-01-01,s\n");
    }

    #[test]
    fn test_empty_table_has_header() {
        let out = table_to_string::<Recommendation>(&[]).unwrap();
        assert_eq!(out, "user_id,asset,action,reason,price\n");
    }

    #[test]
    fn test_row_formatting() {
        let rows = vec![TransactionAnomaly {
            transaction_id: 7,
            user_id: 2,
            timestamp: day().and_hms_opt(8, 5, 0).unwrap(),
            amount: 42.5,
            category: "groceries".into(),
            kind: TransactionType::Spend,
            merchant: "merchant_1".into(),
            z: 0.0,
            is_anomaly: true,
        }];
        let out = table_to_string(&rows).unwrap();
        let line = out.lines().nth(1).unwrap();
        assert_eq!(line, "7,2,2024-01-01 08:05:00,42.5,groceries,spend,merchant_1,0.0,true");
    }

    #[test]
    fn test_write_table_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("budgets_by_category.csv");
        let rows = vec![CategoryBudget {
            user_id: 1,
            category: "rent".into(),
            avg_monthly_spend: 800.0,
            proposed_budget: 840.0,
        }];
        write_table_file(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "user_id,category,avg_monthly_spend,proposed_budget\n1,rent,800.0,840.0\n"
        );
    }
}
