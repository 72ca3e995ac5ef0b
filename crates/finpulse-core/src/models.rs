//! Domain models for finpulse
//!
//! Input records (users, transactions, prices) and every derived table the
//! pipeline produces. Field order is the CSV column order.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A user from `users.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub starting_balance: f64,
}

/// How a transaction moves money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Spend,
    Deposit,
    Transfer,
}

/// A raw transaction from `transactions.csv`
///
/// `amount` is a non-negative magnitude; `kind` decides its effect on net.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: i64,
    pub user_id: i64,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub merchant: String,
}

impl Transaction {
    /// Calendar date of the transaction
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Per-user, per-day totals by transaction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub user_id: i64,
    pub date: NaiveDate,
    pub spend: f64,
    pub deposit: f64,
    pub transfer: f64,
    /// deposit - spend - transfer
    pub net: f64,
}

/// Per-user totals over a Monday-anchored week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAggregate {
    pub user_id: i64,
    pub week_start: NaiveDate,
    pub spend: f64,
    pub deposit: f64,
    pub transfer: f64,
    pub net: f64,
}

/// A daily aggregate with rolling averages and savings rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFeatureRow {
    pub user_id: i64,
    pub date: NaiveDate,
    pub spend: f64,
    pub deposit: f64,
    pub transfer: f64,
    pub net: f64,
    pub spend_7d_avg: f64,
    pub deposit_7d_avg: f64,
    /// deposit / (deposit + spend), 0 when both are 0
    pub savings_rate: f64,
}

/// A transaction scored against the user's full history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAnomaly {
    pub transaction_id: i64,
    pub user_id: i64,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub merchant: String,
    pub z: f64,
    pub is_anomaly: bool,
}

/// A daily aggregate scored on its net movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAnomaly {
    pub user_id: i64,
    pub date: NaiveDate,
    pub spend: f64,
    pub deposit: f64,
    pub transfer: f64,
    pub net: f64,
    pub z_net: f64,
    pub is_anomaly: bool,
}

/// Monthly budget proposal for one spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub user_id: i64,
    pub category: String,
    pub avg_monthly_spend: f64,
    pub proposed_budget: f64,
}

/// Overall monthly budget proposal for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallBudget {
    pub user_id: i64,
    pub estimated_monthly_spend: f64,
    /// Mean daily savings rate
    pub savings_rate: f64,
    pub recommended_monthly_budget: f64,
}

/// A daily asset price from `prices.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub asset: String,
    pub price: f64,
}

/// Latest-date momentum snapshot for an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMomentum {
    pub asset: String,
    pub date: NaiveDate,
    pub price: f64,
    pub pct_7d: f64,
    pub pct_30d: f64,
}

/// Mean savings rate of a user, the user side of the recommendation join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSavings {
    pub user_id: i64,
    pub savings_rate: f64,
}

/// Signal emitted by the recommendation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy,
    ConsiderTakeProfit,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::ConsiderTakeProfit => "CONSIDER_TAKE_PROFIT",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: i64,
    pub asset: String,
    pub action: Action,
    pub reason: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub user_id: i64,
    pub date: NaiveDate,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub user_id: i64,
    /// Monday starting the week
    pub week: NaiveDate,
    pub summary: String,
}

/// Serde adapter writing timestamps as `YYYY-MM-DD HH:MM:SS`
///
/// Reading accepts every format `import::parse_timestamp` does.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        crate::import::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
