//! CSV loaders for the three input tables
//!
//! Any unreadable row is fatal: a missing column, an unparseable date or
//! number, an unknown transaction type, a negative amount or a non-positive
//! price aborts the load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{PricePoint, Transaction, User};

pub const USERS_FILE: &str = "users.csv";
pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const PRICES_FILE: &str = "prices.csv";

/// Everything the pipeline reads
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub users: Vec<User>,
    pub transactions: Vec<Transaction>,
    pub prices: Vec<PricePoint>,
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Parse `users.csv` content
pub fn parse_users<R: Read>(reader: R) -> Result<Vec<User>> {
    let users: Vec<User> = read_rows(reader)?;
    debug!("Parsed {} users", users.len());
    Ok(users)
}

/// Parse `transactions.csv` content
pub fn parse_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = read_rows(reader)?;

    for tx in &transactions {
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(Error::Import(format!(
                "Transaction {} has invalid amount {}",
                tx.transaction_id, tx.amount
            )));
        }
    }

    debug!("Parsed {} transactions", transactions.len());
    Ok(transactions)
}

/// Parse `prices.csv` content, sorted by (asset, date)
pub fn parse_prices<R: Read>(reader: R) -> Result<Vec<PricePoint>> {
    let mut prices: Vec<PricePoint> = read_rows(reader)?;

    for p in &prices {
        if !p.price.is_finite() || p.price <= 0.0 {
            return Err(Error::Import(format!(
                "Price for {} on {} must be positive, got {}",
                p.asset, p.date, p.price
            )));
        }
    }

    prices.sort_by(|a, b| a.asset.cmp(&b.asset).then(a.date.cmp(&b.date)));
    debug!("Parsed {} price points", prices.len());
    Ok(prices)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::Import(format!("{}: {}", path.display(), e)))
}

fn with_path<T>(path: &Path, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        Error::Import(msg) => Error::Import(format!("{}: {}", path.display(), msg)),
        other => Error::Import(format!("{}: {}", path.display(), other)),
    })
}

/// Load users, transactions and prices from a data directory
pub fn load_inputs(data_dir: &Path) -> Result<Inputs> {
    let users_path = data_dir.join(USERS_FILE);
    let transactions_path = data_dir.join(TRANSACTIONS_FILE);
    let prices_path = data_dir.join(PRICES_FILE);

    let users = with_path(&users_path, parse_users(open(&users_path)?))?;
    let transactions = with_path(
        &transactions_path,
        parse_transactions(open(&transactions_path)?),
    )?;
    let prices = with_path(&prices_path, parse_prices(open(&prices_path)?))?;

    Ok(Inputs {
        users,
        transactions,
        prices,
    })
}

/// Parse a timestamp in any of the accepted formats
///
/// A bare date is taken as midnight.
pub fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    for fmt in formats {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }

    if let Some(ts) = parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)) {
        return Ok(ts);
    }

    Err(format!("Could not parse timestamp: {}", s))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    const TRANSACTIONS: &str = "transaction_id,user_id,timestamp,amount,category,type,merchant
1,1,2024-01-03 09:00:00,1500.0,salary,deposit,employer
2,1,2024-01-03 8:05:00,42.5,groceries,spend,merchant_4
3,2,2024-01-04,300,transfer,transfer,merchant_9
";

    #[test]
    fn test_parse_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-15 09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-15 09:30").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2024-01-15 09:30:00 ").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(parse_timestamp("15/01/2024").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_parse_transactions() {
        let txs = parse_transactions(TRANSACTIONS.as_bytes()).unwrap();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].kind, TransactionType::Deposit);
        assert_eq!(txs[0].category, "salary");
        // Unpadded hour from the generator's format
        assert_eq!(txs[1].timestamp.format("%H:%M").to_string(), "08:05");
        assert_eq!(txs[2].kind, TransactionType::Transfer);
        assert_eq!(txs[2].amount, 300.0);
    }

    #[test]
    fn test_parse_transactions_unknown_type() {
        let csv = "transaction_id,user_id,timestamp,amount,category,type,merchant
1,1,2024-01-03 09:00:00,10,salary,income,employer
";
        assert!(parse_transactions(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_transactions_type_is_lowercase() {
        let csv = "transaction_id,user_id,timestamp,amount,category,type,merchant
1,1,2024-01-03 09:00:00,10,salary,DEPOSIT,employer
";
        assert!(parse_transactions(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_transactions_missing_column() {
        let csv = "transaction_id,user_id,timestamp,amount,category,type
1,1,2024-01-03 09:00:00,10,groceries,spend
";
        assert!(parse_transactions(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_transactions_bad_number() {
        let csv = "transaction_id,user_id,timestamp,amount,category,type,merchant
1,1,2024-01-03 09:00:00,ten,groceries,spend,merchant_1
";
        assert!(parse_transactions(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_transactions_negative_amount() {
        let csv = "transaction_id,user_id,timestamp,amount,category,type,merchant
1,1,2024-01-03 09:00:00,-10,groceries,spend,merchant_1
";
        let err = parse_transactions(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid amount"));
    }

    #[test]
    fn test_parse_prices_sorted() {
        let csv = "date,asset,price
2024-01-02,silver,22.5
2024-01-02,gold,1801.0
2024-01-01,gold,1800.0
";
        let prices = parse_prices(csv.as_bytes()).unwrap();
        let order: Vec<_> = prices.iter().map(|p| (p.asset.as_str(), p.price)).collect();
        assert_eq!(order, vec![("gold", 1800.0), ("gold", 1801.0), ("silver", 22.5)]);
    }

    #[test]
    fn test_parse_prices_rejects_zero() {
        let csv = "date,asset,price\n2024-01-01,gold,0\n";
        assert!(parse_prices(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_users() {
        let csv = "user_id,name,starting_balance\n1,user_1,512.34\n2,user_2,1999.99\n";
        let users = parse_users(csv.as_bytes()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "user_2");
    }

    #[test]
    fn test_load_inputs_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_inputs(dir.path()).unwrap_err();
        assert!(err.to_string().contains("users.csv"));
    }
}
