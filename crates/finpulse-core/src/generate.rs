//! Synthetic users, transactions and prices
//!
//! Produces a dataset shaped like real personal-finance activity: monthly
//! salaries, occasional bank deposits, a Poisson number of everyday
//! transactions per day and slowly trending asset prices. A fixed seed gives
//! the same dataset every time.

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::info;

use crate::error::{Error, Result};
use crate::export::write_table_file;
use crate::import::{Inputs, PRICES_FILE, TRANSACTIONS_FILE, USERS_FILE};
use crate::models::{PricePoint, Transaction, TransactionType, User};
use crate::stats::round2;

/// Everyday categories and their relative draw weights
const CATEGORIES: [(&str, u32); 9] = [
    ("groceries", 30),
    ("rent", 5),
    ("entertainment", 10),
    ("utilities", 10),
    ("travel", 5),
    ("transfer", 3),
    ("deposit", 3),
    ("salary", 2),
    ("subscription", 5),
];

/// Asset names and base prices
const ASSETS: [(&str, f64); 3] = [("gold", 1800.0), ("silver", 22.0), ("bitcoin", 40000.0)];

/// Mean number of everyday transactions per user per day
const DAILY_TRANSACTION_RATE: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub users: usize,
    pub days: u32,
    /// Last generated day
    pub end_date: NaiveDate,
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    pub fn new(end_date: NaiveDate) -> Self {
        Self {
            users: 5,
            days: 180,
            end_date,
            seed: None,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.end_date - Duration::days(self.days.saturating_sub(1) as i64)
    }
}

/// Knuth's method; fine for the small rates used here
fn poisson(rng: &mut StdRng, lambda: f64) -> u32 {
    let limit = (-lambda).exp();
    let mut k = 0;
    let mut p = rng.gen::<f64>();
    while p > limit {
        k += 1;
        p *= rng.gen::<f64>();
    }
    k
}

/// Box-Muller transform
fn normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + z * std_dev
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> Result<chrono::NaiveDateTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .map(|t| date.and_time(t))
        .ok_or_else(|| Error::InvalidData(format!("Invalid time {}:{}", hour, minute)))
}

/// Build a complete synthetic dataset
pub fn generate(config: &GeneratorConfig) -> Result<Inputs> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let weights = WeightedIndex::new(CATEGORIES.iter().map(|(_, w)| *w))
        .map_err(|e| Error::InvalidData(format!("Bad category weights: {}", e)))?;

    let users: Vec<User> = (1..=config.users as i64)
        .map(|user_id| User {
            user_id,
            name: format!("user_{}", user_id),
            starting_balance: round2(rng.gen_range(200.0..2000.0)),
        })
        .collect();

    let start = config.start_date();
    let mut transactions = Vec::new();
    let mut next_id = 1;
    let mut push = |user_id: i64, timestamp, amount: f64, category: &str, kind, merchant: String| {
        transactions.push(Transaction {
            transaction_id: next_id,
            user_id,
            timestamp,
            amount,
            category: category.to_string(),
            kind,
            merchant,
        });
        next_id += 1;
    };

    for offset in 0..config.days {
        let date = start + Duration::days(offset as i64);
        for user in &users {
            if offset % 30 == 2 {
                let amount = round2(rng.gen_range(800.0..3000.0));
                push(
                    user.user_id,
                    at(date, 9, 0)?,
                    amount,
                    "salary",
                    TransactionType::Deposit,
                    "employer".into(),
                );
            }

            if rng.gen::<f64>() < 0.05 {
                let amount = round2(rng.gen_range(50.0..1000.0));
                push(
                    user.user_id,
                    at(date, 11, 0)?,
                    amount,
                    "deposit",
                    TransactionType::Deposit,
                    "bank_transfer".into(),
                );
            }

            for _ in 0..poisson(&mut rng, DAILY_TRANSACTION_RATE) {
                let category = CATEGORIES[weights.sample(&mut rng)].0;
                let (amount, kind) = match category {
                    // Salary only arrives on payday
                    "salary" => continue,
                    "rent" => (round2(rng.gen_range(400.0..1200.0)), TransactionType::Spend),
                    "deposit" => (round2(rng.gen_range(20.0..400.0)), TransactionType::Deposit),
                    "transfer" => (round2(rng.gen_range(50.0..800.0)), TransactionType::Transfer),
                    _ => (
                        round2(normal(&mut rng, 50.0, 30.0).abs()) + 1.0,
                        TransactionType::Spend,
                    ),
                };
                let timestamp = at(date, rng.gen_range(8..=22), rng.gen_range(0..60))?;
                let merchant = format!("merchant_{}", rng.gen_range(1..=30));
                push(user.user_id, timestamp, amount, category, kind, merchant);
            }
        }
    }

    let mut prices = Vec::with_capacity(config.days as usize * ASSETS.len());
    for i in 0..config.days {
        let date = start + Duration::days(i as i64);
        for (asset, base) in ASSETS {
            let noise = normal(&mut rng, 0.0, 1.0);
            let price = base * (1.0 + 0.0006 * i as f64) + noise * (base * 0.005);
            prices.push(PricePoint {
                date,
                asset: asset.to_string(),
                price: round2(price).max(0.01),
            });
        }
    }

    Ok(Inputs {
        users,
        transactions,
        prices,
    })
}

/// Write a dataset as the three input CSVs
pub fn write_inputs(inputs: &Inputs, data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;

    write_table_file(&data_dir.join(USERS_FILE), &inputs.users)?;
    write_table_file(&data_dir.join(TRANSACTIONS_FILE), &inputs.transactions)?;
    write_table_file(&data_dir.join(PRICES_FILE), &inputs.prices)?;

    info!(
        "Wrote {} users, {} transactions, {} prices to {}",
        inputs.users.len(),
        inputs.transactions.len(),
        inputs.prices.len(),
        data_dir.display()
    );
    Ok(())
}
