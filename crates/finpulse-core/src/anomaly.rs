//! Z-score anomaly scoring
//!
//! Every user's series is scored against that user's own full history using
//! the population mean and standard deviation. A user whose values never
//! vary gets z = 0 throughout and is never flagged.

use tracing::debug;

use crate::models::{DailyAggregate, DailyAnomaly, Transaction, TransactionAnomaly};
use crate::stats::{group_by, z_scores};

/// Default |z| above which a row is flagged
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Strictly greater than: |z| == threshold is not an anomaly
pub fn is_anomalous(z: f64, threshold: f64) -> bool {
    z.abs() > threshold
}

/// Score each transaction's absolute amount within its user's history
///
/// Output is sorted by (user_id, timestamp); ties keep input order.
pub fn transaction_zscore_anomalies(
    transactions: &[Transaction],
    threshold: f64,
) -> Vec<TransactionAnomaly> {
    let mut out = Vec::with_capacity(transactions.len());

    for (user_id, rows) in group_by(transactions.iter(), |t| t.user_id) {
        let amounts: Vec<f64> = rows.iter().map(|t| t.amount.abs()).collect();
        let z = z_scores(&amounts);
        if z.iter().all(|v| *v == 0.0) {
            debug!("User {} has no variance in transaction amounts", user_id);
        }

        for (tx, z) in rows.into_iter().zip(z) {
            out.push(TransactionAnomaly {
                transaction_id: tx.transaction_id,
                user_id: tx.user_id,
                timestamp: tx.timestamp,
                amount: tx.amount,
                category: tx.category.clone(),
                kind: tx.kind,
                merchant: tx.merchant.clone(),
                z,
                is_anomaly: is_anomalous(z, threshold),
            });
        }
    }

    out.sort_by_key(|a| (a.user_id, a.timestamp));
    out
}

/// Score each day's net movement within its user's history
///
/// Output is sorted by (user_id, date).
pub fn daily_net_anomalies(daily: &[DailyAggregate], threshold: f64) -> Vec<DailyAnomaly> {
    let mut out = Vec::with_capacity(daily.len());

    for (_, rows) in group_by(daily.iter(), |d| d.user_id) {
        let nets: Vec<f64> = rows.iter().map(|d| d.net).collect();
        let z = z_scores(&nets);

        for (day, z_net) in rows.into_iter().zip(z) {
            out.push(DailyAnomaly {
                user_id: day.user_id,
                date: day.date,
                spend: day.spend,
                deposit: day.deposit,
                transfer: day.transfer,
                net: day.net,
                z_net,
                is_anomaly: is_anomalous(z_net, threshold),
            });
        }
    }

    out.sort_by_key(|a| (a.user_id, a.date));
    out
}
