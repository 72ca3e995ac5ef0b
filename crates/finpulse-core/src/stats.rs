//! Grouping and population statistics shared by the pipeline stages

use std::collections::BTreeMap;

/// Partition rows by key, keeping input order within each group
///
/// Groups come back in ascending key order so flattening them yields a
/// deterministic global order.
pub fn group_by<T, K, F>(rows: impl IntoIterator<Item = T>, key: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (denominator N)
///
/// A constant series is exactly 0 rather than whatever rounding residue the
/// mean leaves behind.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Z-scores of a series, all zero when the variance is zero or undefined
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    let (Some(mu), Some(sigma)) = (mean(values), population_std(values)) else {
        return Vec::new();
    };
    if sigma == 0.0 || !sigma.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mu) / sigma).collect()
}

/// Trailing mean over the last `window` values, narrowing at the start
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Fractional change of the last value versus the one `periods` rows earlier
///
/// None when the lookback row does not exist or is zero.
pub fn pct_change_latest(values: &[f64], periods: usize) -> Option<f64> {
    let last = values.len().checked_sub(1)?;
    let base_idx = last.checked_sub(periods)?;
    let base = values[base_idx];
    if base == 0.0 || periods == 0 {
        return None;
    }
    Some(values[last] / base - 1.0)
}

/// Round to two decimal places, ties to even on the scaled value
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Round the exact decimal value of `value` to two places
///
/// Unlike [`round2`] there is no intermediate `value * 100` product, so a
/// double just below a tie (1350.405 stored as 1350.40499..) rounds down.
pub fn round2_decimal(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
