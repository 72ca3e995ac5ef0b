//! Asset momentum and investment signals
//!
//! Momentum is the fractional price change over a fixed number of rows. The
//! recommendation rules cross every user's savings posture with every asset's
//! latest momentum; the two signals are independent, so one (user, asset)
//! pair can emit both.

use tracing::debug;

use crate::models::{
    Action, AssetMomentum, DailyFeatureRow, PricePoint, Recommendation, UserSavings,
};
use crate::stats::{group_by, mean, pct_change_latest};

pub const DEFAULT_WINDOW_SHORT: usize = 7;
pub const DEFAULT_WINDOW_LONG: usize = 30;

/// Thresholds for the recommendation rules
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRules {
    /// BUY when short-window change is below this (default -0.03)
    pub buy_drop: f64,
    /// ...and the user's savings rate is above this (default 0.15)
    pub buy_min_savings_rate: f64,
    /// CONSIDER_TAKE_PROFIT when short-window change is above this (default 0.06)
    pub take_profit_rise: f64,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            buy_drop: -0.03,
            buy_min_savings_rate: 0.15,
            take_profit_rise: 0.06,
        }
    }
}

/// Latest price and short/long change per asset
///
/// Changes with no lookback row fall back to 0.0. Sorted by asset name.
pub fn asset_momentum(
    prices: &[PricePoint],
    window_short: usize,
    window_long: usize,
) -> Vec<AssetMomentum> {
    let mut out = Vec::new();

    for (asset, mut series) in group_by(prices.iter(), |p| p.asset.clone()) {
        series.sort_by_key(|p| p.date);
        let Some(latest) = series.last() else {
            continue;
        };

        let values: Vec<f64> = series.iter().map(|p| p.price).collect();
        let pct_7d = pct_change_latest(&values, window_short).unwrap_or(0.0);
        let pct_30d = pct_change_latest(&values, window_long).unwrap_or(0.0);

        debug!(
            "{}: {} points, pct_short {:.4}, pct_long {:.4}",
            asset,
            values.len(),
            pct_7d,
            pct_30d
        );

        out.push(AssetMomentum {
            date: latest.date,
            price: latest.price,
            asset,
            pct_7d,
            pct_30d,
        });
    }

    out
}

/// Mean daily savings rate per user
pub fn user_savings_rates(features: &[DailyFeatureRow]) -> Vec<UserSavings> {
    group_by(features.iter(), |f| f.user_id)
        .into_iter()
        .map(|(user_id, rows)| {
            let rates: Vec<f64> = rows.iter().map(|f| f.savings_rate).collect();
            UserSavings {
                user_id,
                savings_rate: mean(&rates).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Cross every user with every asset snapshot and apply the signal rules
pub fn investment_recommendations(
    users: &[UserSavings],
    momentum: &[AssetMomentum],
    rules: &RecommendationRules,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    for user in users {
        for asset in momentum {
            if asset.pct_7d < rules.buy_drop && user.savings_rate > rules.buy_min_savings_rate {
                recs.push(Recommendation {
                    user_id: user.user_id,
                    asset: asset.asset.clone(),
                    action: Action::Buy,
                    reason: format!(
                        "{} down {:.2}% in 7d and savings_rate {:.2}",
                        asset.asset,
                        asset.pct_7d * 100.0,
                        user.savings_rate
                    ),
                    price: asset.price,
                });
            }

            if asset.pct_7d <= rules.take_profit_rise {
                continue;
            }
            recs.push(Recommendation {
                user_id: user.user_id,
                asset: asset.asset.clone(),
                action: Action::ConsiderTakeProfit,
                reason: format!("{} up {:.2}% in 7d", asset.asset, asset.pct_7d * 100.0),
                price: asset.price,
            });
        }
    }

    recs
}
