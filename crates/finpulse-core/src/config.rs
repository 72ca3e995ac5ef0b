//! Pipeline configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/finpulse/config/pipeline.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Every key is optional; a partial file only changes the keys it names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::aggregate::DEFAULT_ROLLING_WINDOW;
use crate::anomaly::DEFAULT_Z_THRESHOLD;
use crate::budget::BudgetRules;
use crate::error::{Error, Result};
use crate::investment::{RecommendationRules, DEFAULT_WINDOW_LONG, DEFAULT_WINDOW_SHORT};
use crate::summaries::DEFAULT_CURRENCY_SYMBOL;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pipeline.toml");

/// Tunables for every pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub z_threshold: f64,
    pub rolling_window: usize,
    pub budget: BudgetRules,
    pub window_short: usize,
    pub window_long: usize,
    pub recommendations: RecommendationRules,
    pub currency_symbol: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            budget: BudgetRules::default(),
            window_short: DEFAULT_WINDOW_SHORT,
            window_long: DEFAULT_WINDOW_LONG,
            recommendations: RecommendationRules::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Resolve config from `path`, the default override location, or the
    /// embedded defaults, in that order
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => {
                    debug!("Using config override {}", default_path.display());
                    fs::read_to_string(&default_path)
                        .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// Reject values that would make a stage meaningless
    pub fn validate(&self) -> Result<()> {
        if !self.z_threshold.is_finite() || self.z_threshold < 0.0 {
            return Err(Error::Config(format!(
                "z_threshold must be a non-negative number, got {}",
                self.z_threshold
            )));
        }
        if self.rolling_window == 0 || self.window_short == 0 || self.window_long == 0 {
            return Err(Error::Config("windows must be at least 1".into()));
        }
        if self.budget.recent_months == Some(0) {
            return Err(Error::Config("recent_months must be at least 1".into()));
        }

        let factors = [
            ("category_slack", self.budget.category_slack),
            ("low_savings_rate", self.budget.low_savings_rate),
            ("low_savings_factor", self.budget.low_savings_factor),
            ("days_per_month", self.budget.days_per_month),
            ("buy_drop", self.recommendations.buy_drop),
            ("buy_min_savings_rate", self.recommendations.buy_min_savings_rate),
            ("take_profit_rise", self.recommendations.take_profit_rise),
        ];
        for (name, value) in factors {
            if !value.is_finite() {
                return Err(Error::Config(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finpulse").join("config").join("pipeline.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    anomaly: Option<RawAnomaly>,
    features: Option<RawFeatures>,
    budget: Option<RawBudget>,
    momentum: Option<RawMomentum>,
    recommendations: Option<RawRecommendations>,
    output: Option<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawAnomaly {
    z_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFeatures {
    rolling_window: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawBudget {
    category_slack: Option<f64>,
    recent_months: Option<u32>,
    low_savings_rate: Option<f64>,
    low_savings_factor: Option<f64>,
    days_per_month: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMomentum {
    window_short: Option<usize>,
    window_long: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawRecommendations {
    buy_drop: Option<f64>,
    buy_min_savings_rate: Option<f64>,
    take_profit_rise: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    currency_symbol: Option<String>,
}

/// Parse config from TOML content on top of the defaults
pub fn parse_config(content: &str) -> Result<PipelineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = PipelineConfig::default();

    if let Some(anomaly) = raw.anomaly {
        if let Some(z) = anomaly.z_threshold {
            config.z_threshold = z;
        }
    }

    if let Some(features) = raw.features {
        if let Some(window) = features.rolling_window {
            config.rolling_window = window;
        }
    }

    if let Some(budget) = raw.budget {
        let rules = &mut config.budget;
        if let Some(v) = budget.category_slack {
            rules.category_slack = v;
        }
        if budget.recent_months.is_some() {
            rules.recent_months = budget.recent_months;
        }
        if let Some(v) = budget.low_savings_rate {
            rules.low_savings_rate = v;
        }
        if let Some(v) = budget.low_savings_factor {
            rules.low_savings_factor = v;
        }
        if let Some(v) = budget.days_per_month {
            rules.days_per_month = v;
        }
    }

    if let Some(momentum) = raw.momentum {
        if let Some(v) = momentum.window_short {
            config.window_short = v;
        }
        if let Some(v) = momentum.window_long {
            config.window_long = v;
        }
    }

    if let Some(recs) = raw.recommendations {
        let rules = &mut config.recommendations;
        if let Some(v) = recs.buy_drop {
            rules.buy_drop = v;
        }
        if let Some(v) = recs.buy_min_savings_rate {
            rules.buy_min_savings_rate = v;
        }
        if let Some(v) = recs.take_profit_rise {
            rules.take_profit_rise = v;
        }
    }

    if let Some(output) = raw.output {
        if let Some(symbol) = output.currency_symbol {
            config.currency_symbol = symbol;
        }
    }

    config.validate()?;
    Ok(config)
}
