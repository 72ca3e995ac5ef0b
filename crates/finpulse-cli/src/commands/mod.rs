//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `generate` - Synthetic dataset generation
//! - `run` - Full pipeline run and output writing
//! - `reports` - Summary and recommendation printouts

pub mod generate;
pub mod reports;
pub mod run;

// Re-export command functions for main.rs
pub use generate::*;
pub use reports::*;
pub use run::*;

use std::path::Path;

use anyhow::{Context, Result};
use finpulse_core::{load_inputs, Inputs, PipelineConfig};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub z_threshold: Option<f64>,
    pub recent_months: Option<u32>,
}

/// Resolve pipeline config and apply command-line overrides
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(path).context("Failed to load pipeline config")?;

    if let Some(z) = overrides.z_threshold {
        config.z_threshold = z;
    }
    if let Some(months) = overrides.recent_months {
        config.budget.recent_months = Some(months);
    }
    config.validate().context("Invalid pipeline settings")?;

    Ok(config)
}

/// Load the three input CSVs from `data_dir`
pub fn open_inputs(data_dir: &Path) -> Result<Inputs> {
    load_inputs(data_dir)
        .with_context(|| format!("Failed to load inputs from {}", data_dir.display()))
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
