//! finpulse Core Library
//!
//! Batch analytics over personal-finance data:
//! - CSV loaders and writers for the input and output tables
//! - Daily/weekly aggregation with rolling features
//! - Per-user z-score anomaly scoring
//! - Category and overall budget recommendations
//! - Asset momentum and investment signals
//! - Human-readable summaries
//! - Synthetic dataset generation

pub mod aggregate;
pub mod anomaly;
pub mod budget;
pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod import;
pub mod investment;
pub mod models;
pub mod pipeline;
pub mod stats;
pub mod summaries;

pub use budget::{BudgetEstimator, BudgetRules};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use generate::GeneratorConfig;
pub use import::{load_inputs, Inputs};
pub use investment::RecommendationRules;
pub use pipeline::{write_outputs, Pipeline, PipelineOutputs, RunReport, TableReport};
pub use summaries::SummaryFormatter;
