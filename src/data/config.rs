use serde::{Deserialize, Serialize};

/// Column naming contract between the raw market table and the environment.
///
/// The defaults match the gold/VIX daily dataset the crate ships its pipeline
/// for, but any table with a timestamp column, a positive primary close column
/// and numeric feature columns satisfies the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSchema {
    /// Name of the timestamp column. Excluded from observations.
    pub timestamp_col: String,

    /// Name of the primary instrument's close column. All executions and
    /// mark-to-market valuations read this column.
    pub primary_close_col: String,
}

impl Default for SeriesSchema {
    fn default() -> Self {
        Self {
            timestamp_col: "datetime".to_string(),
            primary_close_col: "gold_Close".to_string(),
        }
    }
}

impl SeriesSchema {
    pub fn new(timestamp_col: &str, primary_close_col: &str) -> Self {
        Self {
            timestamp_col: timestamp_col.to_string(),
            primary_close_col: primary_close_col.to_string(),
        }
    }
}

/// Window lengths for the engineered indicator columns.
///
/// Rows without enough history to fill the longest window are dropped by the
/// feature pipeline, so the environment never sees a partially-warm row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sma_fast: 20,
            sma_slow: 50,
            rsi_period: 14,
            atr_period: 14,
        }
    }
}
