use std::sync::Arc;

use ndarray::Array1;

use crate::{data::series::MarketSeries, error::GymResult};

/// A fixed-order numeric view of one market row, excluding the timestamp.
///
/// Component order follows the series' feature columns and is stable across
/// `reset` calls and across episodes sharing the same schema. The column
/// names are shared behind an `Arc` so per-step assembly only clones the
/// value vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    values: Array1<f64>,
    names: Arc<Vec<String>>,
}

impl Observation {
    pub(crate) fn from_series(series: &MarketSeries, row: usize) -> GymResult<Self> {
        Ok(Self {
            values: series.features_at(row)?,
            names: series.feature_names_shared(),
        })
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up a feature component by column name.
    pub fn field(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }
}
