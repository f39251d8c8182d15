use std::sync::Arc;

use chrono::{DateTime, Utc};
use ndarray::Array1;
use polars::prelude::{DataFrame, DataType};

use crate::{
    data::{config::SeriesSchema, domain::Price},
    error::{DataError, GymResult},
};

/// An ordered, immutable sequence of time-indexed market rows.
///
/// Storage is column-major: one `Vec<f64>` per feature column, aligned with
/// a shared timestamp vector. The series is constructed once, validated once,
/// and never mutated afterwards. Environments share it behind an `Arc`, so
/// parallel evaluation workers read the same memory without locking.
///
/// # Validation
///
/// Construction fails if any of the following holds:
/// - fewer than two rows (a single row allows no step),
/// - the feature column set is empty,
/// - the primary close column is missing, non-finite, or non-positive,
/// - any feature value is missing or non-finite,
/// - timestamps are not strictly increasing.
#[derive(Debug, Clone)]
pub struct MarketSeries {
    timestamps: Vec<DateTime<Utc>>,
    feature_names: Arc<Vec<String>>,
    /// Column-major values: `columns[i][t]` is feature `i` at row `t`.
    columns: Vec<Vec<f64>>,
    close_idx: usize,
}

impl MarketSeries {
    /// Builds a series from raw named columns. This is the validation
    /// bottleneck every other constructor funnels through.
    pub fn from_columns(
        timestamps: Vec<DateTime<Utc>>,
        named_columns: Vec<(String, Vec<f64>)>,
        schema: &SeriesSchema,
    ) -> GymResult<Self> {
        let n = timestamps.len();
        if n < 2 {
            return Err(DataError::SeriesTooShort { len: n }.into());
        }
        if named_columns.is_empty() {
            return Err(DataError::NoFeatureColumns.into());
        }

        if let Some(row) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(DataError::UnorderedTimestamps(row + 1).into());
        }

        let close_idx = named_columns
            .iter()
            .position(|(name, _)| *name == schema.primary_close_col)
            .ok_or_else(|| DataError::MissingColumn(schema.primary_close_col.clone()))?;

        let mut feature_names = Vec::with_capacity(named_columns.len());
        let mut columns = Vec::with_capacity(named_columns.len());
        for (name, values) in named_columns {
            if values.len() != n {
                return Err(DataError::ColumnLengthMismatch {
                    column: name,
                    expected: n,
                    actual: values.len(),
                }
                .into());
            }
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(DataError::NonFiniteValue { column: name, row }.into());
            }
            feature_names.push(name);
            columns.push(values);
        }

        if let Some(row) = columns[close_idx].iter().position(|px| *px <= 0.0) {
            return Err(DataError::NonPositivePrice {
                column: feature_names[close_idx].clone(),
                row,
            }
            .into());
        }

        tracing::debug!(
            rows = n,
            features = feature_names.len(),
            close = %feature_names[close_idx],
            "Market series constructed"
        );

        Ok(Self {
            timestamps,
            feature_names: Arc::new(feature_names),
            columns,
            close_idx,
        })
    }

    /// Builds a series from a polars `DataFrame`, e.g. the output of the
    /// feature pipeline. All columns except the timestamp column become
    /// observation features, cast to `f64`, in frame order.
    pub fn from_dataframe(df: &DataFrame, schema: &SeriesSchema) -> GymResult<Self> {
        let timestamps = extract_timestamps(df, &schema.timestamp_col)?;

        let mut named_columns = Vec::with_capacity(df.width().saturating_sub(1));
        for column in df.get_columns() {
            let name = column.name().to_string();
            if name == schema.timestamp_col {
                continue;
            }
            let casted = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(DataError::from)?;
            let ca = casted.f64().map_err(DataError::from)?;
            let mut values = Vec::with_capacity(ca.len());
            for (row, opt) in ca.into_iter().enumerate() {
                let value = opt.ok_or_else(|| DataError::MissingValue {
                    column: name.clone(),
                    row,
                })?;
                values.push(value);
            }
            named_columns.push((name, values));
        }

        Self::from_columns(timestamps, named_columns, schema)
    }

    /// Number of rows in the series.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of feature columns, i.e. the fixed observation length.
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub(crate) fn feature_names_shared(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.feature_names)
    }

    pub fn timestamp(&self, row: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(row).copied()
    }

    /// The primary instrument's close price at `row`. This is the execution
    /// and mark-to-market price for the environment.
    pub fn close(&self, row: usize) -> GymResult<Price> {
        self.columns[self.close_idx]
            .get(row)
            .map(|px| Price(*px))
            .ok_or_else(|| {
                DataError::RowOutOfBounds {
                    index: row,
                    len: self.len(),
                }
                .into()
            })
    }

    /// The fixed-order feature vector at `row`, excluding the timestamp.
    pub fn features_at(&self, row: usize) -> GymResult<Array1<f64>> {
        if row >= self.len() {
            return Err(DataError::RowOutOfBounds {
                index: row,
                len: self.len(),
            }
            .into());
        }
        Ok(Array1::from_iter(
            self.columns.iter().map(|column| column[row]),
        ))
    }
}

fn extract_timestamps(df: &DataFrame, ts_col: &str) -> GymResult<Vec<DateTime<Utc>>> {
    let column = df
        .column(ts_col)
        .map_err(|_| DataError::MissingColumn(ts_col.to_string()))?;
    let series = column.as_materialized_series();

    match series.dtype() {
        DataType::Datetime(_, _) => {
            let ca = series.datetime().map_err(DataError::from)?;
            ca.as_datetime_iter()
                .enumerate()
                .map(|(row, opt)| {
                    opt.map(|ndt| ndt.and_utc()).ok_or_else(|| {
                        DataError::MissingValue {
                            column: ts_col.to_string(),
                            row,
                        }
                        .into()
                    })
                })
                .collect()
        }
        DataType::Date => {
            let ca = series.date().map_err(DataError::from)?;
            ca.as_date_iter()
                .enumerate()
                .map(|(row, opt)| {
                    opt.and_then(|nd| nd.and_hms_opt(0, 0, 0))
                        .map(|ndt| ndt.and_utc())
                        .ok_or_else(|| {
                            DataError::MissingValue {
                                column: ts_col.to_string(),
                                row,
                            }
                            .into()
                        })
                })
                .collect()
        }
        other => Err(DataError::TimestampConversion(format!(
            "column '{ts_col}' has dtype {other}, expected Date or Datetime"
        ))
        .into()),
    }
}
