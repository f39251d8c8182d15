use polars::prelude::{
    DataFrame, Expr, IntoLazy, RollingOptionsFixedWindow, col, lit, when,
};

use crate::{
    data::config::FeatureConfig,
    error::{DataError, GymResult},
};

/// Batch feature pipeline turning a raw OHLCV table into the engineered
/// table the environment observes.
///
/// Adds two simple moving averages, a rolling-mean RSI, an ATR, and the
/// fractional change of the auxiliary close. Warm-up rows (not enough
/// history for the longest window) come out as nulls and are dropped, so
/// the returned frame has no missing values.
///
/// Column names are derived from the instrument prefixes, e.g. primary
/// prefix `gold` reads `gold_High/Low/Close` and emits `gold_SMA_20`,
/// `gold_SMA_50`, `gold_RSI`, `gold_ATR`; auxiliary prefix `vix` reads
/// `vix_Close` and emits `vix_change`.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    cfg: FeatureConfig,
    primary: String,
    aux: String,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new(FeatureConfig::default(), "gold", "vix")
    }
}

impl FeaturePipeline {
    pub fn new(cfg: FeatureConfig, primary: &str, aux: &str) -> Self {
        Self {
            cfg,
            primary: primary.to_string(),
            aux: aux.to_string(),
        }
    }

    /// Runs the pipeline on a complete raw table.
    #[tracing::instrument(skip(self, df))]
    pub fn run(&self, df: DataFrame) -> GymResult<DataFrame> {
        let close = self.primary_col("Close");
        let high = self.primary_col("High");
        let low = self.primary_col("Low");
        let aux_close = col(format!("{}_Close", self.aux).as_str());

        let out = df
            .lazy()
            .with_columns([
                rolling_mean(close.clone(), self.cfg.sma_fast)
                    .alias(format!("{}_SMA_{}", self.primary, self.cfg.sma_fast)),
                rolling_mean(close.clone(), self.cfg.sma_slow)
                    .alias(format!("{}_SMA_{}", self.primary, self.cfg.sma_slow)),
                rsi(close.clone(), self.cfg.rsi_period)
                    .alias(format!("{}_RSI", self.primary)),
                atr(high, low, close, self.cfg.atr_period)
                    .alias(format!("{}_ATR", self.primary)),
                fractional_change(aux_close).alias(format!("{}_change", self.aux)),
            ])
            .drop_nulls(None)
            .collect()
            .map_err(DataError::from)?;

        tracing::info!(rows = out.height(), cols = out.width(), "Features created");
        Ok(out)
    }

    fn primary_col(&self, field: &str) -> Expr {
        col(format!("{}_{}", self.primary, field).as_str())
    }
}

fn rolling_mean(expr: Expr, window: usize) -> Expr {
    expr.rolling_mean(RollingOptionsFixedWindow {
        window_size: window,
        min_periods: window,
        ..Default::default()
    })
}

/// Relative Strength Index on rolling-mean gains/losses.
///
/// Windows with zero average loss saturate at 100 instead of propagating a
/// division artifact, so downstream schema validation never sees NaN.
fn rsi(close: Expr, window: usize) -> Expr {
    let delta = close.clone() - close.shift(lit(1));
    let gain = when(delta.clone().gt(lit(0.0)))
        .then(delta.clone())
        .otherwise(lit(0.0));
    let loss = when(delta.clone().lt(lit(0.0)))
        .then(lit(0.0) - delta)
        .otherwise(lit(0.0));

    let avg_gain = rolling_mean(gain, window);
    let avg_loss = rolling_mean(loss, window);

    let rs = avg_gain / avg_loss.clone();
    when(avg_loss.eq(lit(0.0)))
        .then(lit(100.0))
        .otherwise(lit(100.0) - lit(100.0) / (lit(1.0) + rs))
}

/// Average True Range over the rolling mean of the true range.
fn atr(high: Expr, low: Expr, close: Expr, window: usize) -> Expr {
    let prev_close = close.shift(lit(1));
    let tr1 = high.clone() - low.clone();
    let tr2 = (high - prev_close.clone()).abs();
    let tr3 = (low - prev_close).abs();

    let true_range = max2(max2(tr1, tr2), tr3);
    rolling_mean(true_range, window)
}

fn fractional_change(expr: Expr) -> Expr {
    let prev = expr.clone().shift(lit(1));
    (expr - prev.clone()) / prev
}

fn max2(a: Expr, b: Expr) -> Expr {
    when(a.clone().gt(b.clone())).then(a).otherwise(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn raw_frame(n: usize) -> DataFrame {
        // A gently zig-zagging market so gains and losses both occur.
        let close: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64) + if i % 2 == 0 { 0.0 } else { 1.5 })
            .collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        let vix: Vec<f64> = (0..n).map(|i| 15.0 + (i % 5) as f64).collect();

        df![
            "gold_High" => high,
            "gold_Low" => low,
            "gold_Close" => close,
            "vix_Close" => vix,
        ]
        .unwrap()
    }

    fn pipeline() -> FeaturePipeline {
        let cfg = FeatureConfig {
            sma_fast: 3,
            sma_slow: 5,
            rsi_period: 3,
            atr_period: 3,
        };
        FeaturePipeline::new(cfg, "gold", "vix")
    }

    #[test]
    fn emits_engineered_columns_without_nulls() {
        let out = pipeline().run(raw_frame(12)).unwrap();

        for name in [
            "gold_SMA_3",
            "gold_SMA_5",
            "gold_RSI",
            "gold_ATR",
            "vix_change",
        ] {
            assert!(
                out.column(name).is_ok(),
                "missing engineered column {name}"
            );
        }
        for column in out.get_columns() {
            assert_eq!(column.null_count(), 0, "nulls left in {}", column.name());
        }
    }

    #[test]
    fn drops_warmup_rows_of_longest_window() {
        let out = pipeline().run(raw_frame(12)).unwrap();
        // Slow SMA needs 5 rows of history, so the first 4 rows are dropped.
        assert_eq!(out.height(), 12 - 4);
    }

    #[test]
    fn rsi_stays_within_bounds_and_saturates_on_rallies() {
        let n = 10;
        let close: Vec<f64> = (0..n).map(|i| 100.0 + 2.0 * i as f64).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
        let vix: Vec<f64> = vec![15.0; n];
        let df = df![
            "gold_High" => high,
            "gold_Low" => low,
            "gold_Close" => close,
            "vix_Close" => vix,
        ]
        .unwrap();

        let out = pipeline().run(df).unwrap();
        let rsi = out
            .column("gold_RSI")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap();
        for value in rsi.into_no_null_iter() {
            // Strictly rising prices: zero losses, RSI pegged at 100.
            assert_eq!(value, 100.0);
        }
    }

    #[test]
    fn atr_is_positive() {
        let out = pipeline().run(raw_frame(12)).unwrap();
        let atr = out
            .column("gold_ATR")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap();
        for value in atr.into_no_null_iter() {
            assert!(value > 0.0);
        }
    }
}
