//! Group-by reducer: one partial table per metric, combined by key-based left merges.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::chargers::{CONNECTOR_TYPES, FAST_PORTS, LEVEL2_PORTS};

/// Number of rows per key.
pub const COUNT: &str = "count";
/// Level 2 ports plus DC fast ports.
pub const TOTAL: &str = "total_num";
/// Rows with a Tesla connector.
pub const TESLA_COUNT: &str = "tesla_count";

/// A per-group statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    /// Sum of a numeric column, keeping the column's name.
    Sum(String),
    /// Rows whose `column` contains `needle`, stored as `name`.
    CountContaining { name: String, column: String, needle: String },
}

impl Metric {
    pub fn sum(column: &str) -> Self { Metric::Sum(column.to_string()) }

    pub fn count_containing(name: &str, column: &str, needle: &str) -> Self {
        Metric::CountContaining { name: name.into(), column: column.into(), needle: needle.into() }
    }

    /// Output column name.
    pub fn name(&self) -> &str {
        match self {
            Metric::Sum(column) => column,
            Metric::CountContaining { name, .. } => name,
        }
    }

    /// Compute this metric as a (key, metric) table over rows with a non-null key.
    fn partial(&self, df: &DataFrame, key: &str) -> Result<DataFrame> {
        let (source, expr) = match self {
            Metric::Sum(column) => (df.clone(), col(column.as_str()).sum().alias(column.as_str())),
            Metric::CountContaining { name, column, needle } => {
                let hits = df.column(column)?.cast(&DataType::String)?.str()?.into_iter()
                    .map(|value| value.is_some_and(|v| v.contains(needle.as_str())) as u32)
                    .collect::<Vec<_>>();
                let mut source = df.select([key])?;
                source.with_column(Column::new(name.as_str().into(), hits))?;
                (source, col(name.as_str()).sum().alias(name.as_str()))
            }
        };

        Ok(source.lazy()
            .filter(col(key).is_not_null())
            .group_by([col(key)])
            .agg([expr])
            .collect()?)
    }
}

/// Row count per key, the base every metric is merged onto.
fn counts(df: &DataFrame, key: &str) -> Result<DataFrame> {
    Ok(df.clone().lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .collect()?)
}

/// One row per distinct non-null `key` with `count` and every metric.
///
/// Each metric is computed separately and left-merged onto the counts; a group
/// missing from a partial table gets zero. Rows are sorted by count descending,
/// then key ascending.
pub fn aggregate(df: &DataFrame, key: &str, metrics: &[Metric]) -> Result<DataFrame> {
    df.column(key).with_context(|| format!("aggregate: missing key column {key:?}"))?;

    let mut merged = counts(df, key)?;
    for metric in metrics {
        let partial = metric.partial(df, key)
            .with_context(|| format!("aggregate: failed to compute {:?} by {key:?}", metric.name()))?;
        merged = merged.left_join(&partial, [key], [key])?;
    }

    for metric in metrics {
        let filled = merged.column(metric.name())?
            .as_materialized_series()
            .fill_null(FillNullStrategy::Zero)?;
        merged.replace(metric.name(), filled)?;
    }

    Ok(merged.sort(
        [COUNT, key],
        SortMultipleOptions::default().with_order_descending_multi([true, false]),
    )?)
}

/// Add `total_num` as the sum of the level 2 and DC fast port columns.
pub fn with_total(mut df: DataFrame) -> Result<DataFrame> {
    let level2 = df.column(LEVEL2_PORTS)?.cast(&DataType::Float64)?;
    let fast = df.column(FAST_PORTS)?.cast(&DataType::Float64)?;
    let total = level2.f64()?.into_iter()
        .zip(fast.f64()?.into_iter())
        .map(|(l2, dc)| Some(l2? + dc?))
        .collect::<Vec<Option<f64>>>();

    df.with_column(Column::new(TOTAL.into(), total))?;
    Ok(df)
}

/// Charger statistics by `key`: count, level 2 and DC fast port sums, Tesla sites, total ports.
pub fn aggregate_chargers(df: &DataFrame, key: &str) -> Result<DataFrame> {
    let metrics = [
        Metric::sum(LEVEL2_PORTS),
        Metric::sum(FAST_PORTS),
        Metric::count_containing(TESLA_COUNT, CONNECTOR_TYPES, "TESLA"),
    ];
    with_total(aggregate(df, key, &metrics)?)
}
