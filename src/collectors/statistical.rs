//! Statistical collectors: `AverageF64`, `SummaryStatistics`

use crate::collector::Collector;
use anyhow::Result;
use serde::Serialize;

/* ===================== AverageF64 ===================== */

/// Average of values as `f64`.
///
/// Values must be convertible into `f64` via `Into<f64>`.
///
/// - Container: `(sum_f64, count_u64)`
/// - Output: `f64`
///
/// Empty sequences produce `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AverageF64;

impl<V> Collector<V> for AverageF64
where
    V: Into<f64>,
{
    type Acc = (f64, u64);
    type Out = f64;

    fn create(&self) -> Result<(f64, u64)> {
        Ok((0.0, 0))
    }

    fn add_input(&self, acc: &mut (f64, u64), v: V) -> Result<()> {
        acc.0 += v.into();
        acc.1 += 1;
        Ok(())
    }

    fn merge(&self, acc: &mut (f64, u64), other: (f64, u64)) -> Result<()> {
        acc.0 += other.0;
        acc.1 += other.1;
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (f64, u64)) -> Result<f64> {
        Ok(if acc.1 == 0 { 0.0 } else { acc.0 / (acc.1 as f64) })
    }
}

/* ===================== SummaryStatistics ===================== */

/// Count, sum, min, max and average in one pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: None,
            max: None,
        }
    }
}

impl Summary {
    /// Arithmetic mean, `0.0` when nothing was seen.
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn accept(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.min = Some(self.min.map_or(x, |m| m.min(x)));
        self.max = Some(self.max.map_or(x, |m| m.max(x)));
    }

    fn combine(&mut self, other: Summary) {
        self.count += other.count;
        self.sum += other.sum;
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

/// Collects a [`Summary`] of numeric values.
#[derive(Clone, Copy, Debug, Default)]
pub struct SummaryStatistics;

impl<V> Collector<V> for SummaryStatistics
where
    V: Into<f64>,
{
    type Acc = Summary;
    type Out = Summary;

    fn create(&self) -> Result<Summary> {
        Ok(Summary::default())
    }

    fn add_input(&self, acc: &mut Summary, v: V) -> Result<()> {
        acc.accept(v.into());
        Ok(())
    }

    fn merge(&self, acc: &mut Summary, other: Summary) -> Result<()> {
        acc.combine(other);
        Ok(())
    }

    fn finish(&self, acc: Summary) -> Result<Summary> {
        Ok(acc)
    }
}
