use crate::metrics::F64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Histogram {
    // raw values: all samples are stored (with their multiplicity) sorted by
    // value, so that every statistic is computed in the same order no matter
    // the order in which samples were added
    values: BTreeMap<F64, usize>,
}

impl Histogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an histogram from a list of values.
    pub fn from<T: IntoIterator<Item = f64>>(values: T) -> Self {
        let mut histogram = Self::new();
        values
            .into_iter()
            .for_each(|value| histogram.increment(value));
        histogram
    }

    /// Increments the occurrence of some value in the histogram.
    pub fn increment(&mut self, value: f64) {
        let count = self.values.entry(F64::new(value)).or_insert(0);
        *count += 1;
    }

    /// Number of samples in the histogram.
    pub fn count(&self) -> usize {
        self.values.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean of all samples; NaN if the histogram is empty.
    pub fn mean(&self) -> F64 {
        let (sum, count) = self.values.iter().fold(
            (F64::zero(), 0),
            |(sum, total), (value, count)| {
                (sum + *value * *count as f64, total + count)
            },
        );
        if count == 0 {
            F64::nan()
        } else {
            sum / count as f64
        }
    }

    pub fn min(&self) -> F64 {
        self.values
            .keys()
            .next()
            .copied()
            .unwrap_or_else(F64::nan)
    }

    pub fn max(&self) -> F64 {
        self.values
            .keys()
            .next_back()
            .copied()
            .unwrap_or_else(F64::nan)
    }
}

impl fmt::Debug for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={:<4} min={:<8} max={:<8} avg={:<8}",
            self.count(),
            self.min().round(2),
            self.max().round(2),
            self.mean().round(2),
        )
    }
}
