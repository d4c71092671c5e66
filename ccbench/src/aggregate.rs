use crate::measurement::{Column, Measurement};
use crate::metrics::{Histogram, F64};
use color_eyre::eyre;
use color_eyre::Report;
use std::collections::BTreeMap;
use tracing::debug;

/// Means of some numeric columns over the rows sharing a group key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMeans {
    key: String,
    count: usize,
    means: BTreeMap<Column, F64>,
}

impl GroupMeans {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of rows in the group.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of `column` in this group, if it was aggregated. The percentage
    /// drop rate is derived from the mean drop rate.
    pub fn mean(&self, column: Column) -> Option<F64> {
        match column {
            Column::DropRatePercent => self
                .means
                .get(&Column::DropRate)
                .map(|drop_rate| *drop_rate * 100.0),
            column => self.means.get(&column).copied(),
        }
    }
}

/// Groups `rows` by the categorical column `group_by` and computes the mean of
/// each of the numeric `columns` per group. Groups are sorted by key.
pub fn group_means<'a, I>(
    rows: I,
    group_by: Column,
    columns: &[Column],
) -> Result<Vec<GroupMeans>, Report>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    if group_by.is_numeric() {
        eyre::bail!("cannot group by numeric column {:?}", group_by.header());
    }
    let columns = stored_columns(columns)?;

    let mut groups: BTreeMap<&str, (usize, BTreeMap<Column, Histogram>)> =
        BTreeMap::new();
    for measurement in rows {
        let key = group_key(measurement, group_by)?;
        let (count, histograms) = groups.entry(key).or_default();
        *count += 1;
        for column in &columns {
            let value = numeric(measurement, *column)?;
            histograms.entry(*column).or_default().increment(value);
        }
    }

    let groups = groups
        .into_iter()
        .map(|(key, (count, histograms))| {
            let means = histograms
                .into_iter()
                .map(|(column, histogram)| {
                    debug!("{} {}: {:?}", key, column.header(), histogram);
                    (column, histogram.mean())
                })
                .collect();
            GroupMeans {
                key: key.to_string(),
                count,
                means,
            }
        })
        .collect();
    Ok(groups)
}

/// Computes the mean of `y` for each distinct value of `x`, sorted by `x`.
pub fn mean_per_value<'a, I>(
    rows: I,
    x: Column,
    y: Column,
) -> Result<Vec<(F64, F64)>, Report>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut per_x: BTreeMap<F64, Histogram> = BTreeMap::new();
    for measurement in rows {
        let x = F64::new(numeric(measurement, x)?);
        let y = numeric(measurement, y)?;
        per_x.entry(x).or_default().increment(y);
    }
    let points = per_x
        .into_iter()
        .map(|(x, histogram)| (x, histogram.mean()))
        .collect();
    Ok(points)
}

// Maps requested columns to the stored columns they're computed from.
fn stored_columns(columns: &[Column]) -> Result<Vec<Column>, Report> {
    let mut stored = Vec::with_capacity(columns.len());
    for column in columns {
        let column = match column {
            Column::DropRatePercent => Column::DropRate,
            Column::Scenario | Column::Variant => {
                eyre::bail!(
                    "cannot average categorical column {:?}",
                    column.header()
                )
            }
            column => *column,
        };
        if !stored.contains(&column) {
            stored.push(column);
        }
    }
    Ok(stored)
}

fn group_key(
    measurement: &Measurement,
    group_by: Column,
) -> Result<&str, Report> {
    measurement.label(group_by).ok_or_else(|| {
        eyre::eyre!("missing column {:?}", group_by.header())
    })
}

fn numeric(measurement: &Measurement, column: Column) -> Result<f64, Report> {
    measurement
        .value(column)
        .ok_or_else(|| eyre::eyre!("column {:?} is not numeric", column.header()))
}

#[cfg(test)]
mod proptests {
    use super::*;
    use quickcheck_macros::quickcheck;

    const VARIANTS: [&str; 3] = ["Reno", "NewReno", "TcpCubic"];

    fn rows(samples: &[(u8, u8, u16)]) -> Vec<Measurement> {
        samples
            .iter()
            .map(|(variant, cbr, value)| Measurement {
                scenario: None,
                variant: VARIANTS[*variant as usize % VARIANTS.len()]
                    .to_string(),
                cbr: *cbr as f64,
                throughput: *value as f64 / 7.0,
                avg_rtt: *value as f64 / 3.0,
                drop_rate: *value as f64 / u16::MAX as f64,
            })
            .collect()
    }

    #[quickcheck]
    fn group_means_ignore_row_order(
        samples: Vec<(u8, u8, u16)>,
        split: usize,
    ) -> bool {
        let columns =
            [Column::Throughput, Column::AvgRtt, Column::DropRate];
        let rows = rows(&samples);
        let means = group_means(&rows, Column::Variant, &columns).unwrap();

        let reversed: Vec<_> = rows.iter().rev().collect();
        let reversed_means =
            group_means(reversed, Column::Variant, &columns).unwrap();

        let mut rotated: Vec<_> = rows.iter().collect();
        if !rotated.is_empty() {
            let mid = split % rotated.len();
            rotated.rotate_left(mid);
        }
        let rotated_means =
            group_means(rotated, Column::Variant, &columns).unwrap();

        means == reversed_means && means == rotated_means
    }

    #[quickcheck]
    fn mean_per_value_ignores_row_order(samples: Vec<(u8, u8, u16)>) -> bool {
        let rows = rows(&samples);
        let points =
            mean_per_value(&rows, Column::Cbr, Column::Throughput).unwrap();
        let reversed =
            mean_per_value(rows.iter().rev(), Column::Cbr, Column::Throughput)
                .unwrap();
        points == reversed
    }
}
