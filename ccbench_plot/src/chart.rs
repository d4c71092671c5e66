use ccbench::config::{ChartKind, ChartSpec, YLimit};
use ccbench::{aggregate, Measurement};
use color_eyre::eyre;
use color_eyre::Report;
use std::collections::BTreeMap;
use std::ops::Range;

// share of the data range added on each side of an axis
const MARGIN: f64 = 0.05;
// headroom above the tallest bar (and its label)
const BAR_HEADROOM: f64 = 0.1;

/// A chart ready to be drawn: all values are computed, only layout is left.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Bar(BarData),
    Line(LineData),
}

impl ChartData {
    pub fn title(&self) -> &str {
        match self {
            ChartData::Bar(bar) => &bar.title,
            ChartData::Line(line) => &line.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// text drawn above the bar, at `value + BarData::text_offset`
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarData {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: String,
    pub bars: Vec<Bar>,
    pub text_offset: f64,
    pub y_range: Range<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    /// `(x, mean y)` points sorted by `x`
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<Line>,
    pub markers: bool,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

/// Computes the data of the chart described by `spec` from `rows`.
pub fn prepare(
    spec: &ChartSpec,
    rows: &[&Measurement],
) -> Result<ChartData, Report> {
    let chart = match spec.kind {
        ChartKind::Bar => ChartData::Bar(prepare_bars(spec, rows)?),
        ChartKind::Line => ChartData::Line(prepare_lines(spec, rows)?),
    };
    Ok(chart)
}

fn prepare_bars(
    spec: &ChartSpec,
    rows: &[&Measurement],
) -> Result<BarData, Report> {
    let groups =
        aggregate::group_means(rows.iter().copied(), spec.x, &[spec.y])?;
    let mut bars = Vec::with_capacity(groups.len());
    for group in groups {
        let value = group
            .mean(spec.y)
            .ok_or_else(|| eyre::eyre!("no mean for {:?}", spec.y.header()))?
            .value();
        let text = spec
            .value_labels
            .as_ref()
            .map(|value_labels| value_labels.format(value));
        bars.push(Bar {
            label: group.key().to_string(),
            value,
            text,
        });
    }

    let text_offset = spec
        .value_labels
        .as_ref()
        .map(|value_labels| value_labels.offset)
        .unwrap_or_default();
    let values = bars.iter().map(|bar| bar.value);
    let y_range = match spec.y_limit {
        YLimit::MaxPlus(headroom) => {
            let max = values.fold(0.0, f64::max);
            0.0..max + headroom
        }
        YLimit::Auto => bar_range(values, text_offset),
    };

    Ok(BarData {
        title: spec.title.clone(),
        x_label: spec.x_label.clone(),
        y_label: spec.y_label.clone(),
        bars,
        text_offset,
        y_range,
    })
}

fn prepare_lines(
    spec: &ChartSpec,
    rows: &[&Measurement],
) -> Result<LineData, Report> {
    // split rows per hue value (sorted), or keep a single line
    let mut per_hue: BTreeMap<&str, Vec<&Measurement>> = BTreeMap::new();
    for &measurement in rows {
        let hue = match spec.hue {
            Some(hue) => measurement.label(hue).ok_or_else(|| {
                eyre::eyre!("missing column {:?}", hue.header())
            })?,
            None => spec.y.header(),
        };
        per_hue.entry(hue).or_default().push(measurement);
    }

    let mut lines = Vec::with_capacity(per_hue.len());
    for (label, rows) in per_hue {
        let points = aggregate::mean_per_value(rows, spec.x, spec.y)?
            .into_iter()
            .map(|(x, y)| (x.value(), y.value()))
            .collect();
        lines.push(Line {
            label: label.to_string(),
            points,
        });
    }

    let points = || lines.iter().flat_map(|line| line.points.iter());
    let x_range = with_margins(points().map(|(x, _)| *x));
    let y_range = match spec.y_limit {
        YLimit::MaxPlus(headroom) => {
            let max = points().map(|(_, y)| *y).fold(0.0, f64::max);
            0.0..max + headroom
        }
        YLimit::Auto => with_margins(points().map(|(_, y)| *y)),
    };

    Ok(LineData {
        title: spec.title.clone(),
        x_label: spec
            .x_label
            .clone()
            .unwrap_or_else(|| spec.x.header().to_string()),
        y_label: spec.y_label.clone(),
        lines,
        markers: spec.markers,
        x_range,
        y_range,
    })
}

// Bars start at zero (or below, for negative values) and leave room for the
// value labels.
fn bar_range(values: impl Iterator<Item = f64>, text_offset: f64) -> Range<f64> {
    let (min, max) = bounds(values).unwrap_or((0.0, 0.0));
    let low = min.min(0.0);
    let high = (max + text_offset).max(0.0);
    let span = high - low;
    if span > 0.0 {
        low..high + span * BAR_HEADROOM
    } else {
        0.0..1.0
    }
}

// Data bounds plus a margin on each side. A single value gets a unit range
// around it.
fn with_margins(values: impl Iterator<Item = f64>) -> Range<f64> {
    match bounds(values) {
        Some((min, max)) if max > min => {
            let margin = (max - min) * MARGIN;
            min - margin..max + margin
        }
        Some((value, _)) => value - 0.5..value + 0.5,
        None => 0.0..1.0,
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|value| value.is_finite())
        .fold(None, |bounds, value| match bounds {
            None => Some((value, value)),
            Some((min, max)) => Some((value.min(min), value.max(max))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccbench::{Column, MeasurementDB, ReportConfig, Search};
    use std::collections::BTreeSet;

    const SIM_RESULTS: &str = "\
Scenario,Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
Scenario1,TcpVegas, 1, 0.9, 40.0, 0.0
Scenario1,TcpVegas, 2, 1.8, 42.0, 0.01
Scenario1,TcpCubic, 1, 1.0, 50.0, 0.02
Scenario1,TcpCubic, 2, 1.75, 56.0, 0.03
Scenario1,TcpCubic, 2, 1.25, 58.0, 0.05
Scenario2,TcpVegas, 5, 4.0, 90.0, 0.10
Scenario2,TcpCubic, 7, 6.0, 95.0, 0.20
";

    const BENCHMARK: &str = "\
Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
TcpVeno , 1, 2.0, 40.0, 0.01
TcpBbr , 1, 3.0, 30.0, 0.02
TcpVeno , 2, 4.0, 50.0, 0.03
";

    fn db(contents: &str) -> MeasurementDB {
        MeasurementDB::from_reader(contents.as_bytes(), true).unwrap()
    }

    #[test]
    fn scenario_lines() {
        let db = db(SIM_RESULTS);
        let rows = db.find(Search::new().scenario("Scenario1")).unwrap();
        let config = ReportConfig::scenarios();
        let spec = &config.charts()[0];

        let chart = match prepare(spec, &rows).unwrap() {
            ChartData::Line(line) => line,
            chart => panic!("unexpected chart {:?}", chart),
        };
        assert_eq!(chart.title, "Throughput vs CBR");
        assert_eq!(chart.x_label, "CBR (Mbps)");
        assert!(chart.markers);

        // lines sorted by variant, duplicated x values averaged
        let labels: Vec<_> =
            chart.lines.iter().map(|line| line.label.as_str()).collect();
        assert_eq!(labels, vec!["TcpCubic", "TcpVegas"]);
        assert_eq!(chart.lines[0].points, vec![(1.0, 1.0), (2.0, 1.5)]);
        assert_eq!(chart.lines[1].points, vec![(1.0, 0.9), (2.0, 1.8)]);

        // only the scenario's own CBR values show up
        let xs: BTreeSet<_> = chart
            .lines
            .iter()
            .flat_map(|line| line.points.iter().map(|(x, _)| *x as u64))
            .collect();
        assert_eq!(xs.into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(chart.x_range.start < 1.0 && chart.x_range.end > 2.0);
        assert!(chart.y_range.start < 0.9 && chart.y_range.end > 1.8);
    }

    #[test]
    fn benchmark_bars() {
        let db = db(BENCHMARK);
        let rows = db.find(&Search::new()).unwrap();
        let config = ReportConfig::benchmark();
        let charts: Vec<_> = config
            .charts()
            .iter()
            .map(|spec| match prepare(spec, &rows).unwrap() {
                ChartData::Bar(bar) => bar,
                chart => panic!("unexpected chart {:?}", chart),
            })
            .collect();

        let throughput = &charts[0];
        let labels: Vec<_> =
            throughput.bars.iter().map(|bar| bar.label.as_str()).collect();
        assert_eq!(labels, vec!["TcpBbr", "TcpVeno"]);
        assert_eq!(throughput.bars[1].value, 3.0);
        assert_eq!(throughput.bars[1].text.as_deref(), Some("3.00"));
        assert_eq!(throughput.text_offset, 0.05);
        assert_eq!(throughput.y_range.start, 0.0);
        assert!(throughput.y_range.end > 3.05);

        let rtt = &charts[1];
        assert_eq!(rtt.bars[0].text.as_deref(), Some("30.0"));
        assert_eq!(rtt.bars[1].text.as_deref(), Some("45.0"));

        let drop_rate = &charts[2];
        assert_eq!(drop_rate.bars[0].text.as_deref(), Some("2.00%"));
        assert_eq!(drop_rate.bars[1].text.as_deref(), Some("2.00%"));
        let max = drop_rate.bars.iter().map(|bar| bar.value).fold(0.0, f64::max);
        assert_eq!(drop_rate.y_range, 0.0..max + 1.0);
    }

    #[test]
    fn missing_hue_column() {
        let db = db(BENCHMARK);
        let rows = db.find(&Search::new()).unwrap();
        let mut spec = ReportConfig::scenarios().charts()[0].clone();
        spec.hue = Some(Column::Scenario);
        assert!(prepare(&spec, &rows).is_err());
    }

    #[test]
    fn degenerate_ranges() {
        assert_eq!(with_margins(std::iter::empty()), 0.0..1.0);
        assert_eq!(with_margins(vec![2.0, 2.0].into_iter()), 1.5..2.5);
        assert_eq!(bar_range(vec![0.0].into_iter(), 0.0), 0.0..1.0);
        let range = bar_range(vec![-1.0, 1.0].into_iter(), 0.0);
        assert!(range.start == -1.0 && range.end > 1.0);
        // NaN values are ignored
        assert_eq!(with_margins(vec![f64::NAN, 3.0].into_iter()), 2.5..3.5);
    }

    #[test]
    fn empty_charts() {
        let config = ReportConfig::scenarios();
        let chart = prepare(&config.charts()[1], &[]).unwrap();
        assert_eq!(chart.title(), "Avg RTT vs CBR");
        match chart {
            ChartData::Line(line) => assert!(line.lines.is_empty()),
            chart => panic!("unexpected chart {:?}", chart),
        }
    }
}
