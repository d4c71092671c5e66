use crate::measurement::Column;
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

// placeholder replaced by the figure label in templates
const LABEL: &str = "{label}";

// defaults
const OUTPUT_DIR: &str = ".";
const OUTPUT_TEMPLATE: &str = "{label}_comparison.png";
const TITLE_TEMPLATE: &str = "{label} - TCP Variant Comparison";
// 18x5 inches at 100 dpi
const FIGURE_SIZE: (u32, u32) = (1800, 500);
const TITLE_SIZE: u32 = 16;

// benchmark preset
const BENCHMARK_INPUT: &str = "tcp_congestion_control_benchmark.csv";
const BENCHMARK_LABEL: &str = "tcp_congestion_control_benchmark";
const BENCHMARK_TITLE: &str =
    "TCP Variant Comparison: Throughput, RTT, and Drop Rate (%)";
const BENCHMARK_TITLE_SIZE: u32 = 14;

// scenarios preset
const SCENARIOS_INPUT: &str = "sim_results.csv";
const SCENARIO_PREFIX: &str = "Scenario";
const SCENARIOS: RangeInclusive<usize> = 1..=4;

// fat tree preset
const FAT_TREE_INPUT: &str = "sim_results_fattree.csv";
const FAT_TREE_SCENARIO: &str = "Scenario1";
const FAT_TREE_LABEL: &str = "Fat Tree (K=4)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    /// one bar per group with the group mean
    Bar,
    /// one line per hue value, through the mean `y` at each `x`
    Line,
}

/// Text drawn above each bar with its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLabels {
    pub decimals: usize,
    #[serde(default)]
    pub suffix: String,
    /// distance between the top of the bar and the label (in `y` units)
    pub offset: f64,
}

impl ValueLabels {
    pub fn new(decimals: usize, offset: f64) -> Self {
        Self {
            decimals,
            suffix: String::new(),
            offset,
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn format(&self, value: f64) -> String {
        format!("{:.*}{}", self.decimals, value, self.suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum YLimit {
    /// fit the data (and value labels, if any)
    Auto,
    /// from zero to the largest value plus some headroom
    MaxPlus(f64),
}

impl Default for YLimit {
    fn default() -> Self {
        YLimit::Auto
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: Column,
    pub y: Column,
    #[serde(default)]
    pub hue: Option<Column>,
    pub title: String,
    #[serde(default)]
    pub x_label: Option<String>,
    pub y_label: String,
    #[serde(default)]
    pub value_labels: Option<ValueLabels>,
    #[serde(default)]
    pub y_limit: YLimit,
    #[serde(default)]
    pub markers: bool,
}

impl ChartSpec {
    /// Bar chart of the mean `y` per `x` group.
    pub fn bar(x: Column, y: Column, title: &str, y_label: &str) -> Self {
        Self {
            kind: ChartKind::Bar,
            x,
            y,
            hue: None,
            title: title.to_string(),
            x_label: None,
            y_label: y_label.to_string(),
            value_labels: None,
            y_limit: YLimit::Auto,
            markers: false,
        }
    }

    /// Line chart of `y` vs `x`, one line per `hue` value, with markers.
    pub fn line(
        x: Column,
        y: Column,
        hue: Column,
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Self {
        Self {
            kind: ChartKind::Line,
            x,
            y,
            hue: Some(hue),
            title: title.to_string(),
            x_label: Some(x_label.to_string()),
            y_label: y_label.to_string(),
            value_labels: None,
            y_limit: YLimit::Auto,
            markers: true,
        }
    }

    pub fn with_value_labels(mut self, value_labels: ValueLabels) -> Self {
        self.value_labels = Some(value_labels);
        self
    }

    pub fn with_y_limit(mut self, y_limit: YLimit) -> Self {
        self.y_limit = y_limit;
        self
    }

    fn validate(&self) -> Result<(), Report> {
        if self.y.is_categorical() {
            eyre::bail!(
                "chart {:?}: y column {:?} is not numeric",
                self.title,
                self.y.header()
            );
        }
        if let Some(hue) = self.hue {
            if hue.is_numeric() {
                eyre::bail!(
                    "chart {:?}: hue column {:?} is not categorical",
                    self.title,
                    hue.header()
                );
            }
        }
        match self.kind {
            ChartKind::Bar if self.x.is_numeric() => eyre::bail!(
                "chart {:?}: bar charts need a categorical x column, found {:?}",
                self.title,
                self.x.header()
            ),
            ChartKind::Line if self.x.is_categorical() => eyre::bail!(
                "chart {:?}: line charts need a numeric x column, found {:?}",
                self.title,
                self.x.header()
            ),
            _ => Ok(()),
        }
    }
}

/// Keeps only the rows whose categorical `column` equals `value` (`"all"`
/// keeps every row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: Column,
    pub value: String,
}

/// A figure generated for one value of the split column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureLabel {
    /// value the rows must have
    pub value: String,
    /// label used in the figure title
    pub title: String,
    /// label used in the file name
    pub file: String,
}

impl FigureLabel {
    pub fn new(value: &str, title: &str, file: &str) -> Self {
        Self {
            value: value.to_string(),
            title: title.to_string(),
            file: file.to_string(),
        }
    }

    /// Uses `value` as title and file label.
    pub fn same(value: &str) -> Self {
        Self::new(value, value, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// one figure per distinct value found in the table
    Distinct,
    /// one figure per listed value
    Values(Vec<FigureLabel>),
}

impl Selection {
    /// Values `{prefix}{i}` for each `i` in `range`, titled `{prefix} {i}`.
    pub fn range(prefix: &str, range: RangeInclusive<usize>) -> Self {
        let labels = range
            .map(|i| {
                let value = format!("{}{}", prefix, i);
                let title = format!("{} {}", prefix, i);
                FigureLabel::new(&value, &title, &value)
            })
            .collect();
        Selection::Values(labels)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// a single figure with all (filtered) rows
    Single { label: String },
    /// one figure per selected value of a categorical column
    PerValue { column: Column, selection: Selection },
}

/// Title and output file of a figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureName {
    pub title: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// results file to load
    input: PathBuf,
    /// directory where figures are saved
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    /// figure file name, `{label}` is replaced by the figure label
    #[serde(default = "default_output_template")]
    output_template: String,
    /// figure title, `{label}` is replaced by the figure label
    #[serde(default = "default_title_template")]
    title_template: String,
    /// figure size in pixels
    #[serde(default = "default_figure_size")]
    figure_size: (u32, u32),
    /// font size of the figure title, in points
    #[serde(default = "default_title_size")]
    title_size: u32,
    #[serde(default)]
    filter: Option<Filter>,
    layout: Layout,
    /// charts drawn side by side in each figure
    charts: Vec<ChartSpec>,
    /// if set, the loaded table is printed to stdout
    #[serde(default)]
    print_table: bool,
    /// if set, rows repeating the header are dropped when loading
    #[serde(default = "default_skip_repeated_headers")]
    skip_repeated_headers: bool,
}

impl ReportConfig {
    /// Create a new `ReportConfig`.
    pub fn new<P: Into<PathBuf>>(
        input: P,
        layout: Layout,
        charts: Vec<ChartSpec>,
    ) -> Self {
        Self {
            input: input.into(),
            output_dir: default_output_dir(),
            output_template: default_output_template(),
            title_template: default_title_template(),
            figure_size: default_figure_size(),
            title_size: default_title_size(),
            filter: None,
            layout,
            charts,
            print_table: false,
            skip_repeated_headers: default_skip_repeated_headers(),
        }
    }

    /// Average throughput, RTT and drop rate (%) per variant, as bar charts.
    pub fn benchmark() -> Self {
        let charts = vec![
            ChartSpec::bar(
                Column::Variant,
                Column::Throughput,
                "Avg Throughput per TCP Variant",
                "Throughput (Mbps)",
            )
            .with_value_labels(ValueLabels::new(2, 0.05)),
            ChartSpec::bar(
                Column::Variant,
                Column::AvgRtt,
                "Avg RTT per TCP Variant",
                "RTT (ms)",
            )
            .with_value_labels(ValueLabels::new(1, 0.5)),
            ChartSpec::bar(
                Column::Variant,
                Column::DropRatePercent,
                "Avg Drop Rate per TCP Variant",
                "Drop Rate (%)",
            )
            .with_value_labels(ValueLabels::new(2, 0.05).with_suffix("%"))
            .with_y_limit(YLimit::MaxPlus(1.0)),
        ];
        let layout = Layout::Single {
            label: BENCHMARK_LABEL.to_string(),
        };
        let mut config = Self::new(BENCHMARK_INPUT, layout, charts);
        config.set_output_template("{label}.png");
        config.set_title_template(BENCHMARK_TITLE);
        config.set_title_size(BENCHMARK_TITLE_SIZE);
        config
    }

    /// Throughput, RTT and drop rate vs CBR for each of the scenarios 1 to 4.
    pub fn scenarios() -> Self {
        let layout = Layout::PerValue {
            column: Column::Scenario,
            selection: Selection::range(SCENARIO_PREFIX, SCENARIOS),
        };
        let mut config = Self::new(SCENARIOS_INPUT, layout, metric_lines());
        config.set_print_table(true);
        config
    }

    /// Throughput, RTT and drop rate vs CBR for the fat tree topology.
    pub fn fat_tree() -> Self {
        let label =
            FigureLabel::new(FAT_TREE_SCENARIO, FAT_TREE_LABEL, FAT_TREE_LABEL);
        let layout = Layout::PerValue {
            column: Column::Scenario,
            selection: Selection::Values(vec![label]),
        };
        Self::new(FAT_TREE_INPUT, layout, metric_lines())
    }

    /// Loads a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Report> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("open config {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .wrap_err_with(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that charts, filter and layout are consistent.
    pub fn validate(&self) -> Result<(), Report> {
        if self.charts.is_empty() {
            eyre::bail!("no charts configured");
        }
        for chart in &self.charts {
            chart.validate()?;
        }
        if let Some(filter) = &self.filter {
            if filter.column.is_numeric() {
                eyre::bail!(
                    "cannot filter on numeric column {:?}",
                    filter.column.header()
                );
            }
        }
        if let Layout::PerValue { column, selection } = &self.layout {
            if column.is_numeric() {
                eyre::bail!(
                    "cannot split figures on numeric column {:?}",
                    column.header()
                );
            }
            if selection == &Selection::Values(Vec::new()) {
                eyre::bail!("no values selected for column {:?}", column.header());
            }
        }
        Ok(())
    }

    /// All columns referenced by this configuration.
    pub fn columns(&self) -> BTreeSet<Column> {
        let mut columns = BTreeSet::new();
        if let Some(filter) = &self.filter {
            columns.insert(filter.column);
        }
        if let Layout::PerValue { column, .. } = &self.layout {
            columns.insert(*column);
        }
        for chart in &self.charts {
            columns.insert(chart.x);
            columns.insert(chart.y);
            columns.extend(chart.hue);
        }
        columns
    }

    /// Title and output path of the figure with the given labels.
    pub fn figure_name(&self, title_label: &str, file_label: &str) -> FigureName {
        let title = self.title_template.replace(LABEL, title_label);
        let file = self.output_template.replace(LABEL, file_label);
        FigureName {
            title,
            path: self.output_dir.join(file),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn set_input<P: Into<PathBuf>>(&mut self, input: P) {
        self.input = input.into();
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_output_dir<P: Into<PathBuf>>(&mut self, output_dir: P) {
        self.output_dir = output_dir.into();
    }

    pub fn set_output_template(&mut self, output_template: &str) {
        self.output_template = output_template.to_string();
    }

    pub fn set_title_template(&mut self, title_template: &str) {
        self.title_template = title_template.to_string();
    }

    pub fn figure_size(&self) -> (u32, u32) {
        self.figure_size
    }

    pub fn set_figure_size(&mut self, figure_size: (u32, u32)) {
        self.figure_size = figure_size;
    }

    pub fn title_size(&self) -> u32 {
        self.title_size
    }

    pub fn set_title_size(&mut self, title_size: u32) {
        self.title_size = title_size;
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn set_filter(&mut self, column: Column, value: &str) {
        self.filter = Some(Filter {
            column,
            value: value.to_string(),
        });
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn charts(&self) -> &[ChartSpec] {
        &self.charts
    }

    pub fn print_table(&self) -> bool {
        self.print_table
    }

    pub fn set_print_table(&mut self, print_table: bool) {
        self.print_table = print_table;
    }

    pub fn skip_repeated_headers(&self) -> bool {
        self.skip_repeated_headers
    }

    pub fn set_skip_repeated_headers(&mut self, skip_repeated_headers: bool) {
        self.skip_repeated_headers = skip_repeated_headers;
    }
}

// the three metrics against the offered load, one line per variant
fn metric_lines() -> Vec<ChartSpec> {
    let line = |y: Column, title: &str, y_label: &str| {
        ChartSpec::line(
            Column::Cbr,
            y,
            Column::Variant,
            title,
            "CBR (Mbps)",
            y_label,
        )
    };
    vec![
        line(Column::Throughput, "Throughput vs CBR", "Throughput (Mbps)"),
        line(Column::AvgRtt, "Avg RTT vs CBR", "RTT (ms)"),
        line(Column::DropRate, "Drop Rate vs CBR", "Drop Rate"),
    ]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(OUTPUT_DIR)
}

fn default_output_template() -> String {
    OUTPUT_TEMPLATE.to_string()
}

fn default_title_template() -> String {
    TITLE_TEMPLATE.to_string()
}

fn default_figure_size() -> (u32, u32) {
    FIGURE_SIZE
}

fn default_title_size() -> u32 {
    TITLE_SIZE
}

fn default_skip_repeated_headers() -> bool {
    true
}
