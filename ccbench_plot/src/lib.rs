#![deny(rust_2018_idioms)]

// This module contains the computation of the data drawn in each chart.
pub mod chart;

// This module contains the definition of `PlotFmt`.
mod fmt;

// This module contains the rendering of figures with plotters.
pub mod plot;

use ccbench::config::{FigureLabel, FigureName, Layout, Selection};
use ccbench::{MeasurementDB, ReportConfig, Search};
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// log level used when `RUST_LOG` is not set
const DEFAULT_LOG_LEVEL: &str = "info";

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Loads the results file of `config`, draws every figure it describes and
/// returns the paths of the files written.
pub fn generate(config: &ReportConfig) -> Result<Vec<PathBuf>, Report> {
    config.validate().wrap_err("invalid report config")?;

    let db = MeasurementDB::load(config.input(), config.skip_repeated_headers())?;
    if config.print_table() {
        println!("{}", db);
    }

    // fail early if the configuration references a column the file lacks
    for column in config.columns() {
        if !db.has_column(column) {
            eyre::bail!(
                "missing column {:?} in {}",
                column.header(),
                config.input().display()
            );
        }
    }

    // rows shared by all figures
    let base = base_search(config)?;

    std::fs::create_dir_all(config.output_dir()).wrap_err_with(|| {
        format!("create output dir {}", config.output_dir().display())
    })?;

    let mut paths = Vec::new();
    for (name, search) in figures(config, &db, &base)? {
        let rows = db.find(&search)?;
        if rows.is_empty() {
            eyre::bail!("no rows for figure {:?}", name.title);
        }
        debug!("figure {:?} has {} rows", name.title, rows.len());

        let charts = config
            .charts()
            .iter()
            .map(|spec| chart::prepare(spec, &rows))
            .collect::<Result<Vec<_>, _>>()
            .wrap_err_with(|| format!("prepare figure {:?}", name.title))?;

        let (title_size, size) = (config.title_size(), config.figure_size());
        plot::render_figure(&name.path, &name.title, title_size, size, &charts)?;
        info!("saved {}", name.path.display());
        paths.push(name.path);
    }
    Ok(paths)
}

// Search with the configured filter (if any).
fn base_search(config: &ReportConfig) -> Result<Search, Report> {
    let mut search = Search::new();
    if let Some(filter) = config.filter() {
        search.set(filter.column, &filter.value)?;
    }
    Ok(search)
}

// Name and rows of each figure described by the layout. Figures only cover
// rows matching `base`: distinct values are taken from those rows, and a
// filter on the split column keeps only the selected values equal to it.
fn figures(
    config: &ReportConfig,
    db: &MeasurementDB,
    base: &Search,
) -> Result<Vec<(FigureName, Search)>, Report> {
    let (column, selection) = match config.layout() {
        Layout::Single { label } => {
            let name = config.figure_name(label, label);
            return Ok(vec![(name, base.clone())]);
        }
        Layout::PerValue { column, selection } => (*column, selection),
    };

    let labels: Vec<FigureLabel> = match selection {
        Selection::Distinct => {
            let values: BTreeSet<_> = db
                .find(base)?
                .into_iter()
                .filter_map(|measurement| measurement.label(column))
                .collect();
            values.into_iter().map(FigureLabel::same).collect()
        }
        Selection::Values(labels) => labels
            .iter()
            .filter(|label| match base.get(column) {
                Some(value) if label.value.trim() != value => {
                    debug!("skipping {:?}: filtered out", label.value);
                    false
                }
                _ => true,
            })
            .cloned()
            .collect(),
    };
    if labels.is_empty() {
        eyre::bail!(
            "no {:?} values left to plot after filtering",
            column.header()
        );
    }

    let mut figures = Vec::with_capacity(labels.len());
    for label in labels {
        let mut search = base.clone();
        search.set(column, &label.value)?;
        figures.push((config.figure_name(&label.title, &label.file), search));
    }
    Ok(figures)
}
