mod bar;
mod line;

use crate::chart::ChartData;
use crate::fmt::PlotFmt;
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Report;
use plotters::prelude::*;
use std::path::Path;

/// Draws `charts` side by side under `title` and saves the figure as a PNG
/// file at `path`. `title_size` is in points.
pub fn render_figure(
    path: &Path,
    title: &str,
    title_size: u32,
    size: (u32, u32),
    charts: &[ChartData],
) -> Result<(), Report> {
    if charts.is_empty() {
        eyre::bail!("no charts to draw in {}", path.display());
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let title_size = PlotFmt::points_to_pixels(title_size);
    let figure = root.titled(title, (PlotFmt::font(), title_size))?;

    let panels = figure.split_evenly((1, charts.len()));
    for (chart, panel) in charts.iter().zip(panels.iter()) {
        let drawn = match chart {
            ChartData::Bar(data) => bar::draw(panel, data),
            ChartData::Line(data) => line::draw(panel, data),
        };
        drawn.wrap_err_with(|| format!("draw chart {:?}", chart.title()))?;
    }

    root.present()
        .wrap_err_with(|| format!("save figure {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart;
    use ccbench::{MeasurementDB, ReportConfig, Search};

    const SIM_RESULTS: &str = "\
Scenario,Variant,CBR(Mbps),Throughput(Mbps),AvgRTT(ms),DropRate
Scenario1,TcpVegas, 1, 0.9, 40.0, 0.0
Scenario1,TcpVegas, 2, 1.8, 42.0, 0.01
Scenario1,TcpCubic, 1, 1.0, 50.0, 0.02
Scenario1,TcpCubic, 2, 1.9, 56.0, 0.03
";

    #[test]
    fn render_png() {
        let db = MeasurementDB::from_reader(SIM_RESULTS.as_bytes(), true)
            .unwrap();
        let rows = db.find(&Search::new()).unwrap();

        let mut charts = Vec::new();
        for config in vec![ReportConfig::scenarios(), ReportConfig::benchmark()]
        {
            for spec in config.charts() {
                charts.push(chart::prepare(spec, &rows).unwrap());
            }
        }

        let path = std::env::temp_dir().join("ccbench_plot_render_png.png");
        let _ = std::fs::remove_file(&path);
        if let Err(e) =
            render_figure(&path, "render test", 16, (3600, 500), &charts)
        {
            panic!("error while rendering png: {:?}", e);
        }

        // check that the file was indeed created
        assert!(path.is_file());
    }

    #[test]
    fn no_charts() {
        let path = std::env::temp_dir().join("ccbench_plot_no_charts.png");
        assert!(render_figure(&path, "empty", 16, (100, 100), &[]).is_err());
        assert!(!path.exists());
    }
}
