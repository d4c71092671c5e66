use crate::chart::LineData;
use crate::fmt::PlotFmt;
use color_eyre::Report;
use plotters::coord::Shift;
use plotters::prelude::*;

pub(super) fn draw<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &LineData,
) -> Result<(), Report>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(&data.title, (PlotFmt::font(), PlotFmt::caption_size()))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(data.x_range.clone(), data.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(&data.x_label)
        .y_desc(&data.y_label)
        .label_style((PlotFmt::font(), PlotFmt::label_size()))
        .draw()?;

    for (index, line) in data.lines.iter().enumerate() {
        let color = PlotFmt::color(&line.label, index);
        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(line.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });

        if data.markers {
            chart.draw_series(line.points.iter().map(|point| {
                Circle::new(*point, PlotFmt::marker_size(), color.filled())
            }))?;
        }
    }

    if !data.lines.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((PlotFmt::font(), PlotFmt::label_size()))
            .draw()?;
    }

    Ok(())
}
