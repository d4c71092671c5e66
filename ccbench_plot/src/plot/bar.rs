use crate::chart::BarData;
use crate::fmt::PlotFmt;
use color_eyre::Report;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

// horizontal space left on each side of a bar, in pixels
const BAR_MARGIN: u32 = 12;

pub(super) fn draw<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &BarData,
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
        .build_cartesian_2d(
            slots(data.bars.len()).with_key_points(centers(data.bars.len())),
            data.y_range.clone(),
        )?;

    // ticks sit at bar centers only
    let x_label_formatter = |x: &f64| {
        data.bars
            .get(x.floor() as usize)
            .map(|bar| bar.label.clone())
            .unwrap_or_default()
    };
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_label_formatter(&x_label_formatter)
        .y_desc(&data.y_label)
        .label_style((PlotFmt::font(), PlotFmt::label_size()));
    if let Some(x_label) = &data.x_label {
        mesh.x_desc(x_label);
    }
    mesh.draw()?;

    let color = PlotFmt::bar_color();
    chart.draw_series(data.bars.iter().enumerate().map(|(index, bar)| {
        let left = index as f64;
        let corners = [(left, 0.0), (left + 1.0, bar.value)];
        let mut rectangle = Rectangle::new(corners, color.filled());
        rectangle.set_margin(0, 0, BAR_MARGIN, BAR_MARGIN);
        rectangle
    }))?;

    // value labels centered above each bar
    let font = (PlotFmt::font(), PlotFmt::label_size()).into_font();
    let style =
        TextStyle::from(font).pos(Pos::new(HPos::Center, VPos::Bottom));
    let bars = data.bars.iter().zip(centers(data.bars.len()));
    chart.draw_series(bars.filter_map(|(bar, center)| {
        let text = bar.text.as_ref()?;
        let position = (center, bar.value + data.text_offset);
        Some(Text::new(text.clone(), position, style.clone()))
    }))?;

    Ok(())
}

// One unit of the x axis per bar; bar `i` spans `i..i + 1`.
fn slots(bars: usize) -> Range<f64> {
    0.0..bars.max(1) as f64
}

fn centers(bars: usize) -> Vec<f64> {
    (0..bars).map(|index| index as f64 + 0.5).collect()
}
