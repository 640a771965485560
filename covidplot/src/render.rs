//! Drawing a `GrowthChart` with plotters.

use std::path::{Path, PathBuf};

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::{
    chart::{axis_upper, format_thousands, log_ticks, GrowthChart},
    metric::Metric,
};

/// Default line colours, one per selected country.
const SERIES_COLORS: [RGBColor; 8] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
];

const GUIDE_COLOR: RGBColor = RGBColor(0x66, 0x66, 0x66);
const FONT: &str = "sans-serif";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Svg,
    Bitmap,
}

impl OutputKind {
    /// `.svg` files are vector output, anything else is rasterised (format by extension).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => OutputKind::Svg,
            _ => OutputKind::Bitmap,
        }
    }
}

/// File the chart is written to when none is given: the metric's window title as a PNG.
pub fn default_output_path(metric: Metric) -> PathBuf {
    PathBuf::from(format!("{}.png", metric.window_title()))
}

pub fn render(chart: &GrowthChart, path: &Path, size: (u32, u32)) -> anyhow::Result<()> {
    info!("Rendering chart to {}", path.display());
    match OutputKind::from_path(path) {
        OutputKind::Svg => draw_growth_chart(SVGBackend::new(path, size).into_drawing_area(), chart),
        OutputKind::Bitmap => {
            draw_growth_chart(BitMapBackend::new(path, size).into_drawing_area(), chart)
        }
    }
}

fn draw_growth_chart<DB>(root: DrawingArea<DB, Shift>, chart: &GrowthChart) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let bounds = chart.bounds;
    let y_top = axis_upper(bounds.max_y);
    let x_right = (bounds.last_x() * 1.05).max(1.0);

    root.fill(&WHITE)?;
    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title(), (FONT, 24))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(
            0f64..x_right,
            (bounds.min_y..y_top)
                .log_scale()
                .with_key_points(log_ticks(bounds.min_y, y_top)),
        )?;

    ctx.configure_mesh()
        .x_label_formatter(&|x| format!("{x:.0}"))
        .y_label_formatter(&|y| format_thousands(*y))
        .label_style((FONT, 14))
        .draw()?;

    // Doubling-time guides
    for line in &chart.reference_lines {
        ctx.draw_series(DashedLineSeries::new(
            vec![line.start, line.end],
            2,
            3,
            GUIDE_COLOR.stroke_width(1),
        ))?;
    }

    for (idx, series) in chart.series.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let points = chart
            .plotted(series)
            .iter()
            .enumerate()
            .map(|(day, value)| (day as f64, *value as f64))
            .collect::<Vec<_>>();
        ctx.draw_series(LineSeries::new(points, color.stroke_width(1)).point_size(2))?
            .label(series.geo_id.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .label_font((FONT, 14))
        .draw()?;

    let (width, height) = root.dim_in_pixel();
    let caption_style = (FONT, 11)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Bottom));
    root.draw(&Text::new(
        chart.caption(),
        (width as i32 - 8, height as i32 - 4),
        caption_style,
    ))?;

    root.present()?;
    Ok(())
}
