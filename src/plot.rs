use std::collections::BTreeMap;
use std::path::Path;

use plotters::{
    chart::{ChartBuilder, SeriesLabelPosition},
    prelude::{IntoDrawingArea, PathElement, SVGBackend},
    series::LineSeries,
    style::{Color, IntoFont, Palette, Palette99, BLACK, WHITE},
};
use thiserror::Error;

use crate::data::SampleAxis;

const DEFAULT_SIZE: (u32, u32) = (1280, 720);

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("nothing to plot")]
    Empty,

    #[error("failed to draw {path:?}: {message}")]
    Drawing { path: String, message: String },
}

/// Title and axis setup of a density chart.
#[derive(Debug, Clone)]
pub struct PlotSpec<'a> {
    pub title: &'a str,
    pub y_label: &'a str,
    pub axis: SampleAxis,
}

/// Draw one line per condition with a legend keyed by condition name.
pub fn render_density_svg(
    path: &Path,
    signals: &BTreeMap<String, Vec<f64>>,
    spec: &PlotSpec<'_>,
) -> Result<(), PlotError> {
    let longest = signals.values().map(Vec::len).max().unwrap_or(0);
    if longest == 0 {
        return Err(PlotError::Empty);
    }
    let drawing = |err: &dyn std::fmt::Display| PlotError::Drawing {
        path: path.display().to_string(),
        message: err.to_string(),
    };

    let (y_min, y_max) = value_bounds(signals.values().flatten().copied());
    let x_max = spec.axis.value(longest.saturating_sub(1)).max(spec.axis.value(1));

    let root = SVGBackend::new(path, DEFAULT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| drawing(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, ("sans-serif", 30.0).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)
        .map_err(|e| drawing(&e))?;

    chart
        .configure_mesh()
        .x_desc(spec.axis.label())
        .y_desc(spec.y_label)
        .y_label_formatter(&|y| format!("{y:.2e}"))
        .draw()
        .map_err(|e| drawing(&e))?;

    for (idx, (name, signal)) in signals.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let data = signal
            .iter()
            .enumerate()
            .map(|(i, value)| (spec.axis.value(i), *value));
        chart
            .draw_series(LineSeries::new(data, color.stroke_width(2)))
            .map_err(|e| drawing(&e))?
            .label(name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| drawing(&e))?;

    root.present().map_err(|e| drawing(&e))?;
    Ok(())
}

fn value_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut min, mut max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() <= f64::EPSILON * max.abs().max(1.0) {
        let pad = if max == 0.0 { 1.0 } else { max.abs() * 0.1 };
        min -= pad;
        max += pad;
    } else {
        let pad = (max - min) * 0.05;
        min -= pad;
        max += pad;
    }
    (min, max)
}
