//! Plotters-powered x/y chart widget for Ratatui (line and scatter charts).
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Points,
}

/// One drawable series: a polyline or a cloud of dots in a single colour.
#[derive(Debug, Clone)]
pub struct Series {
    pub kind: SeriesKind,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

/// A render-only chart description.
///
/// All series and bounds are computed outside the render call, which keeps
/// `render()` focused on drawing.
pub struct XyChart<'a> {
    pub series: &'a [Series],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for XyChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area; show a hint instead of panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for series in self.series {
                match series.kind {
                    SeriesKind::Line => {
                        chart.draw_series(LineSeries::new(series.points.iter().copied(), &series.color))?;
                    }
                    // `Circle` markers come out huge through the ratatui backend
                    // (radius is mapped to canvas units); a coloured `Pixel` is a clean dot.
                    SeriesKind::Points => {
                        chart.draw_series(
                            series
                                .points
                                .iter()
                                .map(|&(x, y)| Pixel::new((x, y), series.color)),
                        )?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Padded `[min, max]` over `values`, or `None` when there is nothing finite to plot.
///
/// A single distinct value is widened to `value ± 1` so the axis has a span.
pub fn padded_bounds(values: impl IntoIterator<Item = f64>) -> Option<[f64; 2]> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    if max <= min {
        return Some([min - 1.0, max + 1.0]);
    }
    let pad = ((max - min) * 0.05).max(1e-12);
    Some([min - pad, max + pad])
}
