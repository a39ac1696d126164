//! Static Chart Renderer
//! Writes the current figure to a PNG file.
//!
//! Layout:
//! 1. Title (figure title, or the caption passed by the caller)
//! 2. One subplot per y axis, stacked top to bottom, sharing the x range
//! 3. Legend in the upper right corner of each subplot

use crate::charts::figure::{format_timestamp, Figure, XAxisKind};
use crate::charts::plotter::PALETTE;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

const WHITE_BG: RGBColor = RGBColor(255, 255, 255);
const TITLE_FONT_SIZE: f64 = 24.0;
const LABEL_FONT_SIZE: f64 = 14.0;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Figure has no plottable points")]
    Empty,
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every panel of the figure into a PNG at `path`.
    pub fn render_png(
        figure: &Figure,
        caption: &str,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), ExportError> {
        let panels = figure.panels();
        let series: Vec<Vec<(String, Vec<[f64; 2]>)>> = panels
            .iter()
            .map(|panel| {
                panel
                    .traces
                    .iter()
                    .enumerate()
                    .map(|(i, trace)| (trace.display_name(i), trace.points()))
                    .collect()
            })
            .collect();

        let (x_min, x_max) = Self::get_x_range(&series).ok_or(ExportError::Empty)?;
        let time_axis = figure
            .data
            .iter()
            .any(|trace| trace.x_kind() == XAxisKind::Time);

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE_BG).map_err(draw_err)?;

        let title = figure.title().unwrap_or_else(|| caption.to_string());
        let root = root
            .titled(
                &title,
                FontDesc::new(FontFamily::SansSerif, TITLE_FONT_SIZE, FontStyle::Normal),
            )
            .map_err(draw_err)?;

        let areas = root.split_evenly((series.len().max(1), 1));
        let mut color_index = 0;

        for ((panel, panel_series), area) in panels.iter().zip(&series).zip(areas.iter()) {
            let (y_min, y_max) = Self::get_y_range(panel_series);
            let axis = figure.layout.y_axis(&panel.axis_ref);

            let mut chart = ChartBuilder::on(area)
                .margin(10)
                .x_label_area_size(35)
                .y_label_area_size(80)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(draw_err)?;

            let x_formatter = |v: &f64| {
                if time_axis {
                    format_timestamp(*v)
                } else {
                    Self::short_number(*v)
                }
            };
            let y_formatter = |v: &f64| match axis.tick_label(*v) {
                Some(label) => label.to_string(),
                None if axis.has_tick_labels() => String::new(),
                None => Self::short_number(*v),
            };

            let mut mesh = chart.configure_mesh();
            mesh.x_labels(6)
                .x_label_formatter(&x_formatter)
                .y_label_formatter(&y_formatter)
                .label_style(FontDesc::new(
                    FontFamily::SansSerif,
                    LABEL_FONT_SIZE,
                    FontStyle::Normal,
                ));
            if let Some(y_title) = axis.title_text() {
                mesh.y_desc(y_title);
            }
            mesh.draw().map_err(draw_err)?;

            for (name, points) in panel_series {
                let color = Self::get_color(color_index);
                color_index += 1;

                chart
                    .draw_series(LineSeries::new(
                        points.iter().map(|&[x, y]| (x, y)),
                        color.stroke_width(2),
                    ))
                    .map_err(draw_err)?
                    .label(name.as_str())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }

            chart
                .configure_series_labels()
                .background_style(WHITE_BG.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperRight)
                .draw()
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        tracing::info!(path = %path.display(), "Exported figure");
        Ok(())
    }

    fn get_color(idx: usize) -> RGBColor {
        let c = PALETTE[idx % PALETTE.len()];
        RGBColor(c.r(), c.g(), c.b())
    }

    fn get_x_range(series: &[Vec<(String, Vec<[f64; 2]>)>]) -> Option<(f64, f64)> {
        let xs = series
            .iter()
            .flatten()
            .flat_map(|(_, points)| points.iter().map(|p| p[0]));
        let (min, max) = Self::bounds(xs)?;
        Some(Self::pad(min, max, 0.0))
    }

    fn get_y_range(series: &[(String, Vec<[f64; 2]>)]) -> (f64, f64) {
        let ys = series.iter().flat_map(|(_, points)| points.iter().map(|p| p[1]));
        let (min, max) = Self::bounds(ys).unwrap_or((0.0, 1.0));
        Self::pad(min, max, 0.05)
    }

    fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        values
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Widen a range by `fraction` on both sides; degenerate ranges get a unit span.
    fn pad(min: f64, max: f64, fraction: f64) -> (f64, f64) {
        if (max - min).abs() < f64::EPSILON {
            return (min - 0.5, max + 0.5);
        }
        let margin = (max - min) * fraction;
        (min - margin, max + margin)
    }

    fn short_number(v: f64) -> String {
        if v.fract().abs() < 1e-9 {
            format!("{:.0}", v)
        } else {
            format!("{:.2}", v)
        }
    }
}

fn draw_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> ExportError {
    ExportError::Draw(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_ranges_are_widened() {
        assert_eq!(StaticChartRenderer::pad(3.0, 3.0, 0.05), (2.5, 3.5));
        let (lo, hi) = StaticChartRenderer::pad(0.0, 10.0, 0.1);
        assert_eq!((lo, hi), (-1.0, 11.0));
    }

    #[test]
    fn x_range_ignores_non_finite_values() {
        let series = vec![vec![(
            "a".to_string(),
            vec![[1.0, 0.0], [f64::NAN, 1.0], [4.0, 2.0]],
        )]];
        assert_eq!(StaticChartRenderer::get_x_range(&series), Some((1.0, 4.0)));
        assert_eq!(StaticChartRenderer::get_x_range(&[]), None);
    }

    #[test]
    fn empty_figure_is_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let err = StaticChartRenderer::render_png(&Figure::default(), "x", &path, 200, 100)
            .unwrap_err();
        assert!(matches!(err, ExportError::Empty));
        assert!(!path.exists());
    }
}
