//! Chart Plotter Module
//! Draws figure panels interactively using egui_plot.

use crate::charts::figure::{format_timestamp, AxisSpec, Figure, Panel, XAxisKind};
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

/// Trace colors, in the order the dashboard's web charts assign them.
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(99, 110, 250),  // Indigo
    Color32::from_rgb(239, 85, 59),   // Red
    Color32::from_rgb(0, 204, 150),   // Green
    Color32::from_rgb(171, 99, 250),  // Purple
    Color32::from_rgb(255, 161, 90),  // Orange
    Color32::from_rgb(25, 211, 243),  // Cyan
    Color32::from_rgb(255, 102, 146), // Pink
    Color32::from_rgb(182, 232, 128), // Light Green
    Color32::from_rgb(255, 151, 255), // Magenta
    Color32::from_rgb(254, 203, 82),  // Yellow
];

const MIN_PANEL_HEIGHT: f32 = 180.0;

/// Draws figures using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th trace of a figure.
    pub fn trace_color(trace_index: usize) -> Color32 {
        PALETTE[trace_index % PALETTE.len()]
    }

    /// Draw every panel of the figure stacked vertically, sharing the
    /// available height.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure, plot_id: &str) {
        let panels = figure.panels();
        if panels.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Figure has no traces").size(16.0));
            });
            return;
        }

        let spacing = ui.spacing().item_spacing.y;
        let height = ((ui.available_height() - spacing * panels.len() as f32)
            / panels.len() as f32)
            .max(MIN_PANEL_HEIGHT);

        let mut trace_index = 0;
        for panel in &panels {
            let axis = figure.layout.y_axis(&panel.axis_ref);
            Self::draw_panel(ui, panel, &axis, trace_index, height, plot_id);
            trace_index += panel.traces.len();
        }
    }

    /// Draw one subplot.
    fn draw_panel(
        ui: &mut egui::Ui,
        panel: &Panel<'_>,
        axis: &AxisSpec,
        first_trace_index: usize,
        height: f32,
        plot_id: &str,
    ) {
        let time_axis = panel
            .traces
            .iter()
            .any(|trace| trace.x_kind() == XAxisKind::Time);

        // Subplots of one figure pan and zoom together along x.
        let group = egui::Id::new(plot_id);
        let mut plot = Plot::new(format!("{}_{}", plot_id, panel.axis_ref))
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .link_axis(group, [true, false])
            .link_cursor(group, [true, false].into());

        if let Some(title) = axis.title_text() {
            plot = plot.y_axis_label(title);
        }

        if time_axis {
            plot = plot.x_axis_formatter(|mark, _range| format_timestamp(mark.value));
        }

        if axis.has_tick_labels() {
            let ticks = axis.clone();
            plot = plot.y_axis_formatter(move |mark, _range| {
                ticks
                    .tick_label(mark.value)
                    .map(str::to_string)
                    .unwrap_or_default()
            });
        }

        plot.show(ui, |plot_ui| {
            for (offset, trace) in panel.traces.iter().enumerate() {
                let index = first_trace_index + offset;
                let color = Self::trace_color(index);
                let points = trace.points();
                let name = trace.display_name(index);

                let markers_only = trace.mode.as_deref() == Some("markers");
                if markers_only {
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .radius(2.0)
                            .color(color)
                            .name(name),
                    );
                } else {
                    plot_ui.line(
                        Line::new(PlotPoints::from(points))
                            .color(color)
                            .width(1.5)
                            .name(name),
                    );
                }
            }
        });
    }
}
