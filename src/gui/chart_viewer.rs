//! Chart Viewer Widget
//! Central panel showing the current figure using egui_plot.

use crate::charts::{ChartPlotter, Figure};
use crate::client::RenderPayload;
use crate::controller::ChartSink;
use egui::RichText;

/// Holds the figure last handed over by the controller.
#[derive(Default)]
pub struct ChartViewer {
    figure: Option<Figure>,
    /// Bumped on every replacement so egui drops the previous plot's zoom.
    revision: u64,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    pub fn has_figure(&self) -> bool {
        self.figure.is_some()
    }

    /// Draw the chart viewer
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(figure) = &self.figure else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        if let Some(title) = figure.title() {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(title).size(18.0).strong());
            });
            ui.add_space(8.0);
        }

        ChartPlotter::draw_figure(ui, figure, &format!("visualization_{}", self.revision));
    }
}

impl ChartSink for ChartViewer {
    fn replace_figure(&mut self, payload: RenderPayload) {
        self.figure = Some(payload.into_figure());
        self.revision += 1;
    }
}
