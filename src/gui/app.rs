//! HMC Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::client::PlotSource;
use crate::controller::{Selection, ViewController};
use crate::data::{UserDirectory, ViewCatalog};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, SummaryView};
use egui::SidePanel;

const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 700;

/// Main application window.
pub struct DashboardApp<S: PlotSource> {
    controller: ViewController<S>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl<S: PlotSource> DashboardApp<S> {
    /// Build the window and start loading the initial selection.
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: S,
        selection: Selection,
        directory: UserDirectory,
        views: ViewCatalog,
    ) -> Self {
        let mut controller = ViewController::new(source);
        controller.refresh(selection.clone());
        Self {
            controller,
            control_panel: ControlPanel::new(selection, directory, views),
            chart_viewer: ChartViewer::new(),
        }
    }

    /// Save the figure on screen as a PNG chosen by the user.
    fn handle_export_png(&mut self) {
        let Some(figure) = self.chart_viewer.figure() else {
            return;
        };

        let caption = self.control_panel.selection_caption();
        let file_name = format!("{}.png", caption.replace(' ', "_"));
        let output_path = match rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(&file_name)
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        let note = match StaticChartRenderer::render_png(
            figure,
            &caption,
            &output_path,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
        ) {
            Ok(()) => format!("Saved {}", output_path.display()),
            Err(e) => {
                tracing::warn!(error = %e, path = %output_path.display(), "PNG export failed");
                format!("Export failed: {}", e)
            }
        };
        self.control_panel.export_note = Some(note);
    }
}

impl<S: PlotSource> eframe::App for DashboardApp<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished requests
        self.controller.poll(&mut self.chart_viewer);
        self.control_panel.export_enabled =
            self.control_panel.page().has_chart() && self.chart_viewer.has_figure();

        // Request repaint while a request is outstanding
        if self.controller.view_model().is_loading() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                let action = self.control_panel.show(ui, self.controller.view_model());

                match action {
                    ControlPanelAction::SelectorChanged(selector) => {
                        if let Some(request) = self.control_panel.request() {
                            self.controller.on_selector_changed(selector, request);
                        }
                    }
                    ControlPanelAction::PageChanged(page) => {
                        tracing::debug!(%page, "Page changed");
                        if let Some(request) = self.control_panel.request() {
                            self.controller.refresh(request);
                        }
                    }
                    ControlPanelAction::ExportPng => self.handle_export_png(),
                    ControlPanelAction::None => {}
                }
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.control_panel.page().has_chart() {
                self.chart_viewer.show(ui);
            } else {
                SummaryView::show(ui, &self.control_panel.summary);
            }
        });
    }
}
