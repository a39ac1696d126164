//! Summary Table Widget
//! Record counts per user and view, read from the user metadata.

use crate::controller::format_record_count;
use crate::data::SummaryTable;
use egui::RichText;

pub struct SummaryView;

impl SummaryView {
    /// Draw the summary table, with a totals row at the bottom.
    pub fn show(ui: &mut egui::Ui, table: &SummaryTable) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Data Summary Statistics").size(18.0).strong());
        });
        ui.add_space(8.0);

        if table.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No user metadata loaded").size(16.0));
            });
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    egui::Grid::new("summary_table")
                        .striped(true)
                        .min_col_width(80.0)
                        .spacing([12.0, 4.0])
                        .show(ui, |ui| {
                            ui.label(RichText::new("User").strong());
                            for column in &table.columns {
                                ui.label(RichText::new(column).strong());
                            }
                            ui.end_row();

                            for row in &table.rows {
                                ui.label(&row.slug);
                                for count in &row.counts {
                                    match count {
                                        Some(n) => ui.label(format_count(*n)),
                                        None => ui.label("-"),
                                    };
                                }
                                ui.end_row();
                            }

                            ui.label(RichText::new("Total").strong());
                            for total in table.totals() {
                                ui.label(RichText::new(format_count(total)).strong());
                            }
                            ui.end_row();
                        });
                });
        });
    }
}

fn format_count(n: i64) -> String {
    match usize::try_from(n) {
        Ok(n) => format_record_count(n),
        Err(_) => n.to_string(),
    }
}
