//! Control Panel Widget
//! Left side panel with the page and user/view selectors, load indicator and status.

use crate::client::PlotRequest;
use crate::controller::{Page, Selection, Selector, ViewModel, FAILURE_MESSAGE};
use crate::data::{SummaryTable, UserDirectory, UserEntry, ViewCatalog};
use egui::{Color32, ComboBox, RichText};

const LABEL_WIDTH: f32 = 60.0;
const COMBO_WIDTH: f32 = 190.0;

/// Left side control panel with the page and selector combos.
pub struct ControlPanel {
    page: Page,
    selection: Selection,
    other_user: String,
    pub directory: UserDirectory,
    pub views: ViewCatalog,
    pub summary: SummaryTable,
    pub export_enabled: bool,
    pub export_note: Option<String>,
}

impl ControlPanel {
    pub fn new(selection: Selection, directory: UserDirectory, views: ViewCatalog) -> Self {
        let other_user = directory
            .users()
            .iter()
            .map(|u| u.full_id.as_str())
            .find(|id| *id != selection.user)
            .unwrap_or(selection.user.as_str())
            .to_string();
        let summary = SummaryTable::new(&directory, &views);
        Self {
            page: Page::default(),
            selection,
            other_user,
            directory,
            views,
            summary,
            export_enabled: false,
            export_note: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Current values of the user and view selectors.
    pub fn selection(&self) -> Selection {
        self.selection.clone()
    }

    /// Chart request for the current page and selector values.
    pub fn request(&self) -> Option<PlotRequest> {
        self.page.request(&self.selection, &self.other_user)
    }

    /// Users offered on the current page. Paired-view pages only list users
    /// with records in both views.
    pub fn users_for_page(&self) -> Vec<&UserEntry> {
        match self.page.view_pair() {
            Some((view1, view2)) => self.directory.users_with_records(&[view1, view2]),
            None => self.directory.users().iter().collect(),
        }
    }

    /// Switch pages. When the current user is filtered out of the new page's
    /// list, the first listed user is selected instead.
    pub fn set_page(&mut self, page: Page) {
        self.page = page;
        let replacement = {
            let users = self.users_for_page();
            if users.iter().any(|u| u.full_id == self.selection.user) {
                None
            } else {
                users.first().map(|u| u.full_id.clone())
            }
        };
        if let Some(user) = replacement {
            self.selection.user = user;
        }
    }

    /// Label for the current chart, used for export file names.
    pub fn selection_caption(&self) -> String {
        let user = self.slug(&self.selection.user);
        let view = self.views.label_for(&self.selection.view);
        match self.page {
            Page::CompareUsers => format!("{} vs {} {}", user, self.slug(&self.other_user), view),
            Page::Overview | Page::Summary => format!("{} {}", user, view),
            paired => format!("{} {}", user, paired.title()),
        }
    }

    fn slug<'a>(&'a self, full_id: &'a str) -> &'a str {
        self.directory
            .get(full_id)
            .map(|u| u.slug.as_str())
            .unwrap_or(full_id)
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, model: &ViewModel) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📈 HMC Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new(self.page.title()).size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Page Section =====
        ui.label(RichText::new("📑 Page").size(14.0).strong());
        ui.add_space(8.0);
        let mut next_page = self.page;
        ComboBox::from_id_salt("page")
            .width(LABEL_WIDTH + COMBO_WIDTH)
            .selected_text(self.page.title())
            .show_ui(ui, |ui| {
                for page in Page::ALL {
                    ui.selectable_value(&mut next_page, page, page.title());
                }
            });
        if next_page != self.page {
            self.set_page(next_page);
            action = ControlPanelAction::PageChanged(next_page);
        }

        if !self.page.has_chart() {
            return action;
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Selection Section =====
        ui.label(RichText::new("🔧 Selection").size(14.0).strong());
        ui.add_space(8.0);

        let user_label = if self.page == Page::CompareUsers {
            "User 1:"
        } else {
            "User:"
        };
        if let Some(user) = self.user_combo(ui, "user", user_label, &self.selection.user) {
            self.selection.user = user;
            action = ControlPanelAction::SelectorChanged(Selector::User);
        }

        if self.page == Page::CompareUsers {
            ui.add_space(5.0);
            if let Some(user) = self.user_combo(ui, "other_user", "User 2:", &self.other_user) {
                self.other_user = user;
                action = ControlPanelAction::SelectorChanged(Selector::OtherUser);
            }
        }

        if self.page.has_view_selector() {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("View:"));
                ComboBox::from_id_salt("view")
                    .width(COMBO_WIDTH)
                    .selected_text(self.views.label_for(&self.selection.view).to_string())
                    .show_ui(ui, |ui| {
                        for view in self.views.views() {
                            let selected = self.selection.view == view.key;
                            if ui.selectable_label(selected, &view.label).clicked() && !selected {
                                self.selection.view = view.key.clone();
                                action = ControlPanelAction::SelectorChanged(Selector::View);
                            }
                        }
                    });
            });
        }

        if self.directory.file_path().is_some() {
            let (with_records, what) = match self.page.view_pair() {
                Some((view1, view2)) => (
                    self.users_for_page().len(),
                    format!(
                        "both {} and {}",
                        self.views.label_for(view1),
                        self.views.label_for(view2)
                    ),
                ),
                None => (
                    self.directory
                        .users_with_records(&[self.selection.view.as_str()])
                        .len(),
                    self.views.label_for(&self.selection.view).to_string(),
                ),
            };
            ui.add_space(5.0);
            ui.label(
                RichText::new(format!(
                    "{} of {} users have {} records",
                    with_records,
                    self.directory.users().len(),
                    what
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.horizontal(|ui| {
            if model.spinner_visible() {
                ui.add(egui::Spinner::new().size(16.0));
            }
            if model.checkmark_visible() {
                ui.label(
                    RichText::new("✔")
                        .size(16.0)
                        .color(Color32::from_rgb(40, 167, 69)),
                );
            }
            let status_color = if model.status() == FAILURE_MESSAGE {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(model.status()).size(12.0).color(status_color));
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Save as PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
            if let Some(note) = &self.export_note {
                ui.label(RichText::new(note).size(11.0).color(Color32::GRAY));
            }
        });

        action
    }

    /// User combo for the current page. Returns the newly chosen id.
    fn user_combo(
        &self,
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        current: &str,
    ) -> Option<String> {
        let mut chosen = None;
        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(COMBO_WIDTH)
                .selected_text(self.slug(current).to_string())
                .show_ui(ui, |ui| {
                    for user in self.users_for_page() {
                        let mut text = RichText::new(&user.slug);
                        if self.page.has_view_selector()
                            && self.directory.lacks_records(&user.full_id, &self.selection.view)
                        {
                            text = text.color(Color32::GRAY);
                        }
                        let selected = current == user.full_id;
                        if ui
                            .selectable_label(selected, text)
                            .on_hover_text(&user.full_id)
                            .clicked()
                            && !selected
                        {
                            chosen = Some(user.full_id.clone());
                        }
                    }
                });
        });
        chosen
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    PageChanged(Page),
    SelectorChanged(Selector),
    ExportPng,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, counts: &[(&str, i64)]) -> UserEntry {
        let mut user = UserEntry::new(id);
        for (view, n) in counts {
            user.record_counts.insert(view.to_string(), *n);
        }
        user
    }

    fn panel(user: &str, view: &str) -> ControlPanel {
        let directory = UserDirectory::from_entries(vec![
            entry("demo-user-1", &[("sleep", 300), ("heart_rate", 2000), ("stress", 0)]),
            entry("0123456789abcdef0123", &[("sleep", 12), ("heart_rate", 150), ("stress", 40)]),
        ]);
        ControlPanel::new(Selection::new(user, view), directory, ViewCatalog::default())
    }

    #[test]
    fn caption_uses_slug_and_view_label() {
        let panel = panel("0123456789abcdef0123", "heart_rate");
        assert_eq!(panel.selection_caption(), "0123456 BPM");
        assert_eq!(panel.selection().view, "heart_rate");
    }

    #[test]
    fn pair_page_lists_only_users_with_both_views() {
        let mut panel = panel("demo-user-1", "sleep");
        assert_eq!(panel.users_for_page().len(), 2);

        panel.set_page(Page::BpmStress);
        let ids: Vec<&str> = panel
            .users_for_page()
            .iter()
            .map(|u| u.full_id.as_str())
            .collect();
        assert_eq!(ids, vec!["0123456789abcdef0123"]);
        // demo-user-1 has no stress records, so the listed user takes over.
        assert_eq!(panel.selection().user, "0123456789abcdef0123");
        assert_eq!(
            panel.request(),
            Some(PlotRequest::pair("0123456789abcdef0123", "heart_rate", "stress"))
        );
        assert_eq!(panel.selection_caption(), "0123456 BPM + Stress");
    }

    #[test]
    fn pair_page_keeps_a_listed_user() {
        let mut panel = panel("demo-user-1", "sleep");
        panel.set_page(Page::SleepBpm);
        assert_eq!(panel.selection().user, "demo-user-1");
        assert_eq!(
            panel.request(),
            Some(PlotRequest::pair("demo-user-1", "sleep", "heart_rate"))
        );
    }

    #[test]
    fn comparison_defaults_to_another_user() {
        let mut panel = panel("demo-user-1", "sleep");
        panel.set_page(Page::CompareUsers);
        assert_eq!(
            panel.request(),
            Some(PlotRequest::comparison("demo-user-1", "0123456789abcdef0123", "sleep"))
        );
        assert_eq!(panel.selection_caption(), "demo-user-1 vs 0123456 Sleep");

        panel.set_page(Page::Summary);
        assert_eq!(panel.request(), None);
        assert_eq!(panel.summary.rows.len(), 2);
    }
}
