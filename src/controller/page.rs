//! Dashboard pages and the chart request each one issues.

use crate::client::PlotRequest;
use crate::controller::Selection;
use std::fmt;

/// One page of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    CompareUsers,
    SleepBpm,
    SleepSpo2,
    BpmStress,
    Summary,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Overview,
        Page::CompareUsers,
        Page::SleepBpm,
        Page::SleepSpo2,
        Page::BpmStress,
        Page::Summary,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "User Overview",
            Page::CompareUsers => "Compare Users",
            Page::SleepBpm => "Sleep + BPM",
            Page::SleepSpo2 => "Sleep + SpO2",
            Page::BpmStress => "BPM + Stress",
            Page::Summary => "Data Summary Statistics",
        }
    }

    /// Fixed views of a paired-view page, top subplot first.
    pub fn view_pair(self) -> Option<(&'static str, &'static str)> {
        match self {
            Page::SleepBpm => Some(("sleep", "heart_rate")),
            Page::SleepSpo2 => Some(("sleep", "blood_oxygenation")),
            Page::BpmStress => Some(("heart_rate", "stress")),
            _ => None,
        }
    }

    pub fn has_view_selector(self) -> bool {
        matches!(self, Page::Overview | Page::CompareUsers)
    }

    pub fn has_chart(self) -> bool {
        self != Page::Summary
    }

    /// Chart request for this page given the selector values. The summary
    /// page has no chart.
    pub fn request(self, selection: &Selection, other_user: &str) -> Option<PlotRequest> {
        match self {
            Page::Overview => Some(PlotRequest::View(selection.clone())),
            Page::CompareUsers => Some(PlotRequest::comparison(
                &selection.user,
                other_user,
                &selection.view,
            )),
            Page::Summary => None,
            paired => paired
                .view_pair()
                .map(|(view1, view2)| PlotRequest::pair(&selection.user, view1, view2)),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
