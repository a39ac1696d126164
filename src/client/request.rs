//! Chart requests: which endpoint to call and with what query.

use crate::controller::Selection;
use std::fmt;

/// Renders one user's view.
pub const UPDATE_VIEW_PATH: &str = "/update_view";
/// Renders one view for two users in stacked subplots.
pub const COMPARISON_PATH: &str = "/plot_user_comparison";
/// Renders two views of one user in stacked subplots.
pub const PAIR_PATH: &str = "/request_pair";

/// One chart the server can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotRequest {
    View(Selection),
    /// The server answers with a single plot when both users are the same.
    Comparison {
        user1: String,
        user2: String,
        view: String,
    },
    Pair {
        user: String,
        view1: String,
        view2: String,
    },
}

impl PlotRequest {
    pub fn comparison(user1: &str, user2: &str, view: &str) -> Self {
        PlotRequest::Comparison {
            user1: user1.to_string(),
            user2: user2.to_string(),
            view: view.to_string(),
        }
    }

    pub fn pair(user: &str, view1: &str, view2: &str) -> Self {
        PlotRequest::Pair {
            user: user.to_string(),
            view1: view1.to_string(),
            view2: view2.to_string(),
        }
    }

    /// Absolute endpoint path on the dashboard server.
    pub fn path(&self) -> &'static str {
        match self {
            PlotRequest::View(_) => UPDATE_VIEW_PATH,
            PlotRequest::Comparison { .. } => COMPARISON_PATH,
            PlotRequest::Pair { .. } => PAIR_PATH,
        }
    }

    /// Query parameters in the order they are sent.
    pub fn query(&self) -> Vec<(&'static str, &str)> {
        match self {
            PlotRequest::View(selection) => {
                vec![("user", &selection.user), ("view", &selection.view)]
            }
            PlotRequest::Comparison { user1, user2, view } => {
                vec![("user1", user1), ("user2", user2), ("view", view)]
            }
            PlotRequest::Pair { user, view1, view2 } => {
                vec![("user", user), ("view1", view1), ("view2", view2)]
            }
        }
    }
}

impl From<Selection> for PlotRequest {
    fn from(selection: Selection) -> Self {
        PlotRequest::View(selection)
    }
}

impl fmt::Display for PlotRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())?;
        for (i, (key, value)) in self.query().into_iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}
