//! View catalog: the record types a user can be charted by.

use serde::Deserialize;

/// One selectable view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewSpec {
    /// Value sent as the `view` query parameter.
    pub key: String,
    /// Label shown in the view selector.
    pub label: String,
}

impl ViewSpec {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Ordered set of views offered by the view selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCatalog {
    views: Vec<ViewSpec>,
}

impl Default for ViewCatalog {
    fn default() -> Self {
        Self {
            views: vec![
                ViewSpec::new("sleep", "Sleep"),
                ViewSpec::new("heart_rate", "BPM"),
                ViewSpec::new("blood_oxygenation", "SpO2"),
                ViewSpec::new("stress", "Stress"),
            ],
        }
    }
}

impl ViewCatalog {
    pub fn new(views: Vec<ViewSpec>) -> Self {
        Self { views }
    }

    pub fn views(&self) -> &[ViewSpec] {
        &self.views
    }

    pub fn keys(&self) -> Vec<&str> {
        self.views.iter().map(|v| v.key.as_str()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.views.iter().any(|v| v.key == key)
    }

    /// Selector label for a view key; unknown keys are shown as-is.
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.views
            .iter()
            .find(|v| v.key == key)
            .map(|v| v.label.as_str())
            .unwrap_or(key)
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
