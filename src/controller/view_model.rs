//! View model for the dashboard: load indicator plus status line.

/// Status shown for every failed refresh, whatever the cause.
pub const FAILURE_MESSAGE: &str =
    "❌ An error occurred (probably a missing record, try another User or Record Type).";

/// Status shown before the first refresh completes.
pub const INITIAL_STATUS: &str = "Ready";

/// Spinner state. The checkmark is shown exactly when the spinner is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadIndicator {
    #[default]
    Idle,
    Loading,
}

/// Result of the most recently applied refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Loaded(usize),
    Failed,
}

/// Everything the control panel draws besides the selectors.
#[derive(Debug, Clone)]
pub struct ViewModel {
    indicator: LoadIndicator,
    status: String,
    last_outcome: Option<RefreshOutcome>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            indicator: LoadIndicator::Idle,
            status: INITIAL_STATUS.to_string(),
            last_outcome: None,
        }
    }
}

impl ViewModel {
    pub fn indicator(&self) -> LoadIndicator {
        self.indicator
    }

    pub fn is_loading(&self) -> bool {
        self.indicator == LoadIndicator::Loading
    }

    pub fn spinner_visible(&self) -> bool {
        self.is_loading()
    }

    pub fn checkmark_visible(&self) -> bool {
        !self.is_loading()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        self.last_outcome
    }

    pub(crate) fn begin_request(&mut self) {
        self.indicator = LoadIndicator::Loading;
    }

    pub(crate) fn finish_loaded(&mut self, record_count: usize) {
        self.status = format!("{} records loaded.", format_record_count(record_count));
        self.last_outcome = Some(RefreshOutcome::Loaded(record_count));
        self.indicator = LoadIndicator::Idle;
    }

    pub(crate) fn finish_failed(&mut self) {
        self.status = FAILURE_MESSAGE.to_string();
        self.last_outcome = Some(RefreshOutcome::Failed);
        self.indicator = LoadIndicator::Idle;
    }
}

/// Format a count with en-US thousands separators (`1200` → `1,200`).
pub fn format_record_count(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_use_thousands_separators() {
        assert_eq!(format_record_count(0), "0");
        assert_eq!(format_record_count(999), "999");
        assert_eq!(format_record_count(1000), "1,000");
        assert_eq!(format_record_count(1200), "1,200");
        assert_eq!(format_record_count(123456), "123,456");
        assert_eq!(format_record_count(1234567), "1,234,567");
    }

    #[test]
    fn starts_idle_with_checkmark() {
        let model = ViewModel::default();
        assert_eq!(model.indicator(), LoadIndicator::Idle);
        assert!(model.checkmark_visible());
        assert!(!model.spinner_visible());
        assert_eq!(model.status(), INITIAL_STATUS);
        assert_eq!(model.last_outcome(), None);
    }

    #[test]
    fn spinner_and_checkmark_toggle_together() {
        let mut model = ViewModel::default();
        model.begin_request();
        assert!(model.spinner_visible());
        assert!(!model.checkmark_visible());
        model.finish_loaded(1200);
        assert!(!model.spinner_visible());
        assert!(model.checkmark_visible());
        assert_eq!(model.status(), "1,200 records loaded.");
    }

    #[test]
    fn failure_sets_fixed_message_and_returns_idle() {
        let mut model = ViewModel::default();
        model.begin_request();
        model.finish_failed();
        assert_eq!(model.status(), FAILURE_MESSAGE);
        assert_eq!(model.indicator(), LoadIndicator::Idle);
        assert_eq!(model.last_outcome(), Some(RefreshOutcome::Failed));
    }
}
