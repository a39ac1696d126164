//! Controller module - selector changes to chart refreshes
//!
//! Each refresh fetches on its own worker thread and posts the outcome back
//! over a channel tagged with a generation number. The UI thread applies
//! outcomes in `poll`; anything older than the newest refresh is dropped.
//! A worker that panics still posts a failed outcome.

mod page;
mod view_model;

pub use page::Page;
pub use view_model::{
    format_record_count, LoadIndicator, RefreshOutcome, ViewModel, FAILURE_MESSAGE,
};

use crate::client::{PlotRequest, PlotSource, RenderPayload, RequestError};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// The pair of selector values driving a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub user: String,
    pub view: String,
}

impl Selection {
    pub fn new(user: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            view: view.into(),
        }
    }
}

/// Which selector fired a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    User,
    /// Second user on the comparison page.
    OtherUser,
    View,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::User => f.write_str("user"),
            Selector::OtherUser => f.write_str("other user"),
            Selector::View => f.write_str("view"),
        }
    }
}

/// The chart widget's "replace contents" operation.
pub trait ChartSink {
    fn replace_figure(&mut self, payload: RenderPayload);
}

/// Outcome posted back by a worker thread.
struct Completion {
    generation: u64,
    request: PlotRequest,
    outcome: Result<RenderPayload, RequestError>,
}

/// Drives refreshes for the selected user/view pair and owns the view model.
pub struct ViewController<S: PlotSource> {
    source: Arc<S>,
    model: ViewModel,
    generation: u64,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl<S: PlotSource> ViewController<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = channel();
        Self {
            source: Arc::new(source),
            model: ViewModel::default(),
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.model
    }

    /// Generation of the newest refresh; 0 before the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Change handler shared by every selector. `current` must be built
    /// from the values of all selectors as they are now.
    pub fn on_selector_changed(&mut self, changed: Selector, current: impl Into<PlotRequest>) -> u64 {
        let request = current.into();
        tracing::debug!(selector = %changed, %request, "Selector changed");
        self.refresh(request)
    }

    /// Start fetching the payload for `request`. Returns its generation.
    pub fn refresh(&mut self, request: impl Into<PlotRequest>) -> u64 {
        let request = request.into();
        self.generation += 1;
        let generation = self.generation;
        self.model.begin_request();
        tracing::info!(generation, %request, "Refreshing view");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| source.fetch(&request)))
                .unwrap_or(Err(RequestError::WorkerPanicked));
            let _ = tx.send(Completion {
                generation,
                request,
                outcome,
            });
        });

        generation
    }

    /// Apply any finished refreshes. Returns true if the view model changed.
    pub fn poll(&mut self, sink: &mut impl ChartSink) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            changed |= self.apply(completion, sink);
        }
        changed
    }

    /// Block until the newest refresh has been applied or `timeout` passes.
    /// Returns true when the controller is idle.
    pub fn wait_until_idle(&mut self, sink: &mut impl ChartSink, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        while self.model.is_loading() {
            let completion = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(completion) => completion,
                        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                            return false
                        }
                    }
                }
                None => match self.rx.recv() {
                    Ok(completion) => completion,
                    Err(_) => return false,
                },
            };
            self.apply(completion, sink);
        }
        true
    }

    fn apply(&mut self, completion: Completion, sink: &mut impl ChartSink) -> bool {
        let Completion {
            generation,
            request,
            outcome,
        } = completion;

        if generation != self.generation {
            tracing::debug!(
                generation,
                newest = self.generation,
                %request,
                "Discarding superseded result"
            );
            return false;
        }

        match outcome {
            Ok(payload) => {
                let count = payload.record_count();
                sink.replace_figure(payload);
                self.model.finish_loaded(count);
                tracing::info!(generation, %request, records = count, "View loaded");
            }
            Err(err) => {
                self.model.finish_failed();
                tracing::warn!(generation, %request, error = %err, "View refresh failed");
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{Figure, FigureCapture};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a table keyed by user; unknown users get HTTP 404.
    /// Requests for users listed in `gated` block until released.
    #[derive(Default)]
    struct FakeSource {
        records: HashMap<String, usize>,
        requests: Mutex<Vec<PlotRequest>>,
        gate: Mutex<Option<Receiver<()>>>,
        gated: Vec<String>,
    }

    impl FakeSource {
        fn with_user(mut self, user: &str, records: usize) -> Self {
            self.records.insert(user.to_string(), records);
            self
        }

        fn gated_on(mut self, user: &str) -> (Self, Sender<()>) {
            let (tx, rx) = channel();
            self.gated.push(user.to_string());
            self.gate = Mutex::new(Some(rx));
            (self, tx)
        }
    }

    impl PlotSource for FakeSource {
        fn fetch(&self, request: &PlotRequest) -> Result<RenderPayload, RequestError> {
            self.requests.lock().unwrap().push(request.clone());
            let user = request.query()[0].1.to_string();
            if self.gated.contains(&user) {
                if let Some(gate) = self.gate.lock().unwrap().take() {
                    let _ = gate.recv();
                }
            }
            let records = *self
                .records
                .get(&user)
                .ok_or(RequestError::Status(404))?;
            let figure: Figure = serde_json::from_value(json!({
                "data": [{"y": vec![1; records], "name": user}]
            }))
            .unwrap();
            RenderPayload::from_figure(figure)
        }
    }

    const WAIT: Option<Duration> = Some(Duration::from_secs(5));

    #[test]
    fn successful_refresh_reports_formatted_count() {
        let mut controller = ViewController::new(FakeSource::default().with_user("alice", 1200));
        let mut capture = FigureCapture::default();

        controller.refresh(Selection::new("alice", "weekly"));
        assert!(controller.wait_until_idle(&mut capture, WAIT));

        assert_eq!(controller.view_model().status(), "1,200 records loaded.");
        assert_eq!(
            controller.view_model().last_outcome(),
            Some(RefreshOutcome::Loaded(1200))
        );
        assert_eq!(capture.replacements(), 1);
        assert_eq!(capture.figure().unwrap().record_count(), Some(1200));
    }

    #[test]
    fn failed_refresh_shows_fixed_message_and_keeps_chart() {
        let mut controller = ViewController::new(FakeSource::default());
        let mut capture = FigureCapture::default();

        controller.refresh(Selection::new("ghost", "sleep"));
        assert!(controller.wait_until_idle(&mut capture, WAIT));

        assert_eq!(controller.view_model().status(), FAILURE_MESSAGE);
        assert_eq!(controller.view_model().indicator(), LoadIndicator::Idle);
        assert_eq!(capture.replacements(), 0);
    }

    #[test]
    fn indicator_is_loading_until_completion_is_applied() {
        let (source, release) = FakeSource::default().with_user("alice", 3).gated_on("alice");
        let mut controller = ViewController::new(source);
        let mut capture = FigureCapture::default();

        assert!(controller.view_model().checkmark_visible());
        controller.refresh(Selection::new("alice", "sleep"));
        assert!(controller.view_model().spinner_visible());
        assert!(!controller.view_model().checkmark_visible());

        assert!(!controller.poll(&mut capture));
        assert!(controller.view_model().is_loading());
        assert!(!controller.wait_until_idle(&mut capture, Some(Duration::from_millis(20))));

        release.send(()).unwrap();
        assert!(controller.wait_until_idle(&mut capture, WAIT));
        assert!(controller.view_model().checkmark_visible());
        assert_eq!(controller.view_model().status(), "3 records loaded.");
    }

    #[test]
    fn both_selectors_issue_identical_requests() {
        let mut controller = ViewController::new(FakeSource::default().with_user("alice", 1));
        let mut capture = FigureCapture::default();

        controller.on_selector_changed(Selector::User, Selection::new("alice", "stress"));
        controller.wait_until_idle(&mut capture, WAIT);
        let after_user = controller.view_model().status().to_string();

        controller.on_selector_changed(Selector::View, Selection::new("alice", "stress"));
        controller.wait_until_idle(&mut capture, WAIT);

        let requests = controller.source.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
        assert_eq!(controller.view_model().status(), after_user);
    }

    #[test]
    fn superseded_result_never_overwrites_newest() {
        let mut controller = ViewController::new(
            FakeSource::default()
                .with_user("old", 5)
                .with_user("new", 7),
        );
        let mut capture = FigureCapture::default();

        let first = controller.refresh(Selection::new("old", "sleep"));
        let second = controller.refresh(Selection::new("new", "sleep"));
        assert!(second > first);

        // Newest result lands first, then the stale one arrives.
        let newest = Completion {
            generation: second,
            request: Selection::new("new", "sleep").into(),
            outcome: controller.source.fetch(&Selection::new("new", "sleep").into()),
        };
        assert!(controller.apply(newest, &mut capture));
        let stale = Completion {
            generation: first,
            request: Selection::new("old", "sleep").into(),
            outcome: Err(RequestError::Status(500)),
        };
        assert!(!controller.apply(stale, &mut capture));

        assert_eq!(controller.view_model().status(), "7 records loaded.");
        assert_eq!(capture.replacements(), 1);
    }

    #[test]
    fn stays_loading_while_newest_refresh_is_outstanding() {
        let (source, release) = FakeSource::default()
            .with_user("fast", 1)
            .with_user("slow", 2)
            .gated_on("slow");
        let mut controller = ViewController::new(source);
        let mut capture = FigureCapture::default();

        controller.refresh(Selection::new("fast", "sleep"));
        controller.refresh(Selection::new("slow", "sleep"));

        // The older refresh finishes but is dropped; the spinner stays up.
        thread::sleep(Duration::from_millis(50));
        controller.poll(&mut capture);
        assert!(controller.view_model().is_loading());
        assert_eq!(capture.replacements(), 0);

        release.send(()).unwrap();
        assert!(controller.wait_until_idle(&mut capture, WAIT));
        assert_eq!(controller.view_model().status(), "2 records loaded.");
        assert_eq!(capture.replacements(), 1);
    }

    struct PanickingSource;

    impl PlotSource for PanickingSource {
        fn fetch(&self, _request: &PlotRequest) -> Result<RenderPayload, RequestError> {
            panic!("source blew up");
        }
    }

    #[test]
    fn panicking_fetch_still_returns_to_idle() {
        let mut controller = ViewController::new(PanickingSource);
        let mut capture = FigureCapture::default();

        controller.refresh(Selection::new("alice", "sleep"));
        assert!(controller.wait_until_idle(&mut capture, WAIT));

        assert_eq!(controller.view_model().indicator(), LoadIndicator::Idle);
        assert_eq!(controller.view_model().status(), FAILURE_MESSAGE);
        assert_eq!(
            controller.view_model().last_outcome(),
            Some(RefreshOutcome::Failed)
        );
        assert_eq!(capture.replacements(), 0);
    }

    #[test]
    fn page_requests_go_through_the_same_pipeline() {
        let mut controller = ViewController::new(FakeSource::default().with_user("alice", 4));
        let mut capture = FigureCapture::default();

        controller.on_selector_changed(
            Selector::OtherUser,
            PlotRequest::comparison("alice", "bob", "sleep"),
        );
        assert!(controller.wait_until_idle(&mut capture, WAIT));
        assert_eq!(controller.view_model().status(), "4 records loaded.");

        controller.refresh(PlotRequest::pair("alice", "heart_rate", "stress"));
        assert!(controller.wait_until_idle(&mut capture, WAIT));

        let requests = controller.source.requests.lock().unwrap().clone();
        assert_eq!(requests[0].path(), "/plot_user_comparison");
        assert_eq!(requests[1].path(), "/request_pair");
        assert_eq!(capture.replacements(), 2);
    }
}
