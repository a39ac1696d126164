//! Client module - fetching render payloads from the dashboard server

mod http;
mod payload;
mod request;

pub use http::HttpPlotSource;
pub use payload::RenderPayload;
pub use request::{PlotRequest, COMPARISON_PATH, PAIR_PATH, UPDATE_VIEW_PATH};

use thiserror::Error;

/// Why a refresh failed. Callers show one fixed message for all of these;
/// the variants exist for logs.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server returned HTTP {0}")]
    Status(u16),
    #[error("Failed to read response body: {0}")]
    Body(#[from] std::io::Error),
    #[error("Response is not valid chart JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unexpected response shape: {0}")]
    Shape(&'static str),
    #[error("Fetch worker panicked")]
    WorkerPanicked,
}

/// Something that can produce a render payload for a chart request.
///
/// Called from worker threads, so implementations must be shareable.
pub trait PlotSource: Send + Sync + 'static {
    fn fetch(&self, request: &PlotRequest) -> Result<RenderPayload, RequestError>;
}
