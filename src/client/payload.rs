//! Render payload decoding.

use crate::charts::Figure;
use crate::client::RequestError;

/// A decoded chart response, handed whole to the chart widget.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    figure: Figure,
    record_count: usize,
}

impl RenderPayload {
    /// Decode a response body, requiring `data[0].y` to be present.
    pub fn from_slice(body: &[u8]) -> Result<Self, RequestError> {
        let figure: Figure = serde_json::from_slice(body)?;
        Self::from_figure(figure)
    }

    pub fn from_figure(figure: Figure) -> Result<Self, RequestError> {
        if figure.data.is_empty() {
            return Err(RequestError::Shape("response has no traces"));
        }
        let record_count = figure
            .record_count()
            .ok_or(RequestError::Shape("first trace has no y values"))?;
        Ok(Self {
            figure,
            record_count,
        })
    }

    /// Length of the first trace's `y` sequence.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn into_figure(self) -> Figure {
        self.figure
    }
}
