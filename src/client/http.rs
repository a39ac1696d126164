//! HTTP plot source backed by a ureq agent.

use crate::client::{PlotRequest, PlotSource, RenderPayload, RequestError};
use std::io::{self, Read};
use std::time::Duration;
use url::Url;

/// Upper bound on a response body; a year of per-minute samples fits well below it.
const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

/// Fetches render payloads from the dashboard server, e.g.
/// `GET /update_view?user=..&view=..`.
pub struct HttpPlotSource {
    agent: ureq::Agent,
    base: Url,
}

impl HttpPlotSource {
    /// Build a source for the server at `base`. Only the connect phase has a
    /// timeout unless `read_timeout` is given.
    pub fn new(base: &Url, connect_timeout: Duration, read_timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new().timeout_connect(connect_timeout);
        if let Some(timeout) = read_timeout {
            builder = builder.timeout_read(timeout);
        }
        Self {
            agent: builder.build(),
            base: base.clone(),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Full request URL. Endpoint paths are absolute, so any path on the
    /// base URL is replaced.
    pub fn request_url(&self, request: &PlotRequest) -> Url {
        let mut url = self
            .base
            .join(request.path())
            .unwrap_or_else(|_| self.base.clone());
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in request.query() {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

impl PlotSource for HttpPlotSource {
    fn fetch(&self, request: &PlotRequest) -> Result<RenderPayload, RequestError> {
        let url = self.request_url(request);
        tracing::debug!(%url, "GET");

        let response = self
            .agent
            .request_url("GET", &url)
            .set("Accept", "application/json")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => RequestError::Status(code),
                ureq::Error::Transport(transport) => RequestError::Transport(transport.to_string()),
            })?;

        let body = read_response_bytes(response, MAX_RESPONSE_BYTES)?;
        RenderPayload::from_slice(&body)
    }
}

/// Read a response into memory, enforcing a maximum byte size.
fn read_response_bytes(response: ureq::Response, max_bytes: usize) -> Result<Vec<u8>, io::Error> {
    if let Some(length) = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok())
    {
        if length > max_bytes as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Response too large: {length} bytes"),
            ));
        }
    }
    let mut limited = response.into_reader().take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}
