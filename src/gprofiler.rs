//! Blocking HTTP client for the g:Profiler REST API
//!
//! It is shared by [`GConvertMapper`](crate::mapping::GConvertMapper) and
//! [`GProfilerEngine`](crate::engine::GProfilerEngine).

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{GoError, GoResult};

/// Public g:Profiler instance
pub const DEFAULT_BASE_URL: &str = "https://biit.cs.ut.ee/gprofiler";

/// Default timeout of a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Reasons a request to g:Profiler can fail
#[derive(Debug)]
pub(crate) enum HttpFailure {
    /// Connection refused, DNS failure, timeout or a 5xx response
    Unreachable(String),
    /// The service rejected the request with a 4xx response
    Rejected(StatusCode, String),
    /// The response body does not have the expected shape
    Malformed(String),
}

impl HttpFailure {
    /// Connection problems become [`GoError::ServiceUnavailable`],
    /// everything else is passed to `other`
    pub(crate) fn into_error<F: FnOnce(String) -> GoError>(self, other: F) -> GoError {
        match self {
            HttpFailure::Unreachable(msg) => GoError::ServiceUnavailable(msg),
            HttpFailure::Rejected(status, body) => {
                other(format!("g:Profiler rejected the request (status={status}): {body}"))
            }
            HttpFailure::Malformed(msg) => other(format!("malformed g:Profiler response: {msg}")),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GProfilerClient {
    client: Client,
    base_url: String,
}

impl GProfilerClient {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> GoResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("goenrich/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| GoError::Config(format!("cannot build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends `body` as JSON to `{base_url}/{path}` and deserializes the response
    pub(crate) fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, HttpFailure> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|err| HttpFailure::Unreachable(format!("{url}: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|err| HttpFailure::Unreachable(format!("{url}: {err}")))?;
        trace!("{url} responded with {status}: {} bytes", text.len());

        if status.is_server_error() {
            return Err(HttpFailure::Unreachable(format!(
                "{url} responded with {status}"
            )));
        }
        if !status.is_success() {
            return Err(HttpFailure::Rejected(status, text.trim().to_string()));
        }
        serde_json::from_str(&text).map_err(|err| HttpFailure::Malformed(err.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unreachable_is_service_unavailable() {
        let err = HttpFailure::Unreachable("connection refused".into()).into_error(GoError::Engine);
        assert!(matches!(err, GoError::ServiceUnavailable(_)));
    }

    #[test]
    fn rejected_uses_fallback() {
        let err = HttpFailure::Rejected(StatusCode::BAD_REQUEST, "unknown organism".into())
            .into_error(GoError::Engine);
        assert!(matches!(err, GoError::Engine(msg) if msg.contains("unknown organism")));
    }

    #[test]
    fn connection_refused() {
        let client = GProfilerClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let res: Result<serde_json::Value, _> = client.post_json("api/convert/convert/", &());
        assert!(matches!(res, Err(HttpFailure::Unreachable(_))));
    }
}
