use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::data::wire::{self, TaskRequest, TaskResponse};
use crate::data::Backend;
use crate::error::ClientError;
use crate::executor::TaskWorker;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Production backend: hands out one `HttpWorker` per dispatched request.
/// The base URL is the single POST endpoint the service multiplexes on.
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpBackend {
            base_url: base_url.into(),
        }
    }
}

impl Backend for HttpBackend {
    type Worker = HttpWorker;

    fn worker(&self, request: TaskRequest) -> HttpWorker {
        HttpWorker::new(self.base_url.clone(), request)
    }
}

/// One isolated round trip: build the form, POST it, check the transport
/// status, decode the body. Owns its own client so nothing is shared with
/// other in-flight workers.
pub struct HttpWorker {
    url: String,
    request: TaskRequest,
}

impl HttpWorker {
    pub fn new(url: impl Into<String>, request: TaskRequest) -> Self {
        HttpWorker {
            url: url.into(),
            request,
        }
    }
}

impl TaskWorker for HttpWorker {
    type Output = TaskResponse;

    fn run(self) -> Result<TaskResponse, ClientError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        let response = client
            .post(&self.url)
            .form(&self.request.form_params())
            .send()
            .map_err(|err| ClientError::Transport(err.to_string()))?;

        // A non-2xx status is an error even when a body came back with it.
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        debug!(
            operation = self.request.operation(),
            bytes = body.len(),
            "response received"
        );
        wire::parse_response(&self.request, &body)
    }
}
