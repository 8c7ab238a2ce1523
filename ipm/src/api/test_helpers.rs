//! In-memory transport double for engine and resource tests

use async_trait::async_trait;
use reqwest::Method;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::error::ApiError;
use super::transport::Transport;

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

/// Records every call and answers from a queue of canned responses.
/// An exhausted queue answers with an empty body.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Result<Vec<u8>, ApiError>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(self, body: serde_json::Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.to_string().into_bytes()));
        self
    }

    pub fn respond_empty(self) -> Self {
        self.responses.lock().unwrap().push_back(Ok(Vec::new()));
        self
    }

    pub fn respond_status(self, status: u16, message: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(ApiError::Status {
            status,
            message: message.to_string(),
        }));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, ApiError> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            body: body.and_then(|b| serde_json::from_slice(&b).ok()),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
