//! Shared test doubles for unit tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::{HttpClient, HttpClientError, HttpResponse};

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) method: &'static str,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) form: Option<Vec<(String, String)>>,
}

enum MockReply {
    Response(HttpResponse),
    Timeout,
}

/// Scripted [`HttpClient`]: replies are consumed in the order they were
/// queued, and every call is recorded for assertions.
pub(crate) struct MockHttpClient {
    replies: Mutex<VecDeque<MockReply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockHttpClient {
    pub(crate) fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_response(self, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Response(HttpResponse {
                status,
                body: body.to_string(),
            }));
        self
    }

    pub(crate) fn with_timeout(self) -> Self {
        self.replies.lock().unwrap().push_back(MockReply::Timeout);
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<HttpResponse, HttpClientError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Timeout) => Err(HttpClientError::Timeout),
            None => Err(HttpClientError::Transport(
                "no mock response queued".to_string(),
            )),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: "GET",
            url: url.to_string(),
            headers: headers.to_vec(),
            form: None,
        });
        self.next_reply()
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: "POST",
            url: url.to_string(),
            headers: Vec::new(),
            form: Some(form.to_vec()),
        });
        self.next_reply()
    }
}
