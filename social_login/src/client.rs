use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout for provider calls, in seconds.
///
/// Exceeding it is reported as [`HttpClientError::Timeout`] and surfaces to
/// callers as a network failure, never as a hung request.
pub const PROVIDER_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, Clone)]
pub enum HttpClientError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),
}

/// A provider-bound HTTP response, reduced to what the OAuth2 flow needs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP transport used for token exchange, token verification and
/// profile retrieval. Injected so the flow can be exercised without network
/// access; the production implementation is [`ReqwestHttpClient`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` with optional extra headers.
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError>;

    /// POST `url` with a form-encoded body.
    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError>;
}

/// `reqwest`-backed [`HttpClient`].
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client with a bounded per-request timeout and a small idle
    /// connection pool shared across provider calls.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_REQUEST_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(32)
            .build()
            .expect("Failed to create reqwest client");
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpClientError {
    if e.is_timeout() {
        HttpClientError::Timeout
    } else {
        HttpClientError::Transport(e.to_string())
    }
}

async fn read_response(response: reqwest::Response) -> Result<HttpResponse, HttpClientError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(map_reqwest_error)?;
    Ok(HttpResponse { status, body })
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;
        read_response(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_response(response).await
    }
}
