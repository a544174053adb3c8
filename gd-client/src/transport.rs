use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

#[derive(Debug)]
pub enum TransportError {
    Request(reqwest::Error),
    Body(reqwest::Error),
    Unreachable(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Request(err) => write!(f, "request failed: {err}"),
            TransportError::Body(err) => write!(f, "failed to read response body: {err}"),
            TransportError::Unreachable(message) => write!(f, "server unreachable: {message}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Request(err) | TransportError::Body(err) => Some(err),
            TransportError::Unreachable(_) => None,
        }
    }
}

/// Issues the `GET` round-trips of the action path.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpReply, TransportError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn with_client(client: reqwest::Client, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpReply, TransportError> {
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(TransportError::Request)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::Body)?;
        Ok(HttpReply { status, body })
    }
}
