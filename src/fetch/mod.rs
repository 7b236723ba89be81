mod http;

pub use http::HttpTransport;

use crate::error::FetchError;
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network seam under the fetch client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;

    /// Issue a POST request with a JSON body and a JSON content type
    async fn post_json(&self, url: &str, body: String) -> Result<RawResponse, FetchError>;
}

/// Fetches and sends JSON, racing every request against a fixed timeout
pub struct FetchClient {
    transport: Box<dyn Transport>,
    timeout: Duration,
}

impl FetchClient {
    pub fn new(transport: Box<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Client over the reqwest transport
    pub fn http(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(Box::new(HttpTransport::new()?), timeout))
    }

    /// GET `url` and return the parsed JSON body
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!("GET {}", url);
        self.race(self.transport.get(url)).await
    }

    /// POST `payload` as JSON to `url` and return the parsed JSON body
    pub async fn send_json<P: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &P,
    ) -> Result<Value, FetchError> {
        let body = serde_json::to_string(payload)?;
        debug!("POST {} ({} bytes)", url, body.len());
        self.race(self.transport.post_json(url, body)).await
    }

    /// GET `url` and normalize the body into `T`
    pub async fn fetch_as<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        decode(self.fetch_json(url).await?)
    }

    /// POST `payload` to `url` and normalize the response body into `T`
    pub async fn send_as<P, T>(&self, url: &str, payload: &P) -> Result<T, FetchError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(self.send_json(url, payload).await?)
    }

    /// First of request and timer wins; a request that loses is dropped and its result never seen.
    async fn race<F>(&self, request: F) -> Result<Value, FetchError>
    where
        F: Future<Output = Result<RawResponse, FetchError>>,
    {
        let result = tokio::select! {
            response = request => response.and_then(interpret),
            _ = sleep(self.timeout) => Err(FetchError::Timeout(self.timeout)),
        };

        if let Err(e) = &result {
            warn!("Request failed: {}", e);
        }
        result
    }
}

fn interpret(response: RawResponse) -> Result<Value, FetchError> {
    let data: Value = serde_json::from_str(&response.body)
        .map_err(|e| FetchError::Transport(format!("malformed response body: {}", e)))?;

    if !response.is_success() {
        let message = data["message"]
            .as_str()
            .unwrap_or("Request failed")
            .to_string();
        return Err(FetchError::Http {
            status: response.status,
            message,
        });
    }

    Ok(data)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value)
        .map_err(|e| FetchError::Transport(format!("unexpected response shape: {}", e)))
}
