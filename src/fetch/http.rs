use super::{RawResponse, Transport};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};

/// Transport backed by a reqwest client.
///
/// The client carries no timeout of its own, the fetch client's race decides when to give up.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; ForkifyBot/1.0)")
            .build()?;

        Ok(Self { client })
    }
}

async fn read(response: Response) -> Result<RawResponse, FetchError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(RawResponse { status, body })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        read(response).await
    }

    async fn post_json(&self, url: &str, body: String) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        read(response).await
    }
}
