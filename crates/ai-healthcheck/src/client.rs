use std::time::Duration;

use reqwest::IntoUrl;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::CheckError;

/// Status code and body text of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Shared HTTP client for the provider checks.
///
/// Wraps [`reqwest::Client`] with the provider's API-key header and a
/// per-request timeout. Transport failures are handed back as
/// [`reqwest::Error`] so each checker decides how to report them; any
/// HTTP status, success or not, comes back as a [`RawResponse`].
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client that sends `api_key` in the `key_header` header
    /// (`api-key` for Azure OpenAI, `Ocp-Apim-Subscription-Key` for
    /// Azure AI Vision) on every request. Header names are
    /// case-insensitive and are sent lowercased.
    pub fn new(key_header: &str, api_key: &str, timeout: Duration) -> Result<Self, CheckError> {
        let name = HeaderName::from_bytes(key_header.as_bytes())
            .map_err(|_| CheckError::InvalidHeaderName(key_header.to_string()))?;
        let mut key = HeaderValue::from_str(api_key).map_err(|_| CheckError::InvalidApiKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, key);

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { inner, timeout })
    }

    /// POST `body` as JSON to `url`.
    pub async fn post_json<U: IntoUrl, B: Serialize + ?Sized>(
        &self,
        url: U,
        body: &B,
    ) -> Result<RawResponse, reqwest::Error> {
        let resp = self
            .inner
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;
        Ok(Self::read_response(resp).await)
    }

    /// POST raw bytes to `url` with the given content type.
    pub async fn post_bytes<U: IntoUrl>(
        &self,
        url: U,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> Result<RawResponse, reqwest::Error> {
        let resp = self
            .inner
            .post(url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        Ok(Self::read_response(resp).await)
    }

    async fn read_response(resp: reqwest::Response) -> RawResponse {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        RawResponse { status, body }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
