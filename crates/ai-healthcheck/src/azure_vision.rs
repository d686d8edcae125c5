use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::client::HttpClient;
use crate::error::CheckError;
use crate::vision::{AnalysisError, ImageAnalysis, ImageAnalysisFactory, VisualFeature};

const API_KEY_HEADER: &str = "ocp-apim-subscription-key";
const ANALYZE_PATH: &str = "computervision/imageanalysis:analyze";
const API_VERSION: &str = "2024-02-01";

/// REST client for Azure AI Vision Image Analysis 4.0.
///
/// Posts raw image bytes to
/// `{endpoint}/computervision/imageanalysis:analyze?api-version=2024-02-01&features=...`
/// authenticated with the `Ocp-Apim-Subscription-Key` header.
#[derive(Debug, Clone)]
pub struct AzureVisionClient {
    http: HttpClient,
    endpoint: String,
}

// --- Error envelope ---

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ServiceError,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl AzureVisionClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, CheckError> {
        Ok(Self {
            http: HttpClient::new(API_KEY_HEADER, api_key, timeout)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// The analyze URL for the given feature set.
    pub fn analyze_url(&self, visual_features: &[VisualFeature]) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}/{ANALYZE_PATH}", self.endpoint))?;
        let features = visual_features
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut()
            .append_pair("api-version", API_VERSION)
            .append_pair("features", &features);
        Ok(url)
    }
}

impl ImageAnalysis for AzureVisionClient {
    async fn analyze(
        &self,
        image_data: &[u8],
        visual_features: &[VisualFeature],
    ) -> Result<(), AnalysisError> {
        let url = self
            .analyze_url(visual_features)
            .map_err(|e| AnalysisError::new(None, format!("Invalid endpoint URL: {e}")))?;

        let resp = self
            .http
            .post_bytes(url, "application/octet-stream", image_data.to_vec())
            .await
            .map_err(|e| AnalysisError::new(None, e.to_string()))?;

        if (200..300).contains(&resp.status) {
            return Ok(());
        }
        Err(AnalysisError::new(
            Some(resp.status),
            service_error_message(&resp.body),
        ))
    }
}

/// Render the service's `{"error": {"code", "message"}}` body as
/// `(code) message`, falling back to the raw body.
fn service_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) if !error.code.is_empty() => {
            format!("({}) {}", error.code, error.message)
        }
        Ok(ErrorEnvelope { error }) if !error.message.is_empty() => error.message,
        _ if body.trim().is_empty() => "empty response body".to_string(),
        _ => body.to_string(),
    }
}

/// Factory for [`AzureVisionClient`]; the default when the `vision`
/// feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureVisionFactory;

impl ImageAnalysisFactory for AzureVisionFactory {
    type Client = AzureVisionClient;

    fn create(&self, endpoint: &str, api_key: &str, timeout: Duration) -> Result<AzureVisionClient, CheckError> {
        AzureVisionClient::new(endpoint, api_key, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> AzureVisionClient {
        AzureVisionClient::new(endpoint, "key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn analyze_url_for_single_feature() {
        let url = client("https://cv.cognitiveservices.azure.com/")
            .analyze_url(&[VisualFeature::Caption])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://cv.cognitiveservices.azure.com/computervision/imageanalysis:analyze\
             ?api-version=2024-02-01&features=caption"
        );
    }

    #[test]
    fn analyze_url_joins_features() {
        let url = client("https://cv.cognitiveservices.azure.com")
            .analyze_url(&[VisualFeature::Tags, VisualFeature::Read])
            .unwrap();
        let features = url
            .query_pairs()
            .find(|(k, _)| k == "features")
            .map(|(_, v)| v.into_owned());
        assert_eq!(features.as_deref(), Some("tags,read"));
    }

    #[test]
    fn analyze_url_rejects_relative_endpoint() {
        assert!(client("cv.azure.com").analyze_url(&[VisualFeature::Caption]).is_err());
    }

    #[test]
    fn service_error_with_code() {
        let body = r#"{"error":{"code":"InvalidImageSize","message":"Image size is too small."}}"#;
        assert_eq!(
            service_error_message(body),
            "(InvalidImageSize) Image size is too small."
        );
    }

    #[test]
    fn service_error_falls_back_to_raw_body() {
        assert_eq!(service_error_message("Bad Request"), "Bad Request");
        assert_eq!(service_error_message(""), "empty response body");
        assert_eq!(
            service_error_message(r#"{"error":{"message":"Resource not found"}}"#),
            "Resource not found"
        );
    }

    #[test]
    fn rejects_invalid_api_key() {
        let err = AzureVisionClient::new("https://cv.azure.com", "bad\nkey", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, CheckError::InvalidApiKey));
    }
}
