use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{CheckError, missing_params};
use crate::health::{AZURE_AI_VISION, HealthResult, snippet};
use crate::png::ProbeImage;

/// Visual features understood by Azure AI Vision Image Analysis 4.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualFeature {
    Caption,
    DenseCaptions,
    Tags,
    Objects,
    Read,
    SmartCrops,
    People,
}

impl VisualFeature {
    /// Name used in the `features` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caption => "caption",
            Self::DenseCaptions => "denseCaptions",
            Self::Tags => "tags",
            Self::Objects => "objects",
            Self::Read => "read",
            Self::SmartCrops => "smartCrops",
            Self::People => "people",
        }
    }
}

/// Failure reported by an [`ImageAnalysis`] client.
///
/// `status` is the HTTP status when the service answered, `None` when
/// the request never got a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AnalysisError {
    pub status: Option<u16>,
    pub message: String,
}

impl AnalysisError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// A client able to submit image bytes for analysis.
pub trait ImageAnalysis: Send + Sync {
    /// Analyze `image_data` for the requested features. Only success or
    /// failure matters to the health check, so the analysis payload is
    /// discarded.
    fn analyze(
        &self,
        image_data: &[u8],
        visual_features: &[VisualFeature],
    ) -> impl std::future::Future<Output = Result<(), AnalysisError>> + Send;
}

/// Builds [`ImageAnalysis`] clients bound to an endpoint and key.
///
/// Returning [`CheckError::MissingDependency`] from `create` signals that
/// no integration is available in this build.
pub trait ImageAnalysisFactory {
    type Client: ImageAnalysis;

    fn create(&self, endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self::Client, CheckError>;
}

/// Factory used when no image-analysis integration is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImageAnalysis;

/// Client type of [`NoImageAnalysis`]; it can never be constructed.
#[derive(Debug)]
pub enum Unavailable {}

impl ImageAnalysis for Unavailable {
    async fn analyze(&self, _: &[u8], _: &[VisualFeature]) -> Result<(), AnalysisError> {
        match *self {}
    }
}

impl ImageAnalysisFactory for NoImageAnalysis {
    type Client = Unavailable;

    fn create(&self, _: &str, _: &str, _: Duration) -> Result<Unavailable, CheckError> {
        Err(CheckError::MissingDependency {
            integration: "Azure AI Vision image analysis",
            guidance: "Vision checks require the built-in REST client. Enable the `vision` feature:\n  \
                       ai-healthcheck = { version = \"0.1\", features = [\"vision\"] }\n\
                       (Alternatively pass your own ImageAnalysisFactory to check_vision_endpoint_with.)",
        })
    }
}

/// Factory used by [`check_vision_endpoint`].
#[cfg(feature = "vision")]
pub type DefaultVisionFactory = crate::azure_vision::AzureVisionFactory;
#[cfg(not(feature = "vision"))]
pub type DefaultVisionFactory = NoImageAnalysis;

/// Health-check Azure AI Vision Image Analysis with the default client.
///
/// See [`check_vision_endpoint_with`].
pub async fn check_vision_endpoint(
    endpoint: &str,
    api_key: &str,
    timeout: Duration,
    use_min_size_image: bool,
) -> Result<HealthResult, CheckError> {
    check_vision_endpoint_with(
        &DefaultVisionFactory::default(),
        endpoint,
        api_key,
        timeout,
        use_min_size_image,
    )
    .await
}

/// Health-check Azure AI Vision Image Analysis with a caller-supplied client factory.
///
/// Submits a synthetic PNG (50x50 when `use_min_size_image`, else 1x1)
/// for captioning. Any successful analysis is healthy; every analysis
/// error becomes a result with `ok == false`. Returns `Err` for empty
/// parameters or when `factory` cannot provide a client.
pub async fn check_vision_endpoint_with<F: ImageAnalysisFactory>(
    factory: &F,
    endpoint: &str,
    api_key: &str,
    timeout: Duration,
    use_min_size_image: bool,
) -> Result<HealthResult, CheckError> {
    let missing = missing_params(&[("endpoint", endpoint), ("api_key", api_key)]);
    if !missing.is_empty() {
        return Err(CheckError::MissingParameters {
            service: "Azure Vision",
            missing,
            expected: "endpoint and api_key",
        });
    }

    let image = ProbeImage::from_min_size(use_min_size_image);
    let image_bytes = image.encode()?;
    let client = factory.create(endpoint, api_key, timeout)?;

    match client.analyze(&image_bytes, &[VisualFeature::Caption]).await {
        Ok(()) => {
            debug!(provider = AZURE_AI_VISION, endpoint, ?image, "vision endpoint healthy");
            Ok(HealthResult::healthy(
                AZURE_AI_VISION,
                endpoint,
                "Azure Vision reachable. Credentials appear valid.",
            ))
        }
        Err(e) => Ok(classify_error(endpoint, &e)),
    }
}

fn classify_error(endpoint: &str, err: &AnalysisError) -> HealthResult {
    let message = match err.status {
        Some(401 | 403) => {
            "Azure Vision authentication/permission failed (401/403). Verify API key and endpoint.".to_string()
        }
        // The size hint is a heuristic observed in practice, not a documented cause.
        Some(404) => "Azure Vision returned HTTP 404 (Not Found). This often indicates an incorrect endpoint/path, \
                      or in some cases the test image may be too small for analysis. Verify the endpoint format and \
                      consider using a slightly larger image."
            .to_string(),
        status => {
            let status = status.map_or_else(|| "unknown".to_string(), |s| s.to_string());
            format!(
                "Azure AI Vision error. HTTP {status}. Details: {}",
                snippet(&err.message)
            )
        }
    };

    warn!(provider = AZURE_AI_VISION, endpoint, status = ?err.status, "{message}");
    HealthResult::unhealthy(AZURE_AI_VISION, endpoint, err.status, message)
}
