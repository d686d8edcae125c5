/// Errors a health check returns instead of a [`HealthResult`](crate::HealthResult).
///
/// Anything the remote side does (refused connections, timeouts, non-2xx
/// statuses) is reported through the result. Only local misconfiguration
/// surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Missing required {service} parameters ({}). Verify {expected}.", .missing.join(", "))]
    MissingParameters {
        service: &'static str,
        missing: Vec<&'static str>,
        expected: &'static str,
    },
    #[error("API key contains invalid characters (non-visible ASCII)")]
    InvalidApiKey,
    #[error("Invalid HTTP header name for the API key: {0:?}")]
    InvalidHeaderName(String),
    #[error("{integration} is unavailable. {guidance}")]
    MissingDependency {
        integration: &'static str,
        guidance: &'static str,
    },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Failed to encode probe image: {0}")]
    ImageEncoding(#[from] std::io::Error),
}

/// Collect the names of required parameters that are empty.
pub(crate) fn missing_params(params: &[(&'static str, &str)]) -> Vec<&'static str> {
    params
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect()
}
