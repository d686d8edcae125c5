use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider identifier for Azure OpenAI chat completions.
pub const AZURE_OPENAI: &str = "azure_openai";
/// Provider identifier for Azure AI Vision image analysis.
pub const AZURE_AI_VISION: &str = "azure_ai_vision";

const SNIPPET_CHARS: usize = 500;

/// Outcome of a single health check.
///
/// `status_code` is `None` when no HTTP status was observed (connection
/// refused, DNS failure, timeout, or an error that carried no status).
/// `message` is a short sentence with next-step guidance for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResult {
    provider: String,
    endpoint: String,
    ok: bool,
    status_code: Option<u16>,
    message: String,
}

impl HealthResult {
    pub(crate) fn healthy(provider: &str, endpoint: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
            ok: true,
            status_code: Some(200),
            message: message.into(),
        }
    }

    pub(crate) fn unhealthy(
        provider: &str,
        endpoint: &str,
        status_code: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
            ok: false,
            status_code,
            message: message.into(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HealthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.ok { "OK" } else { "FAIL" };
        write!(f, "[{outcome}] {} {}", self.provider, self.endpoint)?;
        if let Some(status) = self.status_code {
            write!(f, " (HTTP {status})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// First 500 characters of `text`, cut on a char boundary.
pub(crate) fn snippet(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
