use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::client::HttpClient;
use crate::error::{CheckError, missing_params};
use crate::health::{AZURE_OPENAI, HealthResult, snippet};

const API_KEY_HEADER: &str = "api-key";

// --- Request body ---

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: [ChatMessage; 2],
    max_tokens: u32,
    temperature: u8,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: &'static str,
}

impl ChatRequest {
    /// One system and one user message, capped at a single deterministic token.
    fn ping() -> Self {
        Self {
            messages: [
                ChatMessage {
                    role: "system",
                    content: "health check",
                },
                ChatMessage {
                    role: "user",
                    content: "ping",
                },
            ],
            max_tokens: 1,
            temperature: 0,
        }
    }
}

/// Build the chat-completions URL for a deployment.
///
/// Accepts both the bare resource endpoint
/// (`https://res.openai.azure.com`) and one that already ends in `/openai`.
pub fn build_chat_url(endpoint: &str, api_version: &str, deployment: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with("/openai") {
        format!("{base}/deployments/{deployment}/chat/completions?api-version={api_version}")
    } else {
        format!("{base}/openai/deployments/{deployment}/chat/completions?api-version={api_version}")
    }
}

/// Health-check an Azure OpenAI chat-completions deployment.
///
/// Sends a one-token completion and classifies the reply. Only HTTP 200
/// counts as healthy; network failures and every other status produce a
/// result with `ok == false`. Returns `Err` only when a required
/// parameter is empty or the key cannot be sent as a header.
///
/// A key with control or non-ASCII characters never reaches the network:
/// it is rejected with [`CheckError::InvalidApiKey`] rather than reported
/// as a failed result.
pub async fn check_chat_endpoint(
    endpoint: &str,
    api_key: &str,
    api_version: &str,
    deployment: &str,
    timeout: Duration,
) -> Result<HealthResult, CheckError> {
    let missing = missing_params(&[
        ("endpoint", endpoint),
        ("api_key", api_key),
        ("api_version", api_version),
        ("deployment", deployment),
    ]);
    if !missing.is_empty() {
        return Err(CheckError::MissingParameters {
            service: "Azure OpenAI",
            missing,
            expected: "endpoint, api_key, api_version, deployment",
        });
    }

    let url = build_chat_url(endpoint, api_version, deployment);
    let http = HttpClient::new(API_KEY_HEADER, api_key, timeout)?;

    let resp = match http.post_json(url.as_str(), &ChatRequest::ping()).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(
                provider = AZURE_OPENAI,
                endpoint,
                error = %e,
                "Failed to reach Azure OpenAI endpoint. Verify endpoint URL, networking, and DNS."
            );
            return Ok(HealthResult::unhealthy(
                AZURE_OPENAI,
                endpoint,
                None,
                "Network/connection error. Check endpoint and connectivity.",
            ));
        }
    };

    Ok(classify_response(endpoint, resp.status, &resp.body))
}

fn classify_response(endpoint: &str, status: u16, body: &str) -> HealthResult {
    let body = snippet(body);

    match status {
        200 => {
            debug!(provider = AZURE_OPENAI, endpoint, "chat endpoint healthy");
            HealthResult::healthy(
                AZURE_OPENAI,
                endpoint,
                "Azure OpenAI reachable. Credentials and deployment appear valid.",
            )
        }
        401 | 403 => {
            let message = "Azure OpenAI authentication/permission failed (401/403). \
                           Verify API key, endpoint, api-version, and deployment name/permissions.";
            warn!(provider = AZURE_OPENAI, endpoint, status, "{message}");
            HealthResult::unhealthy(AZURE_OPENAI, endpoint, Some(status), message)
        }
        404 => {
            let message = format!(
                "Azure OpenAI returned HTTP 404 (Not Found). API key may be valid, but the endpoint/path, \
                 api-version, or deployment name is likely incorrect. Verify the endpoint format (no extra path), \
                 the api-version, and the deployment name. Response snippet: {body}"
            );
            warn!(provider = AZURE_OPENAI, endpoint, status, "{message}");
            HealthResult::unhealthy(AZURE_OPENAI, endpoint, Some(status), message)
        }
        _ => {
            let message = format!(
                "Azure OpenAI returned HTTP {status}. Verify endpoint, api-version, and deployment. \
                 Response snippet: {body}"
            );
            warn!(provider = AZURE_OPENAI, endpoint, status, "{message}");
            HealthResult::unhealthy(
                AZURE_OPENAI,
                endpoint,
                Some(status),
                format!("Non-2xx response. {message}"),
            )
        }
    }
}
