//! Lightweight health checks for Azure OpenAI and Azure AI Vision.
//!
//! Each check sends one minimal real request and folds the outcome into a
//! [`HealthResult`]: reachable and authorized, rejected credentials, wrong
//! endpoint or deployment, or some other failure. Remote and transport
//! failures never surface as `Err`; only local misconfiguration does.
//!
//! ```no_run
//! # async fn run() -> Result<(), ai_healthcheck::CheckError> {
//! use ai_healthcheck::{DEFAULT_TIMEOUT, check_chat_endpoint};
//!
//! let res = check_chat_endpoint(
//!     "https://my-resource.openai.azure.com",
//!     "<api-key>",
//!     "2024-02-15-preview",
//!     "gpt-4o",
//!     DEFAULT_TIMEOUT,
//! )
//! .await?;
//! println!("{res}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

#[cfg(feature = "vision")]
mod azure_vision;
mod client;
mod error;
mod health;
mod openai;
mod png;
mod vision;

#[cfg(feature = "vision")]
pub use azure_vision::{AzureVisionClient, AzureVisionFactory};
pub use client::{HttpClient, RawResponse};
pub use error::CheckError;
pub use health::{AZURE_AI_VISION, AZURE_OPENAI, HealthResult};
pub use openai::{build_chat_url, check_chat_endpoint};
pub use png::{PNG_SIGNATURE, ProbeImage, encode_rgba_png};
pub use vision::{
    AnalysisError, DefaultVisionFactory, ImageAnalysis, ImageAnalysisFactory, NoImageAnalysis,
    Unavailable, VisualFeature, check_vision_endpoint, check_vision_endpoint_with,
};

// Provider-specific names for the two checks.
pub use openai::check_chat_endpoint as check_azure_openai;
pub use vision::check_vision_endpoint as check_azure_ai_vision;
pub use vision::check_vision_endpoint as check_azure_vision;

/// Timeout applied to a single check request unless the caller picks another.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
