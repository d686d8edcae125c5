//! Vision check classification with injected analysis clients.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ai_healthcheck::{
    AnalysisError, CheckError, ImageAnalysis, ImageAnalysisFactory, NoImageAnalysis, VisualFeature,
    check_vision_endpoint_with,
};

const ENDPOINT: &str = "https://cv.azure.com";
const TIMEOUT: Duration = Duration::from_secs(10);

type Submissions = Arc<Mutex<Vec<(Vec<u8>, Vec<VisualFeature>)>>>;

/// Analysis client that returns a canned outcome and records what it was sent.
struct StubClient {
    outcome: Result<(), AnalysisError>,
    seen: Submissions,
}

impl ImageAnalysis for StubClient {
    async fn analyze(
        &self,
        image_data: &[u8],
        visual_features: &[VisualFeature],
    ) -> Result<(), AnalysisError> {
        self.seen
            .lock()
            .unwrap()
            .push((image_data.to_vec(), visual_features.to_vec()));
        self.outcome.clone()
    }
}

struct StubFactory {
    outcome: Result<(), AnalysisError>,
    created: AtomicUsize,
    seen: Submissions,
}

impl StubFactory {
    fn ok() -> Self {
        Self::with(Ok(()))
    }

    fn err(status: Option<u16>, message: &str) -> Self {
        Self::with(Err(AnalysisError::new(status, message)))
    }

    fn with(outcome: Result<(), AnalysisError>) -> Self {
        Self {
            outcome,
            created: AtomicUsize::new(0),
            seen: Submissions::default(),
        }
    }
}

impl ImageAnalysisFactory for StubFactory {
    type Client = StubClient;

    fn create(&self, endpoint: &str, api_key: &str, timeout: Duration) -> Result<StubClient, CheckError> {
        assert_eq!(endpoint, ENDPOINT);
        assert_eq!(api_key, "key");
        assert_eq!(timeout, TIMEOUT);
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(StubClient {
            outcome: self.outcome.clone(),
            seen: Arc::clone(&self.seen),
        })
    }
}

#[tokio::test]
async fn success_is_healthy() {
    let factory = StubFactory::ok();
    let res = check_vision_endpoint_with(&factory, ENDPOINT, "key", TIMEOUT, true)
        .await
        .unwrap();
    assert!(res.ok());
    assert_eq!(res.status_code(), Some(200));
    assert_eq!(res.provider(), "azure_ai_vision");
    assert_eq!(res.endpoint(), ENDPOINT);
}

#[tokio::test]
async fn error_tagged_401_is_auth_failure() {
    let factory = StubFactory::err(Some(401), "Unauthorized");
    let res = check_vision_endpoint_with(&factory, ENDPOINT, "key", TIMEOUT, true)
        .await
        .unwrap();
    assert!(!res.ok());
    assert_eq!(res.status_code(), Some(401));
    assert!(res.message().contains("401/403"));
}

#[tokio::test]
async fn error_tagged_404_hints_at_path_or_size() {
    let factory = StubFactory::err(Some(404), "Not Found");
    let res = check_vision_endpoint_with(&factory, ENDPOINT, "key", TIMEOUT, true)
        .await
        .unwrap();
    assert!(!res.ok());
    assert_eq!(res.status_code(), Some(404));
    assert!(res.message().contains("404"));
    assert!(res.message().contains("endpoint") || res.message().contains("small"));
}

#[tokio::test]
async fn error_tagged_400_is_generic_failure() {
    let factory = StubFactory::err(Some(400), "InvalidImageSize");
    let res = check_vision_endpoint_with(&factory, ENDPOINT, "key", TIMEOUT, false)
        .await
        .unwrap();
    assert!(!res.ok());
    assert_eq!(res.status_code(), Some(400));
    assert!(res.message().contains("HTTP 400"));
    assert!(res.message().contains("InvalidImageSize"));
}

#[tokio::test]
async fn untagged_error_has_unknown_status_and_truncated_text() {
    let text = format!("socket closed {}", "~".repeat(1000));
    let factory = StubFactory::err(None, &text);
    let res = check_vision_endpoint_with(&factory, ENDPOINT, "key", TIMEOUT, true)
        .await
        .unwrap();
    assert!(!res.ok());
    assert_eq!(res.status_code(), None);
    assert!(res.message().contains("HTTP unknown"));
    assert!(res.message().contains("socket closed"));
    assert_eq!(res.message().matches('~').count(), 500 - "socket closed ".len());
}

#[tokio::test]
async fn missing_parameters_never_reach_the_factory() {
    let factory = StubFactory::ok();
    for (endpoint, key) in [("", "key"), (ENDPOINT, ""), ("", "")] {
        let err = check_vision_endpoint_with(&factory, endpoint, key, TIMEOUT, true)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::MissingParameters { .. }));
    }
    assert_eq!(factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_integration_is_an_error_not_a_result() {
    let err = check_vision_endpoint_with(&NoImageAnalysis, ENDPOINT, "key", TIMEOUT, true)
        .await
        .unwrap_err();
    match err {
        CheckError::MissingDependency { guidance, .. } => assert!(guidance.contains("vision")),
        other => panic!("expected MissingDependency, got: {other}"),
    }
}

#[tokio::test]
async fn submits_png_for_caption_only() {
    let factory = StubFactory::ok();

    check_vision_endpoint_with(&factory, ENDPOINT, "key", TIMEOUT, true)
        .await
        .unwrap();
    check_vision_endpoint_with(&factory, ENDPOINT, "key", TIMEOUT, false)
        .await
        .unwrap();

    let seen = factory.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);

    let (min_size, features) = &seen[0];
    assert_eq!(&min_size[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(&min_size[16..24], &[0, 0, 0, 50, 0, 0, 0, 50]);
    assert_eq!(features, &vec![VisualFeature::Caption]);

    let (tiny, _) = &seen[1];
    assert_eq!(&tiny[16..24], &[0, 0, 0, 1, 0, 0, 0, 1]);
}
