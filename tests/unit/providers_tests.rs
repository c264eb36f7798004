/*!
 * Tests for chat provider implementations
 */

use std::sync::Arc;
use dubline::errors::ProviderError;
use dubline::providers::mock::{MockBehavior, MockProvider};
use dubline::providers::{ChatRequest, OpenAiCompatible, Provider};

fn request() -> ChatRequest {
    ChatRequest::new("mock-model", 50).add_message("user", "Translate this")
}

/// Test providers are usable behind a trait object
#[tokio::test]
async fn test_provider_asTraitObject_shouldComplete() {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::working().named("openrouter"));
    let response = provider.complete(request()).await.unwrap();
    assert_eq!(response.text(), "[openrouter] Translate this");
    assert_eq!(provider.name(), "openrouter");
}

/// Test the connection check follows provider health
#[tokio::test]
async fn test_test_connection_shouldReflectBehavior() {
    assert!(MockProvider::working().test_connection().await.is_ok());
    let err = MockProvider::failing().test_connection().await.unwrap_err();
    assert!(matches!(err, ProviderError::ApiError { status_code: 500, .. }));
}

/// Test slow providers still answer
#[tokio::test]
async fn test_slowProvider_shouldEventuallyAnswer() {
    let provider = MockProvider::new(MockBehavior::Slow { delay_ms: 20 });
    let response = provider.complete(request()).await.unwrap();
    assert!(!response.text().is_empty());
}

/// Test the HTTP client reports its identity
#[test]
fn test_openAiCompatible_shouldExposeNameAndModel() {
    let client = OpenAiCompatible::new("groq", "gsk-test", "https://api.groq.com/openai/v1", "llama3-70b-8192", 30)
        .with_header("X-Title", "dubline");
    assert_eq!(client.name(), "groq");
    assert_eq!(client.model(), "llama3-70b-8192");
}
