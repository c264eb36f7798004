/*!
 * Provider implementations for the translation service.
 *
 * Both supported services speak the OpenAI chat-completions protocol:
 * - OpenRouter: hosted router in front of many models
 * - Groq: low-latency hosted inference
 *
 * A mock provider with scripted behavior is available for tests.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub mod mock;
pub mod openai_compat;

pub use openai_compat::{ChatMessage, ChatRequest, ChatResponse, OpenAiCompatible};

/// Common trait for all chat providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Model requests are sent to
    fn model(&self) -> &str;

    /// Complete a chat request
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<ChatResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = ChatRequest::new(self.model(), 1).add_message("user", "Hello");
        self.complete(request).await.map(|_| ())
    }
}
