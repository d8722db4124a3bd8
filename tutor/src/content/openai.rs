//! OpenAI-compatible chat completions provider.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, trace};

use super::request::SYSTEM_PROMPT;
use super::{ContentProvider, ContentRequest, ProviderError};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat completions client implementing `ContentProvider`.
///
/// Uses `OPENAI_API_KEY` (and `OPENAI_BASE_URL` when set) by default, or config via
/// `OpenAiProvider::with_config`. Transport and API errors map to
/// `ProviderError::Unavailable`; a reply with no text maps to `ProviderError::Empty`.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiProvider {
    pub fn new(model: impl Into<String>) -> Self {
        let mut config = OpenAIConfig::new();
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            config = config.with_api_base(base);
        }
        Self::with_config(config, model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    /// Model from `TUTOR_MODEL`, else [`DEFAULT_MODEL`].
    pub fn from_env() -> Self {
        let model = std::env::var("TUTOR_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(model)
    }

    /// Lower values are more deterministic; classification benefits from ~0.2.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ContentProvider for OpenAiProvider {
    async fn generate(&self, request: &ContentRequest) -> Result<String, ProviderError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                SYSTEM_PROMPT,
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(
                request.prompt().as_str(),
            )),
        ];
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(messages);
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        let chat_request = args
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("request build failed: {e}")))?;

        debug!(model = %self.model, kind = ?request.kind(), "content request");
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| ProviderError::Unavailable(format!("OpenAI API error: {e}")))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        trace!(kind = ?request.kind(), content = %content, "content response");
        if content.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentKind;

    /// **Scenario**: with_config uses custom config and model.
    #[test]
    fn with_config_sets_model() {
        let config = OpenAIConfig::new().with_api_key("test-key");
        let p = OpenAiProvider::with_config(config, "gpt-4o").with_temperature(0.2);
        assert_eq!(p.model(), "gpt-4o");
    }

    /// **Scenario**: an unreachable endpoint surfaces as Unavailable, not as a fallback.
    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base("http://127.0.0.1:1");
        let p = OpenAiProvider::with_config(config, "gpt-4o-mini");
        let req = ContentRequest::ClassifyUnderstanding {
            concept: "c".into(),
            explanation: "e".into(),
            question: "q".into(),
            response: "r".into(),
        };
        assert_eq!(req.kind(), ContentKind::Classification);
        let err = p.generate(&req).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)), "{err:?}");
    }
}
