//! Text generation with a fixed fallback.

use policydraft_config::AppConfig;
use policydraft_core::message::Message;
use policydraft_core::outcome::Outcome;
use policydraft_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompt::FALLBACK_CONTENT;

/// Sends prompts to the text-generation collaborator.
///
/// Never fails: a provider error yields [`Outcome::Degraded`] with
/// [`FALLBACK_CONTENT`].
pub struct Generator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl Generator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: Some(4000),
        }
    }

    /// Model and sampling settings from the `[ai]` section.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self {
            provider,
            model: config.ai.generation_model.clone(),
            temperature: config.ai.temperature,
            max_tokens: Some(config.ai.max_tokens),
        }
    }

    /// Generate a completion for `prompt` under the given system instruction.
    pub async fn generate(&self, system_message: &str, prompt: &str) -> Outcome<String> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system_message), Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            prompt_len = prompt.len(),
            "Requesting generation"
        );

        match self.provider.complete(request).await {
            Ok(response) => Outcome::success(response.message.content),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Generation failed, using fallback content");
                Outcome::degraded(FALLBACK_CONTENT.to_string(), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;

    #[tokio::test]
    async fn returns_provider_text() {
        let provider = Arc::new(ScriptedProvider::with_replies(["MEMO"]));
        let generator = Generator::new(provider.clone(), "gpt-3.5-turbo");

        let outcome = generator.generate("system", "prompt").await;
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value(), "MEMO");

        let requests = provider.completions();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-3.5-turbo");
        assert_eq!(requests[0].messages[0].content, "system");
        assert_eq!(requests[0].messages[1].content, "prompt");
        assert_eq!(requests[0].max_tokens, Some(4000));
    }

    #[tokio::test]
    async fn failure_yields_fallback() {
        let provider = Arc::new(ScriptedProvider::failing());
        let generator = Generator::new(provider, "gpt-3.5-turbo");

        let outcome = generator.generate("system", "prompt").await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value(), FALLBACK_CONTENT);
        assert!(outcome.reason().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn config_settings_are_used() {
        let provider = Arc::new(ScriptedProvider::with_replies(["ok"]));
        let mut config = AppConfig::default();
        config.ai.generation_model = "local-model".into();
        config.ai.temperature = 0.2;
        config.ai.max_tokens = 512;

        let generator = Generator::from_config(provider.clone(), &config);
        generator.generate("s", "p").await;

        let request = &provider.completions()[0];
        assert_eq!(request.model, "local-model");
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, Some(512));
    }
}
