// Provider configuration and client construction

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::openai::{OpenAIClient, OPENAI_API_BASE, OPENROUTER_API_BASE};
use crate::traits::ChatClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    #[default]
    OpenRouter,
}

impl ProviderType {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => OPENAI_API_BASE,
            ProviderType::OpenRouter => OPENROUTER_API_BASE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub api_key: String,
    /// Overrides the provider's default base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            api_key: api_key.into(),
            base_url: None,
            request_timeout_ms: None,
        }
    }

    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenRouter,
            ..Self::openai(api_key)
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        let mut client = OpenAIClient::new(config.api_key.clone())?
            .with_base_url(config.resolved_base_url());
        if let Some(timeout_ms) = config.request_timeout_ms {
            client = client.with_request_timeout(Duration::from_millis(timeout_ms));
        }
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_is_default_provider() {
        let config: ProviderConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.provider_type(), ProviderType::OpenRouter);
        assert_eq!(config.resolved_base_url(), OPENROUTER_API_BASE);
    }

    #[test]
    fn test_base_url_override() {
        let config = ProviderConfig::openai("k").with_base_url("http://localhost:9999/v1");
        assert_eq!(config.resolved_base_url(), "http://localhost:9999/v1");
    }

    #[test]
    fn test_factory_builds_client() {
        let config = ProviderConfig::openrouter("k").with_request_timeout_ms(5_000);
        assert!(ClientFactory::create_chat_client(config).is_ok());
    }
}
