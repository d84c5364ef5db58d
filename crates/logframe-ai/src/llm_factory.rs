use crate::llm_provider::*;
use crate::openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};
use anyhow::{anyhow, Result};
use logframe_core::AiConfig;
use std::sync::Arc;
use tracing::info;

/// Factory for creating LLM providers based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration
    pub fn create_from_config(config: &AiConfig) -> Result<Arc<dyn LLMProvider>> {
        if !config.enabled {
            return Err(anyhow!("AI critique is not enabled in configuration"));
        }

        let provider_name = config.provider.to_lowercase();

        let compat_config = match provider_name.as_str() {
            "ollama" => Self::local_config(
                OpenAICompatibleConfig::ollama(Self::model_or(config, "llama3.1")),
                config,
            ),
            "lmstudio" => Self::local_config(
                OpenAICompatibleConfig::lm_studio(Self::model_or(config, "local-model")),
                config,
            ),
            "openai" => Self::create_openai_config(config)?,
            "openai-compatible" => Self::create_compatible_config(config)?,
            _ => {
                return Err(anyhow!(
                    "Unsupported LLM provider: {}. Available providers: openai-compatible, openai, ollama, lmstudio",
                    provider_name
                ))
            }
        };

        info!(
            "Using {} provider with model {}",
            compat_config.provider_name, compat_config.model
        );
        Ok(Arc::new(OpenAICompatibleProvider::new(compat_config)?))
    }

    /// Generation parameters derived from the same configuration block
    pub fn generation_config(config: &AiConfig) -> GenerationConfig {
        GenerationConfig {
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
            json_mode: true,
        }
    }

    fn model_or(config: &AiConfig, default: &str) -> String {
        config.model.clone().unwrap_or_else(|| default.to_string())
    }

    /// Local servers: keep the preset URL unless one is configured
    fn local_config(mut preset: OpenAICompatibleConfig, config: &AiConfig) -> OpenAICompatibleConfig {
        if let Some(base_url) = &config.base_url {
            preset.base_url = base_url.trim_end_matches('/').to_string();
        }
        preset.api_key = config.api_key.clone();
        preset.timeout_secs = config.timeout_secs;
        preset
    }

    fn create_openai_config(config: &AiConfig) -> Result<OpenAICompatibleConfig> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                anyhow!(
                    "OpenAI API key not found. Set 'api_key' in the [ai] section \
                     or the OPENAI_API_KEY environment variable"
                )
            })?;

        let mut compat = OpenAICompatibleConfig::openai(Self::model_or(config, "gpt-4o-mini"), api_key);
        if let Some(base_url) = &config.base_url {
            compat.base_url = base_url.trim_end_matches('/').to_string();
        }
        compat.timeout_secs = config.timeout_secs;
        Ok(compat)
    }

    fn create_compatible_config(config: &AiConfig) -> Result<OpenAICompatibleConfig> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            anyhow!("openai-compatible provider requires 'base_url' in the [ai] section")
        })?;

        let mut compat = OpenAICompatibleConfig::custom(
            base_url.trim_end_matches('/').to_string(),
            Self::model_or(config, "gpt-4o-mini"),
            "openai-compatible".to_string(),
        );
        compat.api_key = config.api_key.clone();
        compat.timeout_secs = config.timeout_secs;
        Ok(compat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(provider: &str) -> AiConfig {
        AiConfig {
            enabled: true,
            provider: provider.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled_config_is_rejected() {
        let config = AiConfig::default();
        assert!(LLMProviderFactory::create_from_config(&config).is_err());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = LLMProviderFactory::create_from_config(&enabled("carrier-pigeon"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("Unsupported LLM provider"));
    }

    #[test]
    fn test_ollama_provider_uses_configured_model() {
        let mut config = enabled("ollama");
        config.model = Some("mistral".to_string());

        let provider = LLMProviderFactory::create_from_config(&config).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_compatible_provider_requires_base_url() {
        assert!(LLMProviderFactory::create_from_config(&enabled("openai-compatible")).is_err());

        let mut config = enabled("openai-compatible");
        config.base_url = Some("http://critique.local/v1/".to_string());
        let provider = LLMProviderFactory::create_from_config(&config).unwrap();
        assert_eq!(provider.provider_name(), "openai-compatible");
    }

    #[test]
    fn test_generation_config_follows_ai_section() {
        let mut config = enabled("ollama");
        config.temperature = 0.7;
        config.max_tokens = 512;

        let generation = LLMProviderFactory::generation_config(&config);
        assert_eq!(generation.temperature, 0.7);
        assert_eq!(generation.max_tokens, Some(512));
        assert!(generation.json_mode);
    }
}
