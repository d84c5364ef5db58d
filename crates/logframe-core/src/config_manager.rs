use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for logframe
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogframeConfig {
    /// External critique service
    #[serde(default)]
    pub ai: AiConfig,

    /// Rule thresholds and critique scoring
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Validate → simulate → compile policy
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration of the AI critique service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Critique is only attempted when enabled
    #[serde(default)]
    pub enabled: bool,

    /// Provider: "openai-compatible", "openai", "ollama" or "lmstudio"
    #[serde(default = "default_ai_provider")]
    pub provider: String,

    /// Base URL of an OpenAI-compatible endpoint (including `/v1`)
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_ai_provider(),
            base_url: None,
            model: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Thresholds used by the rule-based simulator and the critique scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Incoming edges a teacher node can take before it counts as overloaded
    #[serde(default = "default_overload_ceiling")]
    pub overload_ceiling: usize,

    /// Node count above which a block-level authority is expected
    #[serde(default = "default_authority_scale_threshold")]
    pub authority_scale_threshold: usize,

    /// Points deducted per shortcoming returned by the critique service
    #[serde(default = "default_penalty_per_shortcoming")]
    pub penalty_per_shortcoming: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            overload_ceiling: default_overload_ceiling(),
            authority_scale_threshold: default_authority_scale_threshold(),
            penalty_per_shortcoming: default_penalty_per_shortcoming(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    /// Compile the LFA even when the health status is `failure`
    #[serde(default)]
    pub compile_on_failure: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_ai_provider() -> String {
    "openai-compatible".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> usize {
    2048
}
fn default_overload_ceiling() -> usize {
    3
}
fn default_authority_scale_threshold() -> usize {
    10
}
fn default_penalty_per_shortcoming() -> u32 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

const KNOWN_PROVIDERS: &[&str] = &["openai-compatible", "openai", "ollama", "lmstudio"];
const LOG_LEVELS: &[&str] = &["off", "trace", "debug", "info", "warn", "error"];

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: LogframeConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.logframe.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading logframe configuration");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load an explicit config file, still honouring environment overrides
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::load_dotenv();
        Self::from_path_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load an explicit config file with overrides read from `env` instead
    /// of the process environment.
    pub fn from_path_with_env<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::read_toml_file(path)?;
        Self::finish_with(config, Some(path.to_path_buf()), env)
    }

    /// Wrap an in-memory configuration (validated, no environment overrides)
    pub fn from_config(config: LogframeConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn finish(config: LogframeConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::finish_with(config, config_path, |key| std::env::var(key).ok())
    }

    fn finish_with<F>(
        config: LogframeConfig,
        config_path: Option<PathBuf>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::apply_env_overrides(config, env);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Config file: {}", path.display()),
            None => info!("Config file: none (using defaults)"),
        }
        info!(
            "AI critique: {}",
            if config.ai.enabled {
                config.ai.provider.as_str()
            } else {
                "disabled"
            }
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".logframe.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .logframe.env: {}", e);
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.logframe.toml (current directory)
    /// 2. ~/.logframe/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(LogframeConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".logframe.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".logframe").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((LogframeConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<LogframeConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides<F>(mut config: LogframeConfig, env: F) -> LogframeConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = env("LOGFRAME_AI_ENABLED") {
            config.ai.enabled = enabled.to_lowercase() == "true" || enabled == "1";
        }
        if let Some(provider) = env("LOGFRAME_AI_PROVIDER") {
            config.ai.provider = provider;
        }
        if let Some(url) = env("LOGFRAME_AI_BASE_URL") {
            config.ai.base_url = Some(url);
        }
        if let Some(model) = env("LOGFRAME_AI_MODEL") {
            config.ai.model = Some(model);
        }
        if let Some(key) = env("LOGFRAME_AI_API_KEY").or_else(|| env("OPENAI_API_KEY")) {
            config.ai.api_key = Some(key);
        }

        if let Some(n) = env("LOGFRAME_OVERLOAD_CEILING").and_then(|v| v.parse().ok()) {
            config.simulation.overload_ceiling = n;
        }
        if let Some(n) = env("LOGFRAME_AUTHORITY_THRESHOLD").and_then(|v| v.parse().ok()) {
            config.simulation.authority_scale_threshold = n;
        }

        // Directive strings ("logframe_sim=debug") stay with the subscriber.
        if let Some(level) = env("RUST_LOG") {
            let level = level.trim().to_lowercase();
            if LOG_LEVELS.contains(&level.as_str()) {
                config.logging.level = level;
            }
        }

        config
    }

    /// Validate configuration
    pub fn validate_config(config: &LogframeConfig) -> Result<(), ConfigError> {
        if !KNOWN_PROVIDERS.contains(&config.ai.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid AI provider: {}. Must be one of: {}",
                config.ai.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if config.simulation.overload_ceiling == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.overload_ceiling must be at least 1".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}. Must be one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        match config.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &LogframeConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = LogframeConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
