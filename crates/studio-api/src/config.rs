use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use studio_graph::GraphConfig;
use studio_tools::search::{ImageFallbackConfig, SearchSettings};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub connector: ConnectorConfig,
    pub agent: AgentConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub llm_api_key: String,
    pub tavily_api_key: Option<String>,
    pub composio_api_key: Option<String>,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model used when the request does not pick one
    pub model: String,
    /// Overrides the OpenRouter base URL
    pub base_url: Option<String>,
    pub planner_model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "openai/gpt-oss-20b:free".to_string(),
            base_url: None,
            planner_model: studio_tools::planning::DEFAULT_PLANNER_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            request_timeout_ms: 30_000,
        }
    }
}

impl LlmConfig {
    /// Turn configuration for a request, honouring the caller's model choice
    pub fn for_model(&self, model_name: Option<&str>) -> studio_types::LLMConfig {
        let model = model_name
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.model);
        studio_types::LLMConfig {
            model: model.to_string(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    pub content_chars: usize,
    pub timeout_ms: u64,
    pub image_max_urls: usize,
    pub image_target: usize,
    pub image_concurrency: usize,
    pub image_fetch_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            content_chars: 500,
            timeout_ms: 30_000,
            image_max_urls: 8,
            image_target: 4,
            image_concurrency: 4,
            image_fetch_timeout_ms: 6_000,
        }
    }
}

impl SearchConfig {
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            max_results: self.max_results,
            content_chars: self.content_chars,
            ..SearchSettings::default()
        }
    }

    pub fn image_fallback(&self) -> ImageFallbackConfig {
        ImageFallbackConfig {
            max_urls: self.image_max_urls,
            target_images: self.image_target,
            concurrency: self.image_concurrency.max(1),
            fetch_timeout: Duration::from_millis(self.image_fetch_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Overrides the Composio base URL
    pub base_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub timezone: String,
    pub max_iterations: usize,
    pub tool_timeout_ms: u64,
    pub stream_idle_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            timezone: studio_graph::prompts::DEFAULT_TIMEZONE.to_string(),
            max_iterations: 50,
            tool_timeout_ms: 30_000,
            stream_idle_timeout_ms: 30_000,
        }
    }
}

impl From<&AgentConfig> for GraphConfig {
    fn from(config: &AgentConfig) -> Self {
        GraphConfig::new()
            .with_max_iterations(config.max_iterations)
            .with_tool_timeout(Duration::from_millis(config.tool_timeout_ms))
            .with_stream_idle_timeout(Duration::from_millis(config.stream_idle_timeout_ms))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    #[default]
    Memory,
    Mongodb,
}

impl PersistenceBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistenceBackend::Memory => "memory",
            PersistenceBackend::Mongodb => "mongodb",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: PersistenceBackend,
    pub database: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::Memory,
            database: "studio".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables `STUDIO_<SECTION>__<KEY>`, e.g. `STUDIO_LLM__MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("STUDIO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.origins"),
            )
            .build()?;

        let mut cfg: Config = config.try_deserialize()?;
        cfg.secrets = Secrets::from_env(cfg.persistence.backend)?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}

impl Secrets {
    fn from_env(backend: PersistenceBackend) -> Result<Self, ConfigError> {
        let llm_api_key = optional_env("LLM_API_KEY")
            .or_else(|| optional_env("OPENROUTER_API_KEY"))
            .ok_or_else(|| {
                ConfigError::Message("LLM_API_KEY or OPENROUTER_API_KEY environment variable is required".to_string())
            })?;

        let mongodb_uri = optional_env("MONGODB_URI");
        if backend == PersistenceBackend::Mongodb && mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }

        Ok(Self {
            llm_api_key,
            tavily_api_key: optional_env("TAVILY_API_KEY"),
            composio_api_key: optional_env("COMPOSIO_API_KEY"),
            supabase_url: required_env("SUPABASE_URL")?,
            supabase_anon_key: required_env("SUPABASE_ANON_KEY")?,
            mongodb_uri,
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    optional_env(name).ok_or_else(|| ConfigError::Message(format!("{} environment variable is required", name)))
}
