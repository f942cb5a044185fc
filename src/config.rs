use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Absent key is not a startup failure; each request answers with a 500 instead.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let openai = OpenAiConfig {
            api_key: non_empty_var("OPENAI_API_KEY"),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.into()),
        };
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            openai,
        })
    }
}

/// Where the gateway lives and the public key sent with every call.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub gateway_url: String,
    pub anon_key: String,
}

impl ClientConfig {
    pub fn new(gateway_url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let gateway_url = gateway_url.into();
        let anon_key = anon_key.into();
        if gateway_url.trim().is_empty() {
            return Err(ConfigError::Missing("MEALSCAN_GATEWAY_URL"));
        }
        if anon_key.trim().is_empty() {
            return Err(ConfigError::Missing("MEALSCAN_ANON_KEY"));
        }
        Ok(Self {
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let gateway_url =
            non_empty_var("MEALSCAN_GATEWAY_URL").ok_or(ConfigError::Missing("MEALSCAN_GATEWAY_URL"))?;
        let anon_key =
            non_empty_var("MEALSCAN_ANON_KEY").ok_or(ConfigError::Missing("MEALSCAN_ANON_KEY"))?;
        Self::new(gateway_url, anon_key)
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.gateway_url, crate::gateway::ANALYZE_PATH)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
