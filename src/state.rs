use crate::config::AppConfig;
use crate::vision::{OpenAiVision, VisionClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub vision: Arc<dyn VisionClient>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        if config.openai.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; analyze requests will fail with a configuration error");
        }

        let vision = Arc::new(OpenAiVision::new(&config.openai)) as Arc<dyn VisionClient>;

        Ok(Self { config, vision })
    }

    pub fn from_parts(config: Arc<AppConfig>, vision: Arc<dyn VisionClient>) -> Self {
        Self { config, vision }
    }
}
