use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::OpenAiConfig;

pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f64 = 0.1;
pub const IMAGE_DETAIL: &str = "high";

pub const NUTRITION_PROMPT: &str = r#"Analiza la comida que aparece en esta imagen y devuelve su información nutricional como un objeto JSON con exactamente esta forma:

{
  "name": "nombre concreto del plato o de los alimentos que ves",
  "weight": peso_total_estimado_en_gramos,
  "calories": calorías_totales,
  "protein": gramos_de_proteína,
  "fat": gramos_de_grasa,
  "carbs": gramos_de_carbohidratos,
  "confidence": confianza_entre_0_y_1
}

Reglas:
- Identifica todos los alimentos visibles.
- Estima el peso de la porción completa que se muestra.
- Calcula los valores a partir de las porciones visibles.
- Usa nombres precisos (por ejemplo "Ensalada César con Pollo", no solo "ensalada").
- Si hay varios alimentos, nómbralos todos y suma sus valores.
- La confianza refleja lo seguro que estás de la identificación.
- Responde solo con el JSON, sin ningún texto adicional."#;

#[derive(Debug, Error)]
pub enum VisionError {
    /// Upstream answered with a non-2xx status; `body` is kept verbatim.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream reply had no completion content")]
    MissingContent,
}

/// A vision-capable completion service that looks at one meal photo.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Returns the raw completion text for the fixed nutrition prompt.
    async fn describe_meal(&self, api_key: &str, image_data_url: &str) -> Result<String, VisionError>;
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl<'a> {
    pub url: &'a str,
    pub detail: &'static str,
}

impl<'a> ChatRequest<'a> {
    pub fn nutrition(model: &'a str, image_data_url: &'a str) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: NUTRITION_PROMPT },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url,
                            detail: IMAGE_DETAIL,
                        },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiVision {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiVision {
    pub fn new(cfg: &OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl VisionClient for OpenAiVision {
    async fn describe_meal(&self, api_key: &str, image_data_url: &str) -> Result<String, VisionError> {
        let payload = ChatRequest::nutrition(&self.model, image_data_url);
        debug!(model = %self.model, image_len = image_data_url.len(), "sending vision request");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(%status, body = %body, "vision api error");
            return Err(VisionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "vision reply is not a chat completion");
            VisionError::MissingContent
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(VisionError::MissingContent)
    }
}
