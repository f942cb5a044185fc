use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::dto::NutritionResult;
use super::errors::{AnalyzeError, REJECTED_DEFAULT};
use super::image::SelectedImage;
use super::normalize::{classify_failure, normalize_success};
use crate::config::ClientConfig;
use crate::gateway::dto::AnalyzeRequest;

/// Anything that can turn a selected image into a nutrition estimate.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze_image(&self, image: &SelectedImage) -> Result<NutritionResult, AnalyzeError>;
}

/// HTTP client for the analyze-nutrition gateway.
#[derive(Clone)]
pub struct NutritionAnalyzer {
    http: reqwest::Client,
    config: ClientConfig,
}

impl NutritionAnalyzer {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Preflights the endpoint. Any failure means "unavailable".
    pub async fn health_check(&self) -> bool {
        let result = self
            .http
            .request(Method::OPTIONS, self.config.analyze_url())
            .bearer_auth(&self.config.anon_key)
            .send()
            .await;
        match result {
            Ok(res) => res.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }
}

#[async_trait]
impl Analyzer for NutritionAnalyzer {
    #[instrument(skip(self, image), fields(image = %image.name, size = image.size()))]
    async fn analyze_image(&self, image: &SelectedImage) -> Result<NutritionResult, AnalyzeError> {
        // Validation happens before any network traffic.
        let data_url = image.to_data_url()?;

        let response = self
            .http
            .post(self.config.analyze_url())
            .bearer_auth(&self.config.anon_key)
            .json(&AnalyzeRequest {
                image: Some(data_url),
            })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "gateway unreachable");
                AnalyzeError::Network(e)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(AnalyzeError::Network)?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), status.canonical_reason().unwrap_or(""), &body);
            warn!(%status, error = %err, "gateway returned an error");
            return Err(err);
        }

        let value: Value = serde_json::from_slice(&body)
            .map_err(|_| AnalyzeError::Rejected(REJECTED_DEFAULT.into()))?;
        normalize_success(&value)
    }
}
