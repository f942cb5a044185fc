use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::dto::NutritionAnalysis;
use super::errors::GatewayError;
use super::parse::parse_analysis;
use crate::state::AppState;
use crate::vision::VisionError;

const QUOTA_ERROR_CODE: &str = "insufficient_quota";

/// One upstream call, then cleanup and validation of what came back.
#[instrument(skip(state, image), fields(analysis_id = %uuid::Uuid::new_v4()))]
pub async fn analyze_image(state: &AppState, image: &str) -> Result<NutritionAnalysis, GatewayError> {
    let Some(api_key) = state.config.openai.api_key.as_deref() else {
        error!("OPENAI_API_KEY is not set");
        return Err(GatewayError::MissingApiKey);
    };

    let content = state
        .vision
        .describe_meal(api_key, image)
        .await
        .map_err(classify_upstream)?;

    match parse_analysis(&content) {
        Ok(analysis) => {
            info!(name = %analysis.name, calories = %analysis.calories, "meal analyzed");
            Ok(analysis)
        }
        Err(e) => {
            warn!(error = %e, content = %content, "model output rejected");
            Err(e)
        }
    }
}

/// Quota exhaustion gets its own class; every other upstream failure is generic.
pub fn classify_upstream(err: VisionError) -> GatewayError {
    match err {
        VisionError::Status { body, .. } if is_quota_exhausted(&body) => GatewayError::QuotaExceeded,
        VisionError::Status { body, .. } => GatewayError::Upstream { details: body },
        VisionError::Transport(e) => GatewayError::Upstream {
            details: e.to_string(),
        },
        VisionError::MissingContent => GatewayError::InvalidUpstreamResponse,
    }
}

fn is_quota_exhausted(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/code")
                .and_then(Value::as_str)
                .map(|code| code == QUOTA_ERROR_CODE)
        })
        .unwrap_or(false)
}
