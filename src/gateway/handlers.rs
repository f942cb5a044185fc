use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{instrument, warn};

use super::dto::{AnalyzeRequest, AnalyzeSuccess};
use super::errors::GatewayError;
use super::{services, ANALYZE_PATH};
use crate::state::AppState;

// 10 MiB image grows by a third once base64-encoded.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route(
            ANALYZE_PATH,
            post(analyze_nutrition)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// POST /functions/v1/analyze-nutrition { image: "data:image/...;base64,..." }
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn analyze_nutrition(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalyzeSuccess>, GatewayError> {
    let req: AnalyzeRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "request body is not valid JSON");
        GatewayError::InvalidBody
    })?;

    let Some(image) = req.image.filter(|i| !i.is_empty()) else {
        warn!("request without image");
        return Err(GatewayError::MissingImage);
    };

    let data = services::analyze_image(&state, &image).await?;
    Ok(Json(AnalyzeSuccess::new(data)))
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}
