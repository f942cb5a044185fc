use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use super::dto::{ErrorBody, ErrorType};

pub const QUOTA_USER_MESSAGE: &str =
    "La cuenta de OpenAI no tiene créditos suficientes. Por favor, recarga tu cuenta en platform.openai.com";
pub const UPSTREAM_USER_MESSAGE: &str =
    "Hubo un problema con el servicio de análisis. Inténtalo de nuevo más tarde.";
pub const INVALID_RESPONSE_USER_MESSAGE: &str =
    "El servicio de análisis devolvió una respuesta que no se pudo interpretar.";

/// Every way a call to the analyze endpoint can fail.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("No image provided")]
    MissingImage,

    #[error("OpenAI API key not configured in environment variables")]
    MissingApiKey,

    #[error("Sin créditos en OpenAI")]
    QuotaExceeded,

    #[error("Error del servicio de OpenAI")]
    Upstream { details: String },

    #[error("Invalid response from OpenAI")]
    InvalidUpstreamResponse,

    #[error("Error parsing nutrition analysis")]
    UnparseableAnalysis { content: String, parse_error: String },

    #[error("Incomplete nutrition data")]
    IncompleteAnalysis {
        missing: Vec<&'static str>,
        received: String,
    },

    #[error("Invalid numeric value for {field}")]
    InvalidNumeric { field: &'static str, received: String },

    #[error("Invalid value for {field}")]
    InvalidField { field: &'static str, received: String },
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody | Self::MissingImage => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            Self::MissingApiKey
            | Self::Upstream { .. }
            | Self::InvalidUpstreamResponse
            | Self::UnparseableAnalysis { .. }
            | Self::IncompleteAnalysis { .. }
            | Self::InvalidNumeric { .. }
            | Self::InvalidField { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            Self::QuotaExceeded => Some(ErrorType::QuotaExceeded),
            Self::Upstream { .. } => Some(ErrorType::OpenaiError),
            Self::InvalidUpstreamResponse
            | Self::UnparseableAnalysis { .. }
            | Self::IncompleteAnalysis { .. }
            | Self::InvalidNumeric { .. }
            | Self::InvalidField { .. } => Some(ErrorType::InvalidResponse),
            Self::MethodNotAllowed | Self::InvalidBody | Self::MissingImage | Self::MissingApiKey => None,
        }
    }

    fn user_message(&self) -> Option<&'static str> {
        match self.error_type()? {
            ErrorType::QuotaExceeded => Some(QUOTA_USER_MESSAGE),
            ErrorType::OpenaiError => Some(UPSTREAM_USER_MESSAGE),
            _ => Some(INVALID_RESPONSE_USER_MESSAGE),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            error: self.to_string(),
            user_message: self.user_message().map(str::to_string),
            error_type: self.error_type(),
            ..Default::default()
        };
        match self {
            Self::Upstream { details } => body.details = Some(Value::String(details.clone())),
            Self::UnparseableAnalysis {
                content,
                parse_error,
            } => {
                body.details = Some(Value::String(content.clone()));
                body.parse_error = Some(parse_error.clone());
            }
            Self::IncompleteAnalysis { missing, received } => {
                body.missing = Some(missing.iter().map(|f| f.to_string()).collect());
                body.received = Some(received.clone());
            }
            Self::InvalidNumeric { received, .. } | Self::InvalidField { received, .. } => {
                body.received = Some(received.clone());
            }
            _ => {}
        }
        body
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quota_maps_to_402_with_fixed_message() {
        let err = GatewayError::QuotaExceeded;
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            serde_json::to_value(err.to_body()).unwrap(),
            json!({
                "error": "Sin créditos en OpenAI",
                "userMessage": QUOTA_USER_MESSAGE,
                "errorType": "quota_exceeded"
            })
        );
    }

    #[test]
    fn upstream_carries_raw_details() {
        let err = GatewayError::Upstream {
            details: "<html>bad gateway</html>".into(),
        };
        let body = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(body["errorType"], "openai_error");
        assert_eq!(body["details"], "<html>bad gateway</html>");
        assert_eq!(body["userMessage"], UPSTREAM_USER_MESSAGE);
    }

    #[test]
    fn incomplete_lists_missing_fields() {
        let err = GatewayError::IncompleteAnalysis {
            missing: vec!["fat", "confidence"],
            received: "{}".into(),
        };
        let body = serde_json::to_value(err.to_body()).unwrap();
        assert_eq!(body["error"], "Incomplete nutrition data");
        assert_eq!(body["missing"], json!(["fat", "confidence"]));
        assert_eq!(body["received"], "{}");
    }

    #[test]
    fn validation_errors_have_no_error_type() {
        for err in [GatewayError::MissingImage, GatewayError::MethodNotAllowed, GatewayError::MissingApiKey] {
            let body = serde_json::to_value(err.to_body()).unwrap();
            assert!(body.get("errorType").is_none());
            assert!(body.get("userMessage").is_none());
        }
        assert_eq!(GatewayError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(GatewayError::MissingApiKey.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
