use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// POST body: `{ "image": "data:image/...;base64,..." }`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// Model output that passed every gateway check.
///
/// Numbers are kept as the model wrote them, so `485` is echoed as `485`
/// and not `485.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionAnalysis {
    pub name: String,
    pub weight: Number,
    pub calories: Number,
    pub protein: Number,
    pub fat: Number,
    pub carbs: Number,
    pub confidence: Number,
    /// Anything else the model volunteered is handed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeSuccess {
    pub success: bool,
    pub data: NutritionAnalysis,
}

impl AnalyzeSuccess {
    pub fn new(data: NutritionAnalysis) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Stable error classes carried in `errorType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    QuotaExceeded,
    OpenaiError,
    InvalidResponse,
    NonJsonResponse,
    #[serde(other)]
    Unknown,
}

/// Failure body. Only `error` is always present.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}
