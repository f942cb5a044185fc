use serde::{Deserialize, Serialize};

/// Normalized outcome of one analysis, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionResult {
    pub name: String,
    pub weight: u32,   // grams
    pub calories: u32, // kcal
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub confidence: f64,

    // diabetic profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glycemic_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glycemic_load: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diabetic_friendly: Option<bool>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}
