use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::dto::NutritionAnalysis;
use super::errors::GatewayError;

pub const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "weight",
    "calories",
    "protein",
    "fat",
    "carbs",
    "confidence",
];

pub const NUMERIC_FIELDS: [&str; 6] = ["weight", "calories", "protein", "fat", "carbs", "confidence"];

lazy_static! {
    static ref OPEN_FENCE: Regex = Regex::new(r"^```(?i:json)?").unwrap();
    static ref CLOSE_FENCE: Regex = Regex::new(r"```$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fencing {
    /// Plain JSON, nothing stripped.
    None,
    /// Opening and closing markers both present.
    Balanced,
    /// Only one of the two markers was found; it is still stripped.
    Unbalanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleaned<'a> {
    pub body: &'a str,
    pub fencing: Fencing,
}

/// Removes Markdown code fences the model sometimes wraps its JSON in.
pub fn strip_fences(raw: &str) -> Cleaned<'_> {
    let text = raw.trim();
    let open_end = OPEN_FENCE.find(text).map(|m| m.end());
    let rest = &text[open_end.unwrap_or(0)..];
    let close_start = CLOSE_FENCE.find(rest).map(|m| m.start());
    let body = &rest[..close_start.unwrap_or(rest.len())];

    let fencing = match (open_end.is_some(), close_start.is_some()) {
        (false, false) => Fencing::None,
        (true, true) => Fencing::Balanced,
        _ => Fencing::Unbalanced,
    };
    Cleaned {
        body: body.trim(),
        fencing,
    }
}

/// Turns the model's completion text into a checked analysis.
///
/// Order of checks: JSON syntax, presence of every required key, numeric
/// fields, then `name`. Each failure keeps the raw text for diagnosis.
pub fn parse_analysis(raw: &str) -> Result<NutritionAnalysis, GatewayError> {
    let cleaned = strip_fences(raw);
    let value: Value =
        serde_json::from_str(cleaned.body).map_err(|e| GatewayError::UnparseableAnalysis {
            content: raw.to_string(),
            parse_error: e.to_string(),
        })?;
    let Value::Object(obj) = value else {
        return Err(GatewayError::UnparseableAnalysis {
            content: raw.to_string(),
            parse_error: "expected a JSON object".into(),
        });
    };

    let missing = missing_fields(&obj);
    if !missing.is_empty() {
        return Err(GatewayError::IncompleteAnalysis {
            missing,
            received: raw.to_string(),
        });
    }

    for field in NUMERIC_FIELDS {
        let finite = obj[field].as_f64().is_some_and(f64::is_finite);
        if !finite {
            return Err(GatewayError::InvalidNumeric {
                field,
                received: raw.to_string(),
            });
        }
    }
    if !obj["name"].is_string() {
        return Err(GatewayError::InvalidField {
            field: "name",
            received: raw.to_string(),
        });
    }

    serde_json::from_value(Value::Object(obj)).map_err(|e| GatewayError::UnparseableAnalysis {
        content: raw.to_string(),
        parse_error: e.to_string(),
    })
}

fn missing_fields(obj: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| !obj.contains_key(*f))
        .collect()
}
