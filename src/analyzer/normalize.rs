use serde_json::Value;

use super::dto::NutritionResult;
use super::errors::{
    AnalyzeError, INVALID_RESPONSE_DEFAULT, NON_JSON_DEFAULT, REJECTED_DEFAULT, UPSTREAM_DEFAULT,
};
use crate::gateway::dto::ErrorType;

/// Maps a non-OK gateway reply to the message the user will see.
///
/// Each key is read on its own, so one oddly typed field does not hide the
/// others. Only a body that is not JSON at all counts as empty.
pub fn classify_failure(status: u16, reason: &str, body: &[u8]) -> AnalyzeError {
    let body: Value =
        serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()));
    let error_type = body
        .get("errorType")
        .and_then(|t| serde_json::from_value::<ErrorType>(t.clone()).ok());
    let user_message = text_field(&body, "userMessage");

    match error_type {
        Some(ErrorType::QuotaExceeded) => AnalyzeError::QuotaExceeded,
        Some(ErrorType::NonJsonResponse) => {
            AnalyzeError::NonJsonResponse(user_message.unwrap_or_else(|| NON_JSON_DEFAULT.into()))
        }
        Some(ErrorType::InvalidResponse) => AnalyzeError::InvalidResponse(
            user_message.unwrap_or_else(|| INVALID_RESPONSE_DEFAULT.into()),
        ),
        Some(ErrorType::OpenaiError) => {
            AnalyzeError::Upstream(user_message.unwrap_or_else(|| UPSTREAM_DEFAULT.into()))
        }
        Some(ErrorType::Unknown) | None => {
            let message = user_message
                .or_else(|| text_field(&body, "error"))
                .unwrap_or_else(|| format!("Error del servidor: {} {}", status, reason));
            AnalyzeError::Server(message)
        }
    }
}

fn text_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Checks a 2xx gateway body and coerces it into a [`NutritionResult`].
pub fn normalize_success(body: &Value) -> Result<NutritionResult, AnalyzeError> {
    let success = body.get("success").and_then(Value::as_bool) == Some(true);
    let data = body.get("data").filter(|d| d.is_object());
    let Some(data) = data.filter(|_| success) else {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .unwrap_or(REJECTED_DEFAULT);
        return Err(AnalyzeError::Rejected(message.to_string()));
    };

    let name = data
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or(AnalyzeError::IncompleteData)?;
    if data.get("calories").and_then(Value::as_f64).is_none() {
        return Err(AnalyzeError::IncompleteData);
    }

    let recommendations = data
        .get("recommendations")
        .and_then(|r| serde_json::from_value::<Vec<String>>(r.clone()).ok())
        .unwrap_or_default();

    Ok(NutritionResult {
        name: name.to_string(),
        weight: whole(number(data, "weight")),
        calories: whole(number(data, "calories")),
        protein: one_decimal(number(data, "protein")),
        fat: one_decimal(number(data, "fat")),
        carbs: one_decimal(number(data, "carbs")),
        confidence: number(data, "confidence").clamp(0.0, 1.0),
        glycemic_index: optional(data, "glycemicIndex"),
        glycemic_load: optional(data, "glycemicLoad"),
        fiber: optional(data, "fiber"),
        sugar: optional(data, "sugar"),
        sodium: optional(data, "sodium"),
        health_score: optional(data, "healthScore"),
        diabetic_friendly: data.get("diabeticFriendly").and_then(Value::as_bool),
        recommendations,
    })
}

fn number(data: &Value, key: &str) -> f64 {
    data.get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn optional(data: &Value, key: &str) -> Option<f64> {
    data.get(key).and_then(Value::as_f64)
}

// Negative estimates are clamped; the model has no business returning them.
fn whole(v: f64) -> u32 {
    v.max(0.0).round() as u32
}

fn one_decimal(v: f64) -> f64 {
    (v.max(0.0) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn salad_is_normalized() {
        let body = json!({
            "success": true,
            "data": {
                "name": "Ensalada César con Pollo", "weight": 320, "calories": 485,
                "protein": 28, "fat": 22, "carbs": 35, "confidence": 0.9
            }
        });
        let r = normalize_success(&body).unwrap();
        assert_eq!(r.name, "Ensalada César con Pollo");
        assert_eq!(r.weight, 320);
        assert_eq!(r.calories, 485);
        assert_eq!(r.protein, 28.0);
        assert_eq!(r.confidence, 0.9);
        assert!(r.recommendations.is_empty());
        assert_eq!(r.glycemic_index, None);
    }

    #[test]
    fn values_are_rounded_and_defaulted() {
        let body = json!({
            "success": true,
            "data": { "name": "Tortilla", "calories": 312.6, "weight": 149.5, "protein": 12.345, "fat": 20.06 }
        });
        let r = normalize_success(&body).unwrap();
        assert_eq!(r.calories, 313);
        assert_eq!(r.weight, 150);
        assert_eq!(r.protein, 12.3);
        assert_eq!(r.fat, 20.1);
        assert_eq!(r.carbs, 0.0);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn diabetic_fields_pass_through() {
        let body = json!({
            "success": true,
            "data": {
                "name": "Avena", "calories": 150, "glycemicIndex": 55, "glycemicLoad": 13.2,
                "fiber": 4, "sugar": 1, "sodium": 2, "healthScore": 82,
                "diabeticFriendly": true, "recommendations": ["Añade frutos secos", "Evita azúcar"]
            }
        });
        let r = normalize_success(&body).unwrap();
        assert_eq!(r.glycemic_index, Some(55.0));
        assert_eq!(r.glycemic_load, Some(13.2));
        assert_eq!(r.health_score, Some(82.0));
        assert_eq!(r.diabetic_friendly, Some(true));
        assert_eq!(r.recommendations, vec!["Añade frutos secos", "Evita azúcar"]);
    }

    #[test]
    fn missing_name_or_calories_is_incomplete() {
        let no_name = json!({ "success": true, "data": { "calories": 100 } });
        assert!(matches!(normalize_success(&no_name), Err(AnalyzeError::IncompleteData)));

        let text_calories = json!({ "success": true, "data": { "name": "x", "calories": "100" } });
        assert!(matches!(normalize_success(&text_calories), Err(AnalyzeError::IncompleteData)));
        assert_eq!(
            AnalyzeError::IncompleteData.to_string(),
            "Datos nutricionales incompletos recibidos del servidor"
        );
    }

    #[test]
    fn unsuccessful_body_is_rejected() {
        let err = normalize_success(&json!({ "success": false, "error": "nope" })).unwrap_err();
        assert_eq!(err.to_string(), "nope");

        let err = normalize_success(&json!({ "success": true })).unwrap_err();
        assert_eq!(err.to_string(), REJECTED_DEFAULT);
    }

    #[test]
    fn quota_gets_fixed_message() {
        let body = r#"{"error":"Sin créditos en OpenAI","userMessage":"x","errorType":"quota_exceeded"}"#.as_bytes();
        let err = classify_failure(402, "Payment Required", body);
        assert!(matches!(err, AnalyzeError::QuotaExceeded));
        assert!(err.to_string().starts_with("Sin créditos en OpenAI"));
    }

    #[test]
    fn typed_errors_prefer_user_message() {
        let body = r#"{"error":"e","userMessage":"Inténtalo luego","errorType":"openai_error"}"#.as_bytes();
        assert_eq!(classify_failure(500, "Internal Server Error", body).to_string(), "Inténtalo luego");

        let body = br#"{"error":"e","errorType":"invalid_response"}"#;
        assert_eq!(
            classify_failure(500, "Internal Server Error", body).to_string(),
            INVALID_RESPONSE_DEFAULT
        );

        let body = br#"{"errorType":"non_json_response"}"#;
        assert_eq!(classify_failure(500, "Internal Server Error", body).to_string(), NON_JSON_DEFAULT);
    }

    #[test]
    fn untyped_errors_fall_back() {
        let body = br#"{"error":"No image provided"}"#;
        assert_eq!(classify_failure(400, "Bad Request", body).to_string(), "No image provided");

        assert_eq!(
            classify_failure(502, "Bad Gateway", b"<html>").to_string(),
            "Error del servidor: 502 Bad Gateway"
        );
    }

    #[test]
    fn oddly_typed_fields_do_not_hide_error_type() {
        let body = br#"{"error":{"message":"boom"},"errorType":"quota_exceeded"}"#;
        assert!(matches!(
            classify_failure(402, "Payment Required", body),
            AnalyzeError::QuotaExceeded
        ));

        let body = br#"{"error":null,"userMessage":"Recarga tu cuenta","errorType":"openai_error"}"#;
        assert_eq!(
            classify_failure(500, "Internal Server Error", body).to_string(),
            "Recarga tu cuenta"
        );

        let body = br#"{"error":{"code":7},"userMessage":42}"#;
        assert_eq!(
            classify_failure(500, "Internal Server Error", body).to_string(),
            "Error del servidor: 500 Internal Server Error"
        );
    }
}
