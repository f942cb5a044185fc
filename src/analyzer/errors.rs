use thiserror::Error;

use super::image::ImageError;

pub const QUOTA_MESSAGE: &str =
    "Sin créditos en OpenAI: Necesitas recargar tu cuenta en platform.openai.com para continuar usando el servicio.";
pub const NON_JSON_DEFAULT: &str = "El servicio de análisis no pudo procesar la imagen correctamente.";
pub const INVALID_RESPONSE_DEFAULT: &str = "Error en el formato de respuesta del servicio.";
pub const UPSTREAM_DEFAULT: &str = "Error del servicio de análisis. Inténtalo de nuevo más tarde.";
pub const REJECTED_DEFAULT: &str = "Error procesando la respuesta del servidor";

/// Client-side failure. `Display` is the sentence shown in the error banner.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    InvalidImage(#[from] ImageError),

    #[error("{}", QUOTA_MESSAGE)]
    QuotaExceeded,

    #[error("{0}")]
    NonJsonResponse(String),

    #[error("{0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Upstream(String),

    /// Non-OK status without a recognized `errorType`.
    #[error("{0}")]
    Server(String),

    /// OK status but `success` was not true or `data` was absent.
    #[error("{0}")]
    Rejected(String),

    #[error("Datos nutricionales incompletos recibidos del servidor")]
    IncompleteData,

    #[error("Error de conexión. Verifica tu conexión a internet.")]
    Network(#[source] reqwest::Error),
}
