pub mod dto;
pub mod errors;
pub mod handlers;
pub mod parse;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use errors::GatewayError;

pub const ANALYZE_PATH: &str = "/functions/v1/analyze-nutrition";

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::analyze_routes())
}
