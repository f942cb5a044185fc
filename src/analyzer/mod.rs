//! Client side of the flow: pick an image, send it to the gateway, show the card.

pub mod card;
pub mod client;
pub mod dto;
pub mod errors;
pub mod image;
pub mod normalize;
pub mod session;

pub use card::NutritionCard;
pub use client::{Analyzer, NutritionAnalyzer};
pub use dto::NutritionResult;
pub use errors::AnalyzeError;
pub use image::{ImageError, SelectedImage};
pub use session::{AnalysisSession, SessionError, SessionState};
