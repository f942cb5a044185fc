use std::mem;

use thiserror::Error;
use tracing::{debug, warn};

use super::client::Analyzer;
use super::dto::NutritionResult;
use super::errors::AnalyzeError;
use super::image::{ImageError, SelectedImage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("an analysis is already in progress")]
    Busy,
    #[error("no image selected")]
    NoImage,
    #[error("no analysis in progress")]
    NotAnalyzing,
    #[error("none of the dropped files is an image")]
    NoImageInDrop,
    #[error(transparent)]
    InvalidImage(#[from] ImageError),
}

/// Where the upload → analyze → display lifecycle currently stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    /// Chosen but not analyzed yet. `error` is set after a failed attempt.
    ImageSelected {
        image: SelectedImage,
        error: Option<String>,
    },
    Analyzing {
        image: SelectedImage,
    },
    Result {
        image: SelectedImage,
        result: NutritionResult,
    },
}

/// One user's analysis session. At most one analysis runs at a time.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: SessionState,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::ImageSelected { image, .. }
            | SessionState::Analyzing { image }
            | SessionState::Result { image, .. } => Some(image),
        }
    }

    pub fn result(&self) -> Option<&NutritionResult> {
        match &self.state {
            SessionState::Result { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::ImageSelected { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SessionState::Analyzing { .. })
    }

    /// Replaces whatever was selected; prior result and error are dropped.
    pub fn select_image(&mut self, image: SelectedImage) -> Result<(), SessionError> {
        if self.is_analyzing() {
            return Err(SessionError::Busy);
        }
        if !image.is_image() {
            return Err(ImageError::InvalidType.into());
        }
        debug!(name = %image.name, mime = %image.mime, "image selected");
        self.state = SessionState::ImageSelected { image, error: None };
        Ok(())
    }

    /// Picks the first image among dropped files.
    pub fn select_from_drop(
        &mut self,
        files: impl IntoIterator<Item = SelectedImage>,
    ) -> Result<(), SessionError> {
        let image = files
            .into_iter()
            .find(SelectedImage::is_image)
            .ok_or(SessionError::NoImageInDrop)?;
        self.select_image(image)
    }

    pub fn remove_image(&mut self) {
        self.state = SessionState::Idle;
    }

    pub fn new_analysis(&mut self) {
        self.state = SessionState::Idle;
    }

    pub fn dismiss_error(&mut self) {
        if let SessionState::ImageSelected { error, .. } = &mut self.state {
            *error = None;
        }
    }

    /// Moves to `Analyzing` and hands back the image to send.
    pub fn begin_analysis(&mut self) -> Result<SelectedImage, SessionError> {
        match mem::take(&mut self.state) {
            SessionState::ImageSelected { image, .. } => {
                self.state = SessionState::Analyzing {
                    image: image.clone(),
                };
                Ok(image)
            }
            other => {
                let err = match other {
                    SessionState::Analyzing { .. } => SessionError::Busy,
                    _ => SessionError::NoImage,
                };
                self.state = other;
                Err(err)
            }
        }
    }

    /// Stores the outcome. On failure the image stays selected for a retry.
    pub fn complete_analysis(
        &mut self,
        outcome: Result<NutritionResult, AnalyzeError>,
    ) -> Result<(), SessionError> {
        let image = match mem::take(&mut self.state) {
            SessionState::Analyzing { image } => image,
            other => {
                // the user removed the image or reset meanwhile; keep their state
                self.state = other;
                return Err(SessionError::NotAnalyzing);
            }
        };
        self.state = match outcome {
            Ok(result) => SessionState::Result { image, result },
            Err(e) => {
                warn!(error = %e, "analysis failed");
                SessionState::ImageSelected {
                    image,
                    error: Some(e.to_string()),
                }
            }
        };
        Ok(())
    }

    /// Runs one full analysis with the given analyzer.
    pub async fn analyze_with(&mut self, analyzer: &dyn Analyzer) -> Result<(), SessionError> {
        let image = self.begin_analysis()?;
        let outcome = analyzer.analyze_image(&image).await;
        self.complete_analysis(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn jpeg(name: &str) -> SelectedImage {
        SelectedImage::new(name, "image/jpeg", vec![1u8, 2, 3])
    }

    fn salad() -> NutritionResult {
        NutritionResult {
            name: "Ensalada César con Pollo".into(),
            weight: 320,
            calories: 485,
            protein: 28.0,
            fat: 22.0,
            carbs: 35.0,
            confidence: 0.9,
            glycemic_index: None,
            glycemic_load: None,
            fiber: None,
            sugar: None,
            sodium: None,
            health_score: None,
            diabetic_friendly: None,
            recommendations: vec![],
        }
    }

    struct Succeeds;

    #[async_trait]
    impl Analyzer for Succeeds {
        async fn analyze_image(&self, _image: &SelectedImage) -> Result<NutritionResult, AnalyzeError> {
            Ok(salad())
        }
    }

    struct OutOfCredit;

    #[async_trait]
    impl Analyzer for OutOfCredit {
        async fn analyze_image(&self, _image: &SelectedImage) -> Result<NutritionResult, AnalyzeError> {
            Err(AnalyzeError::QuotaExceeded)
        }
    }

    #[test]
    fn non_image_selection_leaves_state_untouched() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        let before = s.state().clone();

        let err = s
            .select_image(SelectedImage::new("doc.pdf", "application/pdf", vec![0u8]))
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidImage(ImageError::InvalidType));
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn selecting_twice_equals_selecting_once() {
        let mut once = AnalysisSession::new();
        once.select_image(jpeg("a.jpg")).unwrap();

        let mut twice = AnalysisSession::new();
        twice.select_image(jpeg("a.jpg")).unwrap();
        twice.select_image(jpeg("a.jpg")).unwrap();

        assert_eq!(once.state(), twice.state());
    }

    #[test]
    fn drop_uses_first_image_only() {
        let mut s = AnalysisSession::new();
        s.select_from_drop(vec![
            SelectedImage::new("notes.txt", "text/plain", vec![0u8]),
            jpeg("first.jpg"),
            jpeg("second.jpg"),
        ])
        .unwrap();
        assert_eq!(s.image().unwrap().name, "first.jpg");

        let err = s
            .select_from_drop(vec![SelectedImage::new("notes.txt", "text/plain", vec![0u8])])
            .unwrap_err();
        assert_eq!(err, SessionError::NoImageInDrop);
        assert_eq!(s.image().unwrap().name, "first.jpg");
    }

    #[test]
    fn analysis_requires_a_selected_image() {
        let mut s = AnalysisSession::new();
        assert_eq!(s.begin_analysis().unwrap_err(), SessionError::NoImage);
        assert_eq!(s.state(), &SessionState::Idle);
    }

    #[test]
    fn no_second_analysis_while_one_is_running() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        s.begin_analysis().unwrap();

        assert_eq!(s.begin_analysis().unwrap_err(), SessionError::Busy);
        assert_eq!(s.select_image(jpeg("b.jpg")).unwrap_err(), SessionError::Busy);
        assert!(s.is_analyzing());
    }

    #[tokio::test]
    async fn success_shows_result() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        s.analyze_with(&Succeeds).await.unwrap();

        assert_eq!(s.result().unwrap().name, "Ensalada César con Pollo");
        assert_eq!(s.error(), None);
    }

    #[tokio::test]
    async fn failure_keeps_image_for_retry() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        s.analyze_with(&OutOfCredit).await.unwrap();

        assert!(s.error().unwrap().contains("Sin créditos"));
        assert_eq!(s.image().unwrap().name, "a.jpg");
        assert!(s.result().is_none());

        // retry without re-selecting; the old error is cleared
        s.begin_analysis().unwrap();
        assert_eq!(s.error(), None);
        s.complete_analysis(Ok(salad())).unwrap();
        assert!(s.result().is_some());
    }

    #[tokio::test]
    async fn new_selection_clears_result_and_error() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        s.analyze_with(&Succeeds).await.unwrap();

        s.select_image(jpeg("b.jpg")).unwrap();
        assert!(s.result().is_none());
        assert_eq!(s.image().unwrap().name, "b.jpg");

        s.analyze_with(&OutOfCredit).await.unwrap();
        s.select_image(jpeg("c.jpg")).unwrap();
        assert_eq!(s.error(), None);
    }

    #[tokio::test]
    async fn reset_and_remove_go_idle() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        s.analyze_with(&Succeeds).await.unwrap();
        s.new_analysis();
        assert_eq!(s.state(), &SessionState::Idle);

        s.select_image(jpeg("a.jpg")).unwrap();
        s.analyze_with(&OutOfCredit).await.unwrap();
        s.remove_image();
        assert_eq!(s.state(), &SessionState::Idle);
        assert_eq!(s.error(), None);
    }

    #[test]
    fn late_completion_after_removal_is_ignored() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        s.begin_analysis().unwrap();
        s.remove_image();

        assert_eq!(s.complete_analysis(Ok(salad())).unwrap_err(), SessionError::NotAnalyzing);
        assert_eq!(s.state(), &SessionState::Idle);
    }

    #[tokio::test]
    async fn dismissing_error_keeps_image() {
        let mut s = AnalysisSession::new();
        s.select_image(jpeg("a.jpg")).unwrap();
        s.analyze_with(&OutOfCredit).await.unwrap();
        s.dismiss_error();

        assert_eq!(s.error(), None);
        assert_eq!(s.image().unwrap().name, "a.jpg");
    }
}
