/// Failures surfaced by the sketch pipeline. None of them are fatal: a failed
/// operation leaves surface, variables and overlays as they were.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    #[error("recognition service unavailable: {reason}")]
    RecognitionUnavailable { reason: String },

    #[error("drawing surface has no area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("failed to encode drawing: {0}")]
    EncodeFailed(String),
}

impl SketchError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::RecognitionUnavailable {
            reason: reason.into(),
        }
    }
}
