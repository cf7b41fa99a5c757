use crate::sketch::error::SketchError;
use crate::sketch::model::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { ticket: u64 },
    /// Another submission is still in flight; nothing was sent.
    AlreadyPending { ticket: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Recognized {
        ticket: u64,
        annotation_ids: Vec<usize>,
        anchor: Position,
        bound_variables: Vec<String>,
    },
    RecognitionFailed {
        ticket: u64,
        error: SketchError,
    },
}

impl SessionEvent {
    pub fn ticket(&self) -> u64 {
        match self {
            Self::Recognized { ticket, .. } | Self::RecognitionFailed { ticket, .. } => *ticket,
        }
    }
}
