use crate::sketch::error::SketchError;
use crate::sketch::messages::{SessionEvent, SubmitOutcome};
use crate::sketch::model::{Color, Point, Position};
use crate::sketch::overlay::OverlayManager;
use crate::sketch::palette::PaletteState;
use crate::sketch::placement::compute_bounds;
use crate::sketch::raster::Raster;
use crate::sketch::recognition::{RecognitionItem, RecognitionRequest, Recognizer};
use crate::sketch::surface::{StrokeEffect, StrokeSurface, DEFAULT_ERASER_SIZE, DEFAULT_STROKE_WIDTH};
use crate::sketch::typeset::TypesetHandle;
use crate::sketch::variables::VariableStore;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_ANCHOR: Position = Position::new(10.0, 200.0);

type RecognitionResult = Result<Vec<RecognitionItem>, SketchError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub width: u32,
    pub height: u32,
    pub stroke_width: u32,
    pub eraser_size: u32,
    /// Where results land when a submission carries no ink.
    pub default_anchor: Position,
}

impl SessionConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stroke_width: DEFAULT_STROKE_WIDTH,
            eraser_size: DEFAULT_ERASER_SIZE,
            default_anchor: DEFAULT_ANCHOR,
        }
    }
}

struct PendingSubmission {
    ticket: u64,
    /// The raster exactly as it was sent for recognition.
    raster: Raster,
    rx: Receiver<RecognitionResult>,
}

/// The drawing-and-overlay pipeline. Owns every piece of mutable state; the
/// only work that leaves the calling thread is the recognition request.
pub struct SketchSession {
    surface: StrokeSurface,
    palette: PaletteState,
    variables: VariableStore,
    overlays: OverlayManager,
    typesetter: TypesetHandle,
    recognizer: Arc<dyn Recognizer>,
    pending: Option<PendingSubmission>,
    next_ticket: u64,
    last_anchor: Position,
    default_anchor: Position,
}

impl SketchSession {
    pub fn new(
        config: SessionConfig,
        recognizer: Arc<dyn Recognizer>,
        typesetter: TypesetHandle,
    ) -> Self {
        tracing::info!(
            width = config.width,
            height = config.height,
            "sketch surface mounted"
        );
        Self {
            surface: StrokeSurface::with_tools(
                config.width,
                config.height,
                config.stroke_width,
                config.eraser_size,
            ),
            palette: PaletteState::default(),
            variables: VariableStore::default(),
            overlays: OverlayManager::default(),
            typesetter,
            recognizer,
            pending: None,
            next_ticket: 1,
            last_anchor: config.default_anchor,
            default_anchor: config.default_anchor,
        }
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    pub fn palette(&self) -> &PaletteState {
        &self.palette
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn typesetter(&self) -> &TypesetHandle {
        &self.typesetter
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Position the next empty-canvas result would use.
    pub fn last_anchor(&self) -> Position {
        self.last_anchor
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.surface.begin_stroke(point);
    }

    pub fn pointer_move(&mut self, point: Point) -> StrokeEffect {
        self.surface.extend_stroke(point, &self.palette)
    }

    pub fn pointer_up(&mut self) {
        self.surface.end_stroke();
    }

    pub fn pointer_leave(&mut self) {
        self.surface.end_stroke();
    }

    pub fn set_color(&mut self, color: Color) {
        self.palette.set_color(color);
    }

    pub fn toggle_eraser(&mut self) -> bool {
        self.palette.toggle_eraser()
    }

    /// Schedule a full reset for the next [`SketchSession::settle`].
    pub fn request_reset(&mut self) {
        self.palette.request_reset();
    }

    /// Carry out a requested reset. Returns whether one happened.
    pub fn settle(&mut self) -> bool {
        if !self.palette.take_reset() {
            return false;
        }
        if let Some(pending) = self.pending.take() {
            tracing::info!(
                ticket = pending.ticket,
                "discarding in-flight recognition on reset"
            );
        }
        self.surface.reset();
        self.overlays.clear_all();
        self.variables.clear();
        self.last_anchor = self.default_anchor;
        tracing::info!("sketch session reset");
        true
    }

    pub fn reposition(&mut self, id: usize, position: Position) -> bool {
        let moved = self.overlays.reposition(id, position);
        if moved {
            self.last_anchor = position;
        }
        moved
    }

    /// Send the current drawing and variables to the recognizer on a worker
    /// thread. Only one submission is in flight at a time.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SketchError> {
        if let Some(pending) = &self.pending {
            tracing::debug!(ticket = pending.ticket, "submission already pending");
            return Ok(SubmitOutcome::AlreadyPending {
                ticket: pending.ticket,
            });
        }

        let (width, height) = self.surface.size();
        if width == 0 || height == 0 {
            return Err(SketchError::EmptySurface { width, height });
        }

        let image = self.surface.export_image()?;
        let request = RecognitionRequest {
            image,
            variables: self.variables.snapshot(),
        };
        let raster = self.surface.raster().clone();
        let ticket = self.next_ticket;

        let (tx, rx) = std::sync::mpsc::channel::<RecognitionResult>();
        let recognizer = Arc::clone(&self.recognizer);
        std::thread::Builder::new()
            .name(format!("recognize-{ticket}"))
            .spawn(move || {
                let result = recognizer.recognize(&request);
                if tx.send(result).is_err() {
                    tracing::debug!(ticket, "recognition result dropped; session moved on");
                }
            })
            .map_err(|err| SketchError::unavailable(format!("spawn recognition worker: {err}")))?;

        self.next_ticket += 1;
        self.pending = Some(PendingSubmission { ticket, raster, rx });
        tracing::info!(
            ticket,
            variables = self.variables.len(),
            "submitted drawing for recognition"
        );
        Ok(SubmitOutcome::Submitted { ticket })
    }

    /// Apply a finished submission, if any, without blocking.
    pub fn pump(&mut self) -> Option<SessionEvent> {
        let received = match self.pending.as_ref()?.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(SketchError::unavailable(
                "recognition worker exited without a result",
            )),
        };
        let pending = self.pending.take()?;
        Some(self.apply(pending, received))
    }

    /// Block until the pending submission finishes or `timeout` passes.
    pub fn wait_for_submission(&mut self, timeout: Duration) -> Option<SessionEvent> {
        let received = match self.pending.as_ref()?.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(SketchError::unavailable(
                "recognition worker exited without a result",
            )),
        };
        let pending = self.pending.take()?;
        Some(self.apply(pending, received))
    }

    fn apply(&mut self, pending: PendingSubmission, result: RecognitionResult) -> SessionEvent {
        let ticket = pending.ticket;
        let items = match result {
            Ok(items) => items,
            Err(error) => {
                tracing::error!(ticket, %error, "recognition failed");
                return SessionEvent::RecognitionFailed { ticket, error };
            }
        };

        let mut bound_variables = Vec::new();
        for item in items.iter().filter(|item| item.is_assignment) {
            self.variables.upsert(item.expression.clone(), item.value.clone());
            bound_variables.push(item.expression.clone());
        }

        let bounds = compute_bounds(&pending.raster);
        let anchor = match bounds.anchor() {
            Some(anchor) => anchor,
            None => {
                tracing::warn!(ticket, "submitted drawing had no ink; using last anchor");
                self.last_anchor
            }
        };

        let annotation_ids: Vec<usize> = items
            .into_iter()
            .map(|item| self.overlays.add(item.expression, item.value, anchor))
            .collect();

        if !annotation_ids.is_empty() {
            self.last_anchor = anchor;
            self.overlays.request_typeset(&self.typesetter);
            self.surface.clear();
        }

        tracing::info!(
            ticket,
            results = annotation_ids.len(),
            assignments = bound_variables.len(),
            x = anchor.x,
            y = anchor.y,
            "recognition applied"
        );
        SessionEvent::Recognized {
            ticket,
            annotation_ids,
            anchor,
            bound_variables,
        }
    }
}
