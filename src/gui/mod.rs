use crate::settings::Settings;
use crate::sketch::model::{Color, Point, Position};
use crate::sketch::palette::parse_swatches;
use crate::sketch::recognition::{HttpRecognizer, Recognizer};
use crate::sketch::surface::{StrokeEffect, SurfaceBackground};
use crate::sketch::typeset::{TextTypesetter, TypesetHandle};
use crate::sketch::{SessionEvent, SketchSession, SubmitOutcome};
use eframe::egui::{
    self, Color32, PointerButton, Pos2, Rect, RichText, Sense, Stroke, TextureHandle,
    TextureOptions,
};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::sync::Arc;
use std::time::Duration;

const PENDING_REPAINT: Duration = Duration::from_millis(50);
const LABEL_SIZE: f32 = 28.0;

fn to_color32(color: Color) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

/// Whole-pixel surface size for a canvas area, or `None` while it is empty.
fn mount_size(available: egui::Vec2) -> Option<(u32, u32)> {
    let width = available.x.max(0.0) as u32;
    let height = available.y.max(0.0) as u32;
    (width > 0 && height > 0).then_some((width, height))
}

/// Window shell around [`SketchSession`]: toolbar, canvas texture and
/// draggable result labels. Holds no pipeline state of its own.
pub struct SketchApp {
    settings: Settings,
    recognizer: Arc<dyn Recognizer>,
    typesetter: TypesetHandle,
    swatches: Vec<Color>,
    session: Option<SketchSession>,
    canvas_texture: Option<TextureHandle>,
    canvas_dirty: bool,
    toasts: Toasts,
}

impl SketchApp {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let recognizer = HttpRecognizer::new(&settings.api_url, settings.request_timeout())?;
        Ok(Self::with_recognizer(settings, Arc::new(recognizer)))
    }

    pub fn with_recognizer(settings: Settings, recognizer: Arc<dyn Recognizer>) -> Self {
        let swatches = parse_swatches(&settings.swatches);
        Self {
            settings,
            recognizer,
            typesetter: TypesetHandle::load_async(|| Some(TextTypesetter)),
            swatches,
            session: None,
            canvas_texture: None,
            canvas_dirty: true,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
        }
    }

    pub fn session(&self) -> Option<&SketchSession> {
        self.session.as_ref()
    }

    fn notify(&mut self, kind: ToastKind, text: String) {
        if !self.settings.enable_toasts {
            return;
        }
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default()
                .duration_in_seconds(self.settings.toast_duration as f64),
        });
    }

    /// Create the session sized to the first non-empty canvas area. Later
    /// window resizes keep the original surface size.
    fn mount(&mut self, available: egui::Vec2) {
        if self.session.is_some() {
            return;
        }
        let Some((width, height)) = mount_size(available) else {
            tracing::debug!(?available, "canvas has no area yet; deferring mount");
            return;
        };
        self.session = Some(SketchSession::new(
            self.settings.session_config(width, height),
            Arc::clone(&self.recognizer),
            self.typesetter.clone(),
        ));
        self.canvas_dirty = true;
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut submitted = None;
        ui.horizontal(|ui| {
            if ui.button("Reset").clicked() {
                tracing::debug!("reset requested from toolbar");
                session.request_reset();
            }
            let eraser_label = if session.palette().eraser_active() {
                "Stop Erasing"
            } else {
                "Eraser"
            };
            if ui.button(eraser_label).clicked() {
                session.toggle_eraser();
            }
            ui.separator();
            for color in &self.swatches {
                let selected = session.palette().color() == *color;
                let stroke = if selected {
                    Stroke::new(2.0, Color32::WHITE)
                } else {
                    Stroke::new(1.0, Color32::DARK_GRAY)
                };
                let swatch = egui::Button::new("")
                    .fill(to_color32(*color))
                    .stroke(stroke)
                    .min_size(egui::vec2(20.0, 20.0));
                if ui.add(swatch).clicked() {
                    session.set_color(*color);
                }
            }
            ui.separator();
            let run = ui.add_enabled(!session.is_pending(), egui::Button::new("Run"));
            if run.clicked() {
                submitted = Some(session.submit());
            }
            if session.is_pending() {
                ui.spinner();
            }
        });

        match submitted {
            Some(Ok(SubmitOutcome::Submitted { .. })) | None => {}
            Some(Ok(SubmitOutcome::AlreadyPending { .. })) => {
                self.notify(ToastKind::Info, "Still waiting for the last result".into());
            }
            Some(Err(err)) => {
                self.notify(ToastKind::Error, format!("Could not submit drawing: {err}"));
            }
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) -> Option<Rect> {
        let session = self.session.as_mut()?;
        let (width, height) = session.surface().size();
        let (response, painter) =
            ui.allocate_painter(egui::vec2(width as f32, height as f32), Sense::drag());
        let origin = response.rect.min;
        let to_surface = |pos: Pos2| {
            let local = pos - origin;
            Point::new(local.x.round() as i32, local.y.round() as i32)
        };

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                session.pointer_down(to_surface(pos));
            }
        }
        if response.dragged_by(PointerButton::Primary) && session.surface().is_drawing() {
            let inside = ui
                .input(|i| i.pointer.hover_pos())
                .map(|pos| response.rect.contains(pos))
                .unwrap_or(false);
            if inside {
                if let Some(pos) = response.interact_pointer_pos() {
                    if session.pointer_move(to_surface(pos)) != StrokeEffect::Ignored {
                        self.canvas_dirty = true;
                    }
                }
            } else {
                session.pointer_leave();
            }
        }
        if response.drag_stopped_by(PointerButton::Primary) {
            session.pointer_up();
        }

        if session.surface().background() == SurfaceBackground::Black {
            painter.rect_filled(response.rect, 0.0, Color32::BLACK);
        }

        let raster = session.surface().raster();
        if raster.is_zero_sized() {
            return Some(response.rect);
        }
        let size = [raster.width() as usize, raster.height() as usize];
        if self.canvas_dirty || self.canvas_texture.is_none() {
            let image = egui::ColorImage::from_rgba_unmultiplied(size, raster.pixels());
            match self.canvas_texture.as_mut() {
                Some(texture) => texture.set(image, TextureOptions::NEAREST),
                None => {
                    self.canvas_texture =
                        Some(ui.ctx().load_texture("sketch-canvas", image, TextureOptions::NEAREST))
                }
            }
            self.canvas_dirty = false;
        }
        if let Some(texture) = &self.canvas_texture {
            painter.image(
                texture.id(),
                response.rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        Some(response.rect)
    }

    fn annotations(&mut self, ctx: &egui::Context, canvas: Rect) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut moved = Vec::new();
        for annotation in session.overlays().annotations() {
            let pos = canvas.min + egui::vec2(annotation.position.x, annotation.position.y);
            let area = egui::Area::new(egui::Id::new(("sketch-annotation", annotation.id)))
                .order(egui::Order::Foreground)
                .movable(true)
                .current_pos(pos)
                .show(ctx, |ui| {
                    ui.label(
                        RichText::new(annotation.display_text())
                            .color(Color32::WHITE)
                            .size(LABEL_SIZE),
                    );
                });
            if area.response.dragged() || area.response.drag_stopped() {
                let offset = area.response.rect.min - canvas.min;
                moved.push((annotation.id, Position::new(offset.x, offset.y)));
            }
        }
        for (id, position) in moved {
            session.reposition(id, position);
        }
    }

    fn drain_session_events(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.settle() {
            self.canvas_dirty = true;
        }
        let Some(event) = session.pump() else {
            return;
        };
        match event {
            SessionEvent::Recognized { annotation_ids, .. } => {
                if annotation_ids.is_empty() {
                    self.notify(ToastKind::Warning, "Nothing was recognized".into());
                }
                self.canvas_dirty = true;
            }
            SessionEvent::RecognitionFailed { error, .. } => {
                self.notify(ToastKind::Error, error.to_string());
            }
        }
    }
}

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_session_events();

        egui::TopBottomPanel::top("sketch-toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        let canvas = egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.mount(ui.available_size());
                self.canvas(ui)
            })
            .inner;

        if let Some(canvas) = canvas {
            self.annotations(ctx, canvas);
        }

        if self.session.as_ref().is_some_and(|s| s.is_pending()) {
            ctx.request_repaint_after(PENDING_REPAINT);
        }
        self.toasts.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::{mount_size, SketchApp};
    use crate::settings::Settings;
    use crate::sketch::recognition::{RecognitionItem, RecognitionRequest, Recognizer};
    use crate::sketch::SketchError;
    use eframe::egui;
    use std::sync::Arc;

    struct NoopRecognizer;

    impl Recognizer for NoopRecognizer {
        fn recognize(
            &self,
            _request: &RecognitionRequest,
        ) -> Result<Vec<RecognitionItem>, SketchError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn empty_canvas_area_has_no_mount_size() {
        assert_eq!(mount_size(egui::vec2(0.0, 600.0)), None);
        assert_eq!(mount_size(egui::vec2(800.0, 0.4)), None);
        assert_eq!(mount_size(egui::vec2(-5.0, -5.0)), None);
        assert_eq!(mount_size(egui::vec2(800.7, 600.2)), Some((800, 600)));
    }

    #[test]
    fn mount_waits_for_a_non_empty_canvas() {
        let mut app = SketchApp::with_recognizer(Settings::default(), Arc::new(NoopRecognizer));
        app.mount(egui::vec2(0.0, 480.0));
        assert!(app.session().is_none());

        app.mount(egui::vec2(640.0, 480.0));
        assert_eq!(app.session().map(|s| s.surface().size()), Some((640, 480)));

        app.mount(egui::vec2(1024.0, 768.0));
        assert_eq!(app.session().map(|s| s.surface().size()), Some((640, 480)));
    }
}
