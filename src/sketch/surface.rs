use crate::sketch::error::SketchError;
use crate::sketch::model::Point;
use crate::sketch::palette::PaletteState;
use crate::sketch::raster::{PixelRect, Raster};

pub const DEFAULT_STROKE_WIDTH: u32 = 3;
pub const DEFAULT_ERASER_SIZE: u32 = 6;
/// Upper bound for both brush width and eraser side, in pixels.
pub const MAX_TOOL_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceBackground {
    /// Nothing has been drawn since mount.
    Unpainted,
    Black,
}

/// What a single `extend_stroke` call did to the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeEffect {
    Ignored,
    Painted,
    Erased,
}

/// Freehand drawing surface. Owns the raster exclusively; every pixel
/// mutation in the pipeline goes through here.
#[derive(Debug, Clone)]
pub struct StrokeSurface {
    raster: Raster,
    drawing: bool,
    last_point: Option<Point>,
    background: SurfaceBackground,
    stroke_width: u32,
    eraser_size: u32,
}

impl StrokeSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_tools(width, height, DEFAULT_STROKE_WIDTH, DEFAULT_ERASER_SIZE)
    }

    pub fn with_tools(width: u32, height: u32, stroke_width: u32, eraser_size: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
            drawing: false,
            last_point: None,
            background: SurfaceBackground::Unpainted,
            stroke_width: clamp_tool_size(stroke_width, "stroke_width"),
            eraser_size: clamp_tool_size(eraser_size, "eraser_size"),
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    pub fn eraser_size(&self) -> u32 {
        self.eraser_size
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn background(&self) -> SurfaceBackground {
        self.background
    }

    pub fn size(&self) -> (u32, u32) {
        (self.raster.width(), self.raster.height())
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if self.drawing {
            return;
        }
        self.background = SurfaceBackground::Black;
        self.last_point = Some(point);
        self.drawing = true;
        tracing::debug!(x = point.x, y = point.y, "stroke started");
    }

    pub fn extend_stroke(&mut self, point: Point, palette: &PaletteState) -> StrokeEffect {
        if !self.drawing {
            return StrokeEffect::Ignored;
        }

        if palette.eraser_active() {
            self.raster
                .clear_rect(PixelRect::centered_square(point, self.eraser_size));
            return StrokeEffect::Erased;
        }

        let from = self.last_point.unwrap_or(point);
        self.raster
            .draw_segment(from, point, palette.color(), self.stroke_width);
        self.last_point = Some(point);
        StrokeEffect::Painted
    }

    pub fn end_stroke(&mut self) {
        if self.drawing {
            tracing::debug!("stroke ended");
        }
        self.drawing = false;
    }

    pub fn clear(&mut self) {
        self.raster.clear();
    }

    /// Return to the state right after mount: blank raster, no active stroke.
    pub fn reset(&mut self) {
        self.clear();
        self.drawing = false;
        self.last_point = None;
        self.background = SurfaceBackground::Unpainted;
    }

    /// PNG data URL of the current raster. Does not touch the surface.
    pub fn export_image(&self) -> Result<String, SketchError> {
        self.raster.to_png_data_url()
    }
}

fn clamp_tool_size(size: u32, name: &str) -> u32 {
    let clamped = size.clamp(1, MAX_TOOL_SIZE);
    if clamped != size {
        tracing::warn!(tool = name, requested = size, used = clamped, "tool size out of range");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::{StrokeEffect, StrokeSurface, SurfaceBackground, MAX_TOOL_SIZE};
    use crate::sketch::model::{Color, Point};
    use crate::sketch::palette::PaletteState;

    fn draw_line(surface: &mut StrokeSurface, palette: &PaletteState, from: (i32, i32), to: (i32, i32)) {
        surface.begin_stroke(from.into());
        surface.extend_stroke(to.into(), palette);
        surface.end_stroke();
    }

    #[test]
    fn extend_without_begin_is_a_no_op() {
        let mut surface = StrokeSurface::new(32, 32);
        let palette = PaletteState::default();
        assert_eq!(
            surface.extend_stroke(Point::new(4, 4), &palette),
            StrokeEffect::Ignored
        );
        assert_eq!(surface.raster().ink_pixel_count(), 0);
    }

    #[test]
    fn begin_while_drawing_keeps_original_path_start() {
        let mut surface = StrokeSurface::new(32, 32);
        let palette = PaletteState::default();
        surface.begin_stroke(Point::new(2, 2));
        surface.begin_stroke(Point::new(20, 20));
        surface.extend_stroke(Point::new(2, 10), &palette);
        assert_eq!(surface.raster().alpha(2, 6), 255);
        assert_eq!(surface.raster().alpha(20, 20), 0);
    }

    #[test]
    fn begin_paints_background_black() {
        let mut surface = StrokeSurface::new(8, 8);
        assert_eq!(surface.background(), SurfaceBackground::Unpainted);
        surface.begin_stroke(Point::new(1, 1));
        assert_eq!(surface.background(), SurfaceBackground::Black);
        assert_eq!(surface.raster().ink_pixel_count(), 0);
    }

    #[test]
    fn painting_uses_active_color_and_never_removes_ink() {
        let mut surface = StrokeSurface::new(64, 64);
        let mut palette = PaletteState::default();
        palette.set_color(Color::rgb(255, 0, 0));
        surface.begin_stroke(Point::new(5, 5));

        let mut previous = 0;
        for point in [(30, 5), (30, 40), (5, 40), (5, 5), (60, 60)] {
            surface.extend_stroke(point.into(), &palette);
            let count = surface.raster().ink_pixel_count();
            assert!(count >= previous);
            previous = count;
        }
        assert_eq!(surface.raster().pixel(30, 20), [255, 0, 0, 255]);
    }

    #[test]
    fn color_change_does_not_recolor_existing_ink() {
        let mut surface = StrokeSurface::new(32, 32);
        let mut palette = PaletteState::default();
        draw_line(&mut surface, &palette, (2, 2), (10, 2));
        palette.set_color(Color::rgb(0, 0, 255));
        draw_line(&mut surface, &palette, (2, 20), (10, 20));
        assert_eq!(surface.raster().pixel(6, 2), [255, 255, 255, 255]);
        assert_eq!(surface.raster().pixel(6, 20), [0, 0, 255, 255]);
    }

    #[test]
    fn eraser_clears_square_around_pointer_instead_of_painting() {
        let mut surface = StrokeSurface::new(32, 32);
        let mut palette = PaletteState::default();
        draw_line(&mut surface, &palette, (0, 10), (31, 10));
        let before = surface.raster().ink_pixel_count();

        palette.toggle_eraser();
        surface.begin_stroke(Point::new(16, 10));
        assert_eq!(
            surface.extend_stroke(Point::new(16, 10), &palette),
            StrokeEffect::Erased
        );
        surface.end_stroke();

        assert_eq!(surface.raster().alpha(16, 10), 0);
        assert_eq!(surface.raster().alpha(13, 10), 0);
        assert_eq!(surface.raster().alpha(18, 10), 0);
        assert_eq!(surface.raster().alpha(19, 10), 255);
        assert!(surface.raster().ink_pixel_count() < before);
    }

    #[test]
    fn end_stroke_is_idempotent() {
        let mut surface = StrokeSurface::new(8, 8);
        surface.end_stroke();
        surface.begin_stroke(Point::new(1, 1));
        surface.end_stroke();
        surface.end_stroke();
        assert!(!surface.is_drawing());
    }

    #[test]
    fn clear_wipes_ink_and_export_leaves_surface_untouched() {
        let mut surface = StrokeSurface::new(16, 16);
        let palette = PaletteState::default();
        draw_line(&mut surface, &palette, (1, 1), (14, 14));
        let snapshot = surface.raster().clone();
        let url = surface.export_image().expect("export");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(surface.raster(), &snapshot);

        surface.clear();
        assert_eq!(surface.raster().ink_pixel_count(), 0);
        assert_eq!(surface.size(), (16, 16));
    }

    #[test]
    fn tool_sizes_are_clamped_to_a_sane_range() {
        let surface = StrokeSurface::with_tools(32, 32, 100_000, 0);
        assert_eq!(surface.stroke_width(), MAX_TOOL_SIZE);
        assert_eq!(surface.eraser_size(), 1);

        let mut surface = StrokeSurface::with_tools(32, 32, u32::MAX, u32::MAX);
        let palette = PaletteState::default();
        draw_line(&mut surface, &palette, (0, 0), (31, 31));
        assert_eq!(surface.raster().ink_pixel_count(), 32 * 32);
    }
}
