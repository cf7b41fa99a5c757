use crate::sketch::error::SketchError;
use crate::sketch::model::{Color, Point};
use base64::{engine::general_purpose, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    /// Square of side `size` whose top-left corner sits `size / 2` above and
    /// left of `center`.
    pub fn centered_square(center: Point, size: u32) -> Self {
        let size = size.min(i32::MAX as u32) as i32;
        let half = size / 2;
        Self {
            x: center.x.saturating_sub(half),
            y: center.y.saturating_sub(half),
            width: size,
            height: size,
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<PixelRect> {
        let max_w = width as i32;
        let max_h = height as i32;
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.x.saturating_add(self.width).clamp(0, max_w);
        let y1 = self.y.saturating_add(self.height).clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Straight RGBA8 pixel buffer backing the drawing surface. A fresh raster is
/// fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.pixels[self.index(x, y) + 3]
    }

    pub fn ink_pixel_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn clear_rect(&mut self, rect: PixelRect) {
        let Some(rect) = rect.clamp(self.width, self.height) else {
            return;
        };
        for y in rect.y..(rect.y + rect.height) {
            let start = self.index(rect.x as u32, y as u32);
            let end = start + rect.width as usize * 4;
            self.pixels[start..end].fill(0);
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
    }

    /// Stamp a filled disc whose diameter matches `stroke_width`.
    pub fn draw_brush(&mut self, center: Point, color: Color, stroke_width: u32) {
        if self.is_zero_sized() {
            return;
        }
        let radius = i64::from(stroke_width.saturating_sub(1) / 2);
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));
        let x_range = (cx - radius).max(0)..=(cx + radius).min(i64::from(self.width) - 1);
        let y_range = (cy - radius).max(0)..=(cy + radius).min(i64::from(self.height) - 1);
        for y in y_range {
            for x in x_range.clone() {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(x as i32, y as i32, color);
                }
            }
        }
    }

    /// Bresenham walk stamping the round brush at every step, which gives the
    /// segment round caps at both ends.
    pub fn draw_segment(&mut self, start: Point, end: Point, color: Color, stroke_width: u32) {
        let mut x0 = start.x;
        let mut y0 = start.y;
        let x1 = end.x;
        let y1 = end.y;

        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.draw_brush(Point::new(x0, y0), color, stroke_width);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, SketchError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(&self.pixels, self.width, self.height, ColorType::Rgba8)
            .map_err(|err| SketchError::EncodeFailed(err.to_string()))?;
        Ok(bytes)
    }

    pub fn to_png_data_url(&self) -> Result<String, SketchError> {
        let png = self.encode_png()?;
        Ok(format!(
            "{PNG_DATA_URL_PREFIX}{}",
            general_purpose::STANDARD.encode(png)
        ))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }
}

#[cfg(test)]
mod tests {
    use super::{PixelRect, Raster, PNG_DATA_URL_PREFIX};
    use crate::sketch::model::{Color, Point};
    use base64::{engine::general_purpose, Engine as _};

    #[test]
    fn new_raster_is_fully_transparent() {
        let raster = Raster::new(8, 4);
        assert_eq!(raster.pixels().len(), 8 * 4 * 4);
        assert_eq!(raster.ink_pixel_count(), 0);
    }

    #[test]
    fn brush_of_width_three_is_a_plus_shape() {
        let mut raster = Raster::new(5, 5);
        raster.draw_brush(Point::new(2, 2), Color::WHITE, 3);
        assert_eq!(raster.ink_pixel_count(), 5);
        assert_eq!(raster.alpha(2, 1), 255);
        assert_eq!(raster.alpha(1, 2), 255);
        assert_eq!(raster.alpha(1, 1), 0);
    }

    #[test]
    fn segment_covers_both_endpoints_and_stays_in_bounds() {
        let mut raster = Raster::new(16, 16);
        raster.draw_segment(Point::new(-4, 3), Point::new(20, 3), Color::WHITE, 3);
        for x in 0..16 {
            assert_eq!(raster.alpha(x, 3), 255, "x={x}");
        }
        assert_eq!(raster.alpha(0, 5), 0);
    }

    #[test]
    fn clear_rect_is_clamped_to_surface() {
        let mut raster = Raster::new(4, 4);
        for y in 0..4 {
            raster.draw_segment(Point::new(0, y), Point::new(3, y), Color::WHITE, 1);
        }
        raster.clear_rect(PixelRect::centered_square(Point::new(0, 0), 6));
        assert_eq!(raster.alpha(0, 0), 0);
        assert_eq!(raster.alpha(2, 2), 0);
        assert_eq!(raster.alpha(3, 3), 255);
        assert_eq!(raster.ink_pixel_count(), 7);
    }

    #[test]
    fn fully_outside_rect_clamps_to_none() {
        let rect = PixelRect {
            x: 10,
            y: 10,
            width: 3,
            height: 3,
        };
        assert_eq!(rect.clamp(4, 4), None);
    }

    #[test]
    fn data_url_round_trips_through_png_decoder() {
        let mut raster = Raster::new(3, 2);
        raster.set_pixel(1, 1, Color::rgb(10, 20, 30));
        let url = raster.to_png_data_url().expect("encode");
        let payload = url.strip_prefix(PNG_DATA_URL_PREFIX).expect("prefix");
        let bytes = general_purpose::STANDARD.decode(payload).expect("base64");
        let decoded = image::load_from_memory(&bytes).expect("png").to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 20, 30, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn oversized_brush_fills_raster_without_overflow() {
        let mut raster = Raster::new(10, 10);
        raster.draw_brush(Point::new(5, 5), Color::WHITE, 100_000);
        assert_eq!(raster.ink_pixel_count(), 100);

        let mut raster = Raster::new(10, 10);
        raster.draw_brush(Point::new(i32::MAX, i32::MIN), Color::WHITE, u32::MAX);
        assert_eq!(raster.ink_pixel_count(), 0);
    }
}
