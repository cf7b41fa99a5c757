use crate::sketch::model::Position;
use crate::sketch::raster::Raster;

/// Bounding box of the ink on a raster, in inclusive pixel coordinates.
///
/// The scan starts from `(width, height, 0, 0)`; when no ink is found the
/// box keeps those values and [`InkBounds::is_empty`] reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    empty: bool,
}

impl InkBounds {
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.min_x as f32 + self.max_x as f32) / 2.0,
            (self.min_y as f32 + self.max_y as f32) / 2.0,
        )
    }

    /// Center of the ink, or `None` for an empty raster.
    pub fn anchor(&self) -> Option<Position> {
        (!self.empty).then(|| self.center())
    }
}

/// Exhaustive scan of every pixel; ink is any pixel with non-zero alpha.
pub fn compute_bounds(raster: &Raster) -> InkBounds {
    let width = raster.width();
    let height = raster.height();
    let mut bounds = InkBounds {
        min_x: width,
        min_y: height,
        max_x: 0,
        max_y: 0,
        empty: true,
    };

    if width == 0 {
        return bounds;
    }
    for (idx, px) in raster.pixels().chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let x = (idx % width as usize) as u32;
        let y = (idx / width as usize) as u32;
        bounds.min_x = bounds.min_x.min(x);
        bounds.min_y = bounds.min_y.min(y);
        bounds.max_x = bounds.max_x.max(x);
        bounds.max_y = bounds.max_y.max(y);
        bounds.empty = false;
    }
    bounds
}

/// Center of the ink bounding box. On an empty raster this is the center of
/// the degenerate box, `(width / 2, height / 2)`.
pub fn compute_anchor(raster: &Raster) -> Position {
    compute_bounds(raster).center()
}

#[cfg(test)]
mod tests {
    use super::{compute_anchor, compute_bounds};
    use crate::sketch::model::{Color, Point, Position};
    use crate::sketch::raster::Raster;

    #[test]
    fn empty_raster_yields_degenerate_box() {
        let raster = Raster::new(300, 200);
        let bounds = compute_bounds(&raster);
        assert!(bounds.is_empty());
        assert_eq!(
            (bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y),
            (300, 200, 0, 0)
        );
        assert_eq!(compute_anchor(&raster), Position::new(150.0, 100.0));
        assert_eq!(bounds.anchor(), None);
    }

    #[test]
    fn single_ink_pixel_is_its_own_anchor() {
        let mut raster = Raster::new(64, 48);
        raster.set_pixel(17, 33, Color::WHITE);
        assert_eq!(compute_anchor(&raster), Position::new(17.0, 33.0));
    }

    #[test]
    fn anchor_is_midpoint_of_extremes() {
        let mut raster = Raster::new(200, 200);
        raster.draw_segment(Point::new(100, 60), Point::new(140, 100), Color::WHITE, 1);
        let bounds = compute_bounds(&raster);
        assert_eq!(
            (bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y),
            (100, 60, 140, 100)
        );
        assert_eq!(bounds.anchor(), Some(Position::new(120.0, 80.0)));
    }

    #[test]
    fn half_pixel_centers_are_kept() {
        let mut raster = Raster::new(10, 10);
        raster.set_pixel(1, 1, Color::WHITE);
        raster.set_pixel(2, 4, Color::WHITE);
        assert_eq!(compute_anchor(&raster), Position::new(1.5, 2.5));
    }

    #[test]
    fn zero_sized_raster_is_empty() {
        let raster = Raster::new(0, 0);
        assert!(compute_bounds(&raster).is_empty());
    }
}
