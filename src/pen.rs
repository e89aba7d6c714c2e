use fontcull_skrifa::outline::OutlinePen;
use kurbo::{BezPath, Point};

/// Collects a glyph outline in font units, flipped so y grows downwards like
/// the canvas. Bounding boxes of the collected path are then directly in
/// text-extents orientation.
#[derive(Default)]
pub struct GlyphPen {
    pub path: BezPath,
}

impl GlyphPen {
    pub fn new() -> Self {
        Self::default()
    }

    fn point(x: f32, y: f32) -> Point {
        Point::new(x as f64, -(y as f64))
    }
}

impl OutlinePen for GlyphPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(Self::point(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(Self::point(x, y));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.path
            .quad_to(Self::point(cx0, cy0), Self::point(x, y));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.path.curve_to(
            Self::point(cx0, cy0),
            Self::point(cx1, cy1),
            Self::point(x, y),
        );
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Shape;

    use super::*;

    #[test]
    fn flips_outline_to_y_down() {
        let mut pen = GlyphPen::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.line_to(100.0, 700.0);
        pen.close();

        let bbox = pen.path.bounding_box();
        assert_eq!(bbox.y0, -700.0);
        assert_eq!(bbox.y1, 0.0);
        assert_eq!(bbox.width(), 100.0);
    }
}
