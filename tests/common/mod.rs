#![allow(dead_code)]

use placard::{
    metrics::{FontExtents, MetricsProvider, TextExtents},
    renderer::{DrawCommand, FaceRole},
};

/// Deterministic face: ASCII glyphs are narrow, everything else is a
/// full-width square when `cjk` is set and missing otherwise.
pub struct FakeFace {
    pub cjk: bool,
    /// Every ASCII glyph gets half an em, so four `w` match two full-width
    /// glyphs.
    pub fixed_pitch: bool,
}

impl FakeFace {
    pub const LATIN: FakeFace = FakeFace {
        cjk: false,
        fixed_pitch: false,
    };

    pub const CJK: FakeFace = FakeFace {
        cjk: true,
        fixed_pitch: false,
    };

    pub const CJK_MONO: FakeFace = FakeFace {
        cjk: true,
        fixed_pitch: true,
    };

    /// Advance, ink width and ink height in ems.
    fn glyph(&self, c: char) -> Option<(f64, f64, f64)> {
        match c {
            ' ' => Some((if self.fixed_pitch { 0.5 } else { 0.3 }, 0.0, 0.0)),
            c if c.is_ascii() => {
                let advance = match (self.fixed_pitch, c) {
                    (true, _) => 0.5,
                    (false, 'i') => 0.3,
                    (false, _) => 0.6,
                };

                Some((advance, advance * 0.8, 0.7))
            }
            _ if !self.cjk => None,
            '\u{3000}' => Some((1.0, 0.0, 0.0)),
            'ー' => Some((1.0, 0.9, 0.1)),
            _ => Some((1.0, 0.9, 0.9)),
        }
    }
}

impl MetricsProvider for FakeFace {
    fn text_extents(&self, text: &str, font_size: f64) -> TextExtents {
        let mut pen = 0.0;
        let mut ink: Option<(f64, f64, f64, f64)> = None;

        for c in text.chars() {
            let Some((advance, width, height)) = self.glyph(c) else {
                continue;
            };

            if width > 0.0 && height > 0.0 {
                let x0 = (pen + 0.05) * font_size;
                let rect = (x0, -height * font_size, x0 + width * font_size, 0.0);

                ink = Some(match ink {
                    Some((a, b, c, d)) => (a.min(rect.0), b.min(rect.1), c.max(rect.2), d.max(rect.3)),
                    None => rect,
                });
            }

            pen += advance;
        }

        let (x0, y0, x1, y1) = ink.unwrap_or_default();

        TextExtents {
            x_bearing: x0,
            y_bearing: y0,
            width: x1 - x0,
            height: y1 - y0,
            x_advance: pen * font_size,
        }
    }

    fn font_extents(&self, font_size: f64) -> FontExtents {
        FontExtents {
            ascent: font_size * 0.88,
            descent: font_size * 0.12,
            height: font_size,
        }
    }
}

pub fn texts(page: &[DrawCommand]) -> Vec<&str> {
    page.iter()
        .filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::FillRect { .. } => None,
        })
        .collect()
}

pub fn faces(page: &[DrawCommand]) -> Vec<FaceRole> {
    page.iter()
        .filter_map(|command| match command {
            DrawCommand::Text { face, .. } => Some(*face),
            DrawCommand::FillRect { .. } => None,
        })
        .collect()
}

pub fn fill_count(page: &[DrawCommand]) -> usize {
    page.iter()
        .filter(|command| matches!(command, DrawCommand::FillRect { .. }))
        .count()
}
