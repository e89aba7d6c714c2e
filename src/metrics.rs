use crate::script::Script;

/// Ink and advance of a run of text at a given size, in device units with y
/// growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    pub x_bearing: f64,
    /// Offset from the baseline to the top of the ink; negative above the baseline.
    pub y_bearing: f64,
    pub width: f64,
    pub height: f64,
    pub x_advance: f64,
}

impl TextExtents {
    /// The extents of the same ink turned a quarter: width/height and the
    /// two bearings trade places.
    pub fn swapped(self) -> Self {
        Self {
            x_bearing: self.y_bearing,
            y_bearing: self.x_bearing,
            width: self.height,
            height: self.width,
            x_advance: self.x_advance,
        }
    }
}

/// Font-wide vertical metrics at a given size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontExtents {
    pub ascent: f64,
    /// Distance below the baseline, positive.
    pub descent: f64,
    /// Recommended baseline-to-baseline distance.
    pub height: f64,
}

/// Measurement capability for one face. The typesetter never computes glyph
/// metrics itself.
pub trait MetricsProvider {
    fn text_extents(&self, text: &str, font_size: f64) -> TextExtents;

    fn font_extents(&self, font_size: f64) -> FontExtents;
}

impl<M: MetricsProvider + ?Sized> MetricsProvider for &M {
    fn text_extents(&self, text: &str, font_size: f64) -> TextExtents {
        (**self).text_extents(text, font_size)
    }

    fn font_extents(&self, font_size: f64) -> FontExtents {
        (**self).font_extents(font_size)
    }
}

/// Size coverage and pitch samples are measured at.
pub const SAMPLE_FONT_SIZE: f64 = 30.0;

/// Whether the face draws visible ink for the script's exemplar glyph.
pub fn supports_script(metrics: &impl MetricsProvider, script: Script) -> bool {
    let extents = metrics.text_extents(script.exemplar(), SAMPLE_FONT_SIZE);

    extents.width >= 1.0 && extents.height >= 1.0
}

/// Whether the face covers any of the CJK scripts.
pub fn supports_cjk(metrics: &impl MetricsProvider) -> bool {
    Script::ALL
        .into_iter()
        .any(|script| supports_script(metrics, script))
}

pub fn is_nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.25
}

/// Compares four `w` against two full-width glyphs of the first supported
/// CJK script, or against four `i` for Latin-only faces.
pub fn is_fixed_pitch_font(metrics: &impl MetricsProvider) -> bool {
    let wide = metrics.text_extents("wwww", SAMPLE_FONT_SIZE).x_advance;

    let sample = Script::ALL
        .into_iter()
        .find(|&script| supports_script(metrics, script))
        .map(Script::pitch_sample)
        .unwrap_or("iiii");

    let narrow = metrics.text_extents(sample, SAMPLE_FONT_SIZE).x_advance;

    is_nearly_equal(wide, narrow)
}
