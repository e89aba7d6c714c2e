//! Font size and scale search.
//!
//! Text is first grown uniformly until it stops fitting on one axis, then
//! stretched along whichever axis still has room, and finally clamped so a
//! single character is never more than `threshold` times wider than tall (or
//! taller than wide).

use tracing::{debug, trace};

use crate::{
    glyph::{Category, SMALL_KANA_RATIO},
    metrics::MetricsProvider,
    renderer::WritingMode,
};

/// Thresholds below this only allow uniform growth.
pub const ISOTROPIC_THRESHOLD: f64 = 1.1;

/// Font size and per-axis scale for one row or column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub font_size: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Growth parameters for one writing mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTuning {
    /// Factor applied to the font size (or a scale) per step.
    pub growth: f64,
    /// Share of the box the text may fill before growth stops.
    pub fill_ratio: f64,
    pub initial_font_size: f64,
    /// Search fails once the font size reaches this.
    pub max_font_size: f64,
}

impl FitTuning {
    pub const HORIZONTAL: FitTuning = FitTuning {
        growth: 1.1,
        fill_ratio: 0.9,
        initial_font_size: 10.0,
        max_font_size: 10000.0,
    };

    pub const VERTICAL: FitTuning = FitTuning {
        growth: 1.05,
        fill_ratio: 0.95,
        initial_font_size: 10.0,
        max_font_size: 10000.0,
    };

    pub fn for_mode(mode: WritingMode) -> FitTuning {
        match mode {
            WritingMode::Horizontal => FitTuning::HORIZONTAL,
            WritingMode::Vertical => FitTuning::VERTICAL,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.growth.is_finite()
            && self.growth > 1.0
            && self.fill_ratio > 0.0
            && self.fill_ratio <= 1.0
            && self.initial_font_size > 0.0
            && self.max_font_size > self.initial_font_size
    }
}

/// Unscaled size of a run of characters set at `font_size`.
///
/// Horizontal runs are as wide as their advances and as tall as the tallest
/// ink or the font's line height. Vertical runs stack: dashes and brackets
/// contribute their ink width as height, spaces their advance, small kana a
/// reduced ink box.
pub fn run_extent(
    metrics: &impl MetricsProvider,
    chars: &[&str],
    font_size: f64,
    mode: WritingMode,
) -> (f64, f64) {
    let font_extents = metrics.font_extents(font_size);
    let mut width: f64 = 0.0;
    let mut height: f64 = 0.0;

    for unit in chars {
        let extents = metrics.text_extents(unit, font_size);

        match mode {
            WritingMode::Horizontal => {
                height = height.max(extents.height).max(font_extents.height);
                width += extents.x_advance;
            }
            WritingMode::Vertical => match Category::of(unit) {
                Category::Space => {
                    width = width.max(extents.width);
                    height += extents.x_advance;
                }
                Category::SmallKana => {
                    width = width.max(extents.width * SMALL_KANA_RATIO);
                    height += extents.height * SMALL_KANA_RATIO;
                }
                category if category.is_rotated() => {
                    width = width.max(extents.height);
                    height += extents.width;
                }
                _ => {
                    width = width.max(extents.width);
                    height += extents.height;
                }
            },
        }
    }

    (width, height)
}

/// Finds the fit for `chars` inside a `box_width` × `box_height` box.
///
/// Returns `None` for empty or inkless text, for a degenerate box, and when
/// the font size would reach the tuning's ceiling.
pub fn fit(
    metrics: &impl MetricsProvider,
    chars: &[&str],
    mode: WritingMode,
    box_width: f64,
    box_height: f64,
    threshold: f64,
    tuning: &FitTuning,
) -> Option<Fit> {
    if chars.is_empty() || !(box_width > 0.0 && box_height > 0.0) {
        return None;
    }

    let mut fit = Fit {
        font_size: tuning.initial_font_size,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    let max_width = box_width * tuning.fill_ratio;
    let max_height = box_height * tuning.fill_ratio;

    loop {
        let (text_width, text_height) = run_extent(metrics, chars, fit.font_size, mode);

        if fit.font_size >= tuning.max_font_size || text_width <= 0.0 || text_height <= 0.0 {
            debug!(font_size = fit.font_size, text_width, text_height, "No fit");
            return None;
        }

        let width_room = text_width * fit.scale_x < max_width;
        let height_room = text_height * fit.scale_y < max_height;

        if width_room && height_room {
            fit.font_size *= tuning.growth;
        } else if threshold < ISOTROPIC_THRESHOLD {
            break;
        } else if width_room {
            fit.scale_x *= tuning.growth;
        } else if height_room {
            fit.scale_y *= tuning.growth;
        } else {
            break;
        }

        trace!(?fit, "Growing");
    }

    let (text_width, text_height) = run_extent(metrics, chars, fit.font_size, mode);
    let len = chars.len() as f64;

    clamp_aspect(&mut fit, mode, text_width, text_height, len, threshold);

    debug!(?fit, text_width, text_height, "Fitted");

    Some(fit)
}

/// Shrinks one scale so a single character's aspect ratio stays within
/// `threshold`. Horizontal runs share their width between characters,
/// vertical runs their height.
fn clamp_aspect(
    fit: &mut Fit,
    mode: WritingMode,
    text_width: f64,
    text_height: f64,
    len: f64,
    threshold: f64,
) {
    match mode {
        WritingMode::Horizontal => {
            let char_width = text_width * fit.scale_x / len;
            let char_height = text_height * fit.scale_y;

            if char_width / char_height > threshold {
                fit.scale_x = threshold * char_height * len / text_width;
            }

            let char_width = text_width * fit.scale_x / len;

            if char_height / char_width > threshold {
                fit.scale_y = threshold * char_width / text_height;
            }
        }
        WritingMode::Vertical => {
            let char_width = text_width * fit.scale_x;
            let char_height = text_height * fit.scale_y / len;

            if char_width / char_height > threshold {
                fit.scale_x = threshold * char_height / text_width;
            } else if char_height / char_width > threshold {
                fit.scale_y = threshold * char_width * len / text_height;
            }
        }
    }
}

/// Ratio of the wider side to the narrower side of one character after a fit.
pub fn realized_aspect(
    metrics: &impl MetricsProvider,
    chars: &[&str],
    mode: WritingMode,
    fit: &Fit,
) -> f64 {
    let (text_width, text_height) = run_extent(metrics, chars, fit.font_size, mode);
    let len = chars.len() as f64;

    let (char_width, char_height) = match mode {
        WritingMode::Horizontal => (text_width * fit.scale_x / len, text_height * fit.scale_y),
        WritingMode::Vertical => (text_width * fit.scale_x, text_height * fit.scale_y / len),
    };

    (char_width / char_height).max(char_height / char_width)
}
