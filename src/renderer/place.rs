//! Per-character placement for fitted rows and columns.

use kurbo::{Point, Rect};
use tracing::{debug, warn};

use crate::{
    glyph::{Category, SMALL_KANA_RATIO},
    metrics::{MetricsProvider, TextExtents},
    renderer::{
        GlyphPlacement, Rotation, WritingMode,
        fit::{Fit, run_extent},
    },
};

/// Smallest gap between stacked characters, as a fraction of the font size.
pub const MIN_GAP_RATIO: f64 = 0.2;

/// Scale factor applied per step while a column is too crowded.
pub const SHRINK_FACTOR: f64 = 0.95;

/// Shrink steps allowed before a crowded column is drawn as is.
pub const MAX_SHRINK_STEPS: usize = 100;

/// Extents of `unit` as the vertical placement sees them: rotated categories
/// report their ink box turned a quarter.
pub fn placement_extents(
    metrics: &impl MetricsProvider,
    unit: &str,
    font_size: f64,
) -> TextExtents {
    let extents = metrics.text_extents(unit, font_size);

    if Category::of(unit).is_rotated() {
        extents.swapped()
    } else {
        extents
    }
}

/// Lays a row out along one baseline, spreading the leftover width evenly
/// before every character and after the last.
pub fn place_row(
    metrics: &impl MetricsProvider,
    chars: &[&str],
    fit: &Fit,
    bounds: Rect,
    y_adjust: f64,
) -> Vec<GlyphPlacement> {
    let font_extents = metrics.font_extents(fit.font_size);
    let extents: Vec<TextExtents> = chars
        .iter()
        .map(|unit| metrics.text_extents(unit, fit.font_size))
        .collect();

    let text_width: f64 = extents.iter().map(|e| e.x_advance).sum::<f64>() * fit.scale_x;
    let blank = (bounds.width() - text_width) / (chars.len() + 1) as f64;

    let top = bounds.y0 + (bounds.height() - font_extents.height * fit.scale_y) / 2.0;
    let baseline = top + y_adjust + font_extents.ascent * fit.scale_y;

    let mut x = bounds.x0;
    let mut placements = Vec::with_capacity(chars.len());

    for (unit, extents) in chars.iter().zip(&extents) {
        x += blank;

        placements.push(GlyphPlacement {
            text: (*unit).to_owned(),
            font_size: fit.font_size,
            origin: Point::new(x, baseline),
            scale_x: fit.scale_x,
            scale_y: fit.scale_y,
            mirror_y: false,
            rotation: Rotation::None,
        });

        x += extents.x_advance * fit.scale_x;
    }

    placements
}

/// Vertical gap left between characters of a column at the given scale.
fn column_gap(metrics: &impl MetricsProvider, chars: &[&str], fit: &Fit, height: f64) -> f64 {
    let (_, text_height) = run_extent(metrics, chars, fit.font_size, WritingMode::Vertical);

    (height - text_height * fit.scale_y) / (chars.len() + 1) as f64
}

/// Stacks a column top to bottom around the horizontal center of `bounds`.
///
/// Columns whose gap would fall under a fifth of the font size are shrunk
/// first; the returned [`Fit`] carries the scales actually used.
pub fn place_column(
    metrics: &impl MetricsProvider,
    chars: &[&str],
    fit: Fit,
    bounds: Rect,
    y_adjust: f64,
) -> (Vec<GlyphPlacement>, Fit) {
    let mut fit = fit;
    let min_gap = fit.font_size * MIN_GAP_RATIO;
    let mut blank = column_gap(metrics, chars, &fit, bounds.height());
    let mut steps = 0;

    while blank < min_gap {
        if steps == MAX_SHRINK_STEPS {
            warn!(blank, min_gap, "Column still crowded after shrinking");
            break;
        }

        fit.scale_x *= SHRINK_FACTOR;
        fit.scale_y *= SHRINK_FACTOR;
        blank = column_gap(metrics, chars, &fit, bounds.height());
        steps += 1;
    }

    if steps > 0 {
        debug!(steps, ?fit, "Shrunk crowded column");
    }

    let center = bounds.x0 + bounds.width() / 2.0;
    let mut y = bounds.y0;
    let mut placements = Vec::with_capacity(chars.len());

    for unit in chars {
        y += blank;

        let category = Category::of(unit);
        let raw = metrics.text_extents(unit, fit.font_size);

        placements.push(place_in_column(
            unit,
            category,
            &raw,
            &fit,
            center,
            y + y_adjust,
        ));

        y += match category {
            Category::Space => raw.x_advance * fit.scale_y,
            Category::SmallKana => raw.height * fit.scale_y * SMALL_KANA_RATIO,
            category if category.is_rotated() => raw.width * fit.scale_y,
            _ => raw.height * fit.scale_y,
        };
    }

    (placements, fit)
}

fn place_in_column(
    unit: &str,
    category: Category,
    raw: &TextExtents,
    fit: &Fit,
    center: f64,
    y: f64,
) -> GlyphPlacement {
    let mut x = center;
    let mut scale_x = fit.scale_x;
    let mut scale_y = fit.scale_y;

    match category {
        Category::CommaPeriod => x += raw.width * scale_x * 0.75,
        Category::SmallKana => {
            scale_x *= SMALL_KANA_RATIO;
            scale_y *= SMALL_KANA_RATIO;
            x += raw.width * scale_x * 0.5;
        }
        _ => {}
    }

    let extents = if category.is_rotated() {
        raw.swapped()
    } else {
        *raw
    };

    let scaled_width = extents.width * scale_x;

    let (origin_x, mirror_y, rotation) = match category {
        Category::HyphenDash => (
            x - extents.x_bearing * scale_x - scaled_width / 2.0,
            true,
            Rotation::CounterClockwise,
        ),
        Category::ParenRotated => (
            x - scaled_width * 0.55 + extents.height * scale_x / 2.0,
            false,
            Rotation::Clockwise,
        ),
        Category::ParenQuoteOpen => (
            x + scaled_width * 0.6 + extents.x_bearing * scale_x,
            false,
            Rotation::Clockwise,
        ),
        Category::ParenQuoteClose => (
            x - scaled_width * 0.55 + extents.y_bearing * scale_x,
            false,
            Rotation::Clockwise,
        ),
        _ => (x - extents.x_advance * scale_x / 2.0, false, Rotation::None),
    };

    GlyphPlacement {
        text: unit.to_owned(),
        font_size: fit.font_size,
        origin: Point::new(origin_x, y - extents.y_bearing * scale_y),
        scale_x,
        scale_y,
        mirror_y,
        rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FontExtents;

    /// Full-width glyphs: an em advance, ink inset by a tenth on each side.
    /// Dashes are wide and flat, small kana are regular size.
    struct Grid;

    impl MetricsProvider for Grid {
        fn text_extents(&self, text: &str, font_size: f64) -> TextExtents {
            let n = text.chars().count() as f64;

            if text == " " {
                return TextExtents {
                    x_advance: font_size * 0.5,
                    ..TextExtents::default()
                };
            }

            if text == "ー" {
                return TextExtents {
                    x_bearing: font_size * 0.1,
                    y_bearing: -font_size * 0.45,
                    width: font_size * 0.8,
                    height: font_size * 0.1,
                    x_advance: font_size,
                };
            }

            TextExtents {
                x_bearing: font_size * 0.1,
                y_bearing: -font_size * 0.8,
                width: font_size * (n - 0.2),
                height: font_size * 0.8,
                x_advance: font_size * n,
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

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    const UNIT: Fit = Fit {
        font_size: 10.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    #[test]
    fn row_spreads_blank_space_evenly() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 20.0);
        let placements = place_row(&Grid, &["A", "B", "C"], &UNIT, bounds, 0.0);

        // (100 - 30) / 4 before each character.
        let xs: Vec<f64> = placements.iter().map(|p| p.origin.x).collect();
        assert!(approx(xs[0], 17.5));
        assert!(approx(xs[1], 45.0));
        assert!(approx(xs[2], 72.5));

        // Centered line box, baseline at its ascent.
        assert!(placements.iter().all(|p| approx(p.origin.y, 5.0 + 8.8)));
        assert!(placements.iter().all(|p| p.rotation == Rotation::None));
    }

    #[test]
    fn row_baseline_follows_y_adjust() {
        let bounds = Rect::new(10.0, 40.0, 110.0, 60.0);
        let plain = place_row(&Grid, &["A"], &UNIT, bounds, 0.0);
        let nudged = place_row(&Grid, &["A"], &UNIT, bounds, -3.0);

        assert!(approx(nudged[0].origin.y, plain[0].origin.y - 3.0));
        assert!(approx(plain[0].origin.x, 10.0 + 45.0));
    }

    #[test]
    fn rotated_categories_report_swapped_extents() {
        for unit in ["ー", "（", "「", "」"] {
            let before = Grid.text_extents(unit, 10.0);
            let after = placement_extents(&Grid, unit, 10.0);

            assert!(approx(after.width, before.height), "{unit}");
            assert!(approx(after.height, before.width), "{unit}");
            assert!(approx(after.x_bearing, before.y_bearing), "{unit}");
        }

        let before = Grid.text_extents("あ", 10.0);
        assert_eq!(placement_extents(&Grid, "あ", 10.0), before);
    }

    #[test]
    fn column_stacks_downwards_in_order() {
        let bounds = Rect::new(0.0, 0.0, 20.0, 200.0);
        let chars = ["あ", "い", "う"];
        let (placements, fit) = place_column(&Grid, &chars, UNIT, bounds, 0.0);

        assert_eq!(fit, UNIT);
        assert_eq!(placements.len(), 3);

        // Gap (200 - 24) / 4 = 44, each glyph 8 tall.
        let ys: Vec<f64> = placements.iter().map(|p| p.origin.y).collect();
        assert!(approx(ys[0], 44.0 + 8.0));
        assert!(approx(ys[1], 96.0 + 8.0));
        assert!(approx(ys[2], 148.0 + 8.0));

        // Centered on the column.
        assert!(placements.iter().all(|p| approx(p.origin.x, 5.0)));
    }

    #[test]
    fn column_categories_pick_their_own_transform() {
        let bounds = Rect::new(0.0, 0.0, 20.0, 400.0);
        let chars = ["ー", "（", "ゃ", "。", " "];
        let (placements, _) = place_column(&Grid, &chars, UNIT, bounds, 0.0);

        let dash = &placements[0];
        assert!(dash.mirror_y);
        assert_eq!(dash.rotation, Rotation::CounterClockwise);

        let paren = &placements[1];
        assert!(!paren.mirror_y);
        assert_eq!(paren.rotation, Rotation::Clockwise);

        let kana = &placements[2];
        assert!(approx(kana.scale_x, SMALL_KANA_RATIO));
        assert!(approx(kana.scale_y, SMALL_KANA_RATIO));
        assert_eq!(kana.rotation, Rotation::None);

        // Punctuation hangs right of a regular glyph.
        let period = &placements[3];
        assert!(approx(period.origin.x, 10.0 + 8.0 * 0.75 - 5.0));

        assert_eq!(placements[4].rotation, Rotation::None);
    }

    #[test]
    fn column_anchors_differ_per_category() {
        let bounds = Rect::new(0.0, 0.0, 20.0, 400.0);
        let chars = ["（", "「", "」", "ー", "ゃ"];
        let (placements, _) = place_column(&Grid, &chars, UNIT, bounds, 0.0);
        let xs: Vec<f64> = placements.iter().map(|p| p.origin.x).collect();

        // Center 10. Brackets see the swapped box: bearings (-8, 1), 8 wide, 8 tall.
        assert!(approx(xs[0], 10.0 - 8.0 * 0.55 + 8.0 / 2.0));
        assert!(approx(xs[1], 10.0 + 8.0 * 0.6 - 8.0));
        assert!(approx(xs[2], 10.0 - 8.0 * 0.55 + 1.0));

        // The dash turned upright is 1 wide with an x bearing of -4.5.
        assert!(approx(xs[3], 14.0));

        // Small kana shift right by half their shrunk ink width, then center
        // on their shrunk advance.
        let shift = 8.0 * SMALL_KANA_RATIO * 0.5;
        assert!(approx(xs[4], 10.0 + shift - 10.0 * SMALL_KANA_RATIO / 2.0));
        assert!(approx(xs[4], 9.45));
    }

    #[test]
    fn column_advances_differ_per_category() {
        let column = |chars: &[&str], height: f64| {
            let bounds = Rect::new(0.0, 0.0, 20.0, height);
            let (placements, fit) = place_column(&Grid, chars, UNIT, bounds, 0.0);
            assert_eq!(fit, UNIT);

            placements
                .iter()
                .map(|p| p.origin.y)
                .collect::<Vec<f64>>()
        };

        // Every case leaves a gap of 20 between glyphs.

        // A space advances by its advance width, 5.
        let ys = column(&["あ", " ", "い"], 101.0);
        assert!(approx(ys[0], 28.0));
        assert!(approx(ys[1], 48.0));
        assert!(approx(ys[2], 20.0 + 8.0 + 20.0 + 5.0 + 20.0 + 8.0));

        // A dash advances by its ink width, 8, and sits on its swapped bearing.
        let ys = column(&["ー", "い"], 76.0);
        assert!(approx(ys[0], 19.0));
        assert!(approx(ys[1], 20.0 + 8.0 + 20.0 + 8.0));

        // So does a bracket.
        let ys = column(&["（", "い"], 76.0);
        assert!(approx(ys[0], 19.0));
        assert!(approx(ys[1], 56.0));

        // Small kana advance by their shrunk height, 8 x 0.55.
        let ys = column(&["ゃ", "い"], 72.4);
        assert!(approx(ys[0], 20.0 + 8.0 * SMALL_KANA_RATIO));
        assert!(approx(ys[1], 20.0 + 4.4 + 20.0 + 8.0));
    }

    #[test]
    fn crowded_column_shrinks_until_gap_clears() {
        let bounds = Rect::new(0.0, 0.0, 20.0, 100.0);
        let chars = ["あ"; 10];
        let fit = Fit {
            font_size: 10.0,
            scale_x: 1.2,
            scale_y: 1.2,
        };

        let (placements, shrunk) = place_column(&Grid, &chars, fit, bounds, 0.0);

        assert!(shrunk.scale_x < fit.scale_x);
        assert!(approx(shrunk.scale_x, shrunk.scale_y));
        assert!(column_gap(&Grid, &chars, &shrunk, 100.0) >= 2.0);
        assert!(placements.iter().all(|p| approx(p.scale_y, shrunk.scale_y)));
    }

    #[test]
    fn hopeless_column_stops_shrinking() {
        // Fixed-size ink that never gets smaller leaves a negative gap forever.
        struct Stubborn;

        impl MetricsProvider for Stubborn {
            fn text_extents(&self, _: &str, _: f64) -> TextExtents {
                TextExtents {
                    width: 10.0,
                    height: 1e12,
                    x_advance: 10.0,
                    ..TextExtents::default()
                }
            }

            fn font_extents(&self, font_size: f64) -> FontExtents {
                FontExtents {
                    ascent: font_size,
                    descent: 0.0,
                    height: font_size,
                }
            }
        }

        let bounds = Rect::new(0.0, 0.0, 20.0, 100.0);
        let (placements, fit) = place_column(&Stubborn, &["a"], UNIT, bounds, 0.0);

        assert_eq!(placements.len(), 1);
        assert!(approx(fit.scale_x, SHRINK_FACTOR.powi(MAX_SHRINK_STEPS as i32)));
    }
}
