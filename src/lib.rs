//! Typesets display text onto fixed-size pages, growing it until it fills
//! each row (or column, for vertical writing) of the printable area.

use anyhow::{Result, anyhow};
use kurbo::Rect;
use tracing::{debug, info, info_span, warn};

use crate::{
    color::Rgb,
    fullwidth::{TextNormalizer, normalize_preserving_spaces},
    layout::{LettersPerPage, PageGeometry, bands, paginate},
    metrics::{MetricsProvider, is_fixed_pitch_font, supports_cjk, supports_script},
    page_size::pt_from_mm,
    renderer::{
        Canvas, FaceRole, WritingMode, draw_placements,
        fit::{Fit, FitTuning, fit},
        place::{place_column, place_row},
    },
    script::{Script, detect},
    text::{expand_tabs, split_chars, unescape},
};

pub mod color;
pub mod font;
pub mod fullwidth;
pub mod glyph;
pub mod layout;
pub mod metrics;
pub mod page_size;
pub mod pen;
pub mod renderer;
pub mod script;
pub mod text;

/// Everything a render pass needs besides the text and the faces.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacardConfig {
    /// Page size and margin in points.
    pub page: PageGeometry,
    pub mode: WritingMode,
    pub text_color: Rgb,
    pub back_color: Rgb,
    /// Largest allowed width/height ratio of a single character.
    pub threshold: f64,
    /// Baseline offset in points, positive downwards.
    pub y_adjust: f64,
    pub letters_per_page: LettersPerPage,
    pub horizontal_tuning: FitTuning,
    pub vertical_tuning: FitTuning,
}

impl Default for PlacardConfig {
    /// A4 landscape, 8mm margins, black on white.
    fn default() -> Self {
        Self {
            page: PageGeometry {
                width: pt_from_mm(297.0),
                height: pt_from_mm(210.0),
                margin: pt_from_mm(8.0),
            },
            mode: WritingMode::Horizontal,
            text_color: Rgb::BLACK,
            back_color: Rgb::WHITE,
            threshold: 1.5,
            y_adjust: 0.0,
            letters_per_page: LettersPerPage::Unlimited,
            horizontal_tuning: FitTuning::HORIZONTAL,
            vertical_tuning: FitTuning::VERTICAL,
        }
    }
}

impl PlacardConfig {
    pub fn validate(&self) -> Result<()> {
        let page = &self.page;

        if !(page.width.is_finite() && page.width > 0.0)
            || !(page.height.is_finite() && page.height > 0.0)
        {
            return Err(anyhow!(
                "Invalid page size: {} x {} pt",
                page.width,
                page.height
            ));
        }

        if !(page.margin.is_finite() && page.margin > 0.0) {
            return Err(anyhow!("Invalid margin: {} pt", page.margin));
        }

        if !page.is_printable() {
            return Err(anyhow!(
                "Margin of {} pt leaves no printable area on a {} x {} pt page",
                page.margin,
                page.width,
                page.height
            ));
        }

        if !(self.threshold.is_finite() && self.threshold >= 1.0) {
            return Err(anyhow!(
                "Threshold must be at least 1.0, got {}",
                self.threshold
            ));
        }

        if !self.y_adjust.is_finite() {
            return Err(anyhow!("Invalid y-adjust: {}", self.y_adjust));
        }

        if !self.horizontal_tuning.is_valid() || !self.vertical_tuning.is_valid() {
            return Err(anyhow!("Invalid fit tuning"));
        }

        Ok(())
    }

    pub fn tuning(&self, mode: WritingMode) -> &FitTuning {
        match mode {
            WritingMode::Horizontal => &self.horizontal_tuning,
            WritingMode::Vertical => &self.vertical_tuning,
        }
    }
}

/// Outcome of one row or column.
#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    pub text: String,
    /// `None` when the row was empty or could not be fitted, and was skipped.
    pub fit: Option<Fit>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageReport {
    pub rows: Vec<RowReport>,
}

impl PageReport {
    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(|row| row.fit.is_some())
    }
}

/// What a render pass actually did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub pages: Vec<PageReport>,
    /// Writing mode used, which is horizontal after a substitution.
    pub mode: WritingMode,
    /// Script the primary face failed to cover; the error page was drawn
    /// with the fallback face instead of the text.
    pub substituted: Option<Script>,
    pub fixed_pitch: bool,
}

impl RenderReport {
    pub fn skipped_rows(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|page| &page.rows)
            .filter(|row| row.fit.is_none())
            .count()
    }
}

/// Renders `text` onto `canvas`, one [`Canvas::show_page`] per page.
///
/// Text the primary face cannot show (judged by the first script detected)
/// is replaced by a short error message set horizontally in `fallback`.
/// Escapes are decoded and tabs expanded before pagination. Rows that do not
/// fit are skipped and reported; they never stop the pass.
pub fn render<P, F, C>(
    config: &PlacardConfig,
    text: &str,
    primary: &P,
    fallback: &F,
    normalizer: &dyn TextNormalizer,
    canvas: &mut C,
) -> RenderReport
where
    P: MetricsProvider + ?Sized,
    F: MetricsProvider + ?Sized,
    C: Canvas + ?Sized,
{
    let mut report = RenderReport {
        mode: config.mode,
        ..RenderReport::default()
    };

    let mut metrics: &dyn MetricsProvider = &primary;
    let mut face = FaceRole::Primary;
    let mut text = text;

    if let Some(script) = detect(text) {
        if !supports_script(&metrics, script) {
            warn!(?script, "Font lacks coverage for the text, drawing an error page");

            text = script.missing_font_message();
            metrics = &fallback;
            face = FaceRole::Fallback;
            report.mode = WritingMode::Horizontal;
            report.substituted = Some(script);
        }
    }

    let text = expand_tabs(&unescape(text));

    report.fixed_pitch = is_fixed_pitch_font(&metrics);

    if report.fixed_pitch {
        info!("Fixed-pitch font");
    } else {
        info!("Proportional font");
    }

    let pages = paginate(&text, config.letters_per_page);
    let full_width = report.mode == WritingMode::Vertical && supports_cjk(&metrics);

    for (index, rows) in pages.iter().enumerate() {
        let span = info_span!("page", number = index + 1);
        let _enter = span.enter();

        info!(rows = rows.len(), "Drawing page {}", index + 1);

        canvas.select_face(face);

        let page = PageDrawer {
            config,
            mode: report.mode,
            metrics: &metrics,
            normalizer: full_width.then_some(normalizer),
        };

        report.pages.push(page.draw(rows, canvas));

        canvas.show_page();
    }

    report
}

struct PageDrawer<'a, M: MetricsProvider> {
    config: &'a PlacardConfig,
    mode: WritingMode,
    metrics: &'a M,
    normalizer: Option<&'a dyn TextNormalizer>,
}

impl<M: MetricsProvider> PageDrawer<'_, M> {
    fn draw<C: Canvas + ?Sized>(&self, rows: &[String], canvas: &mut C) -> PageReport {
        let boxes = bands(&self.config.page, rows.len(), self.mode);
        let mut report = PageReport::default();

        for (row, bounds) in rows.iter().zip(boxes) {
            canvas.fill_rect(bounds, self.config.back_color);

            let fit = match self.mode {
                WritingMode::Horizontal => self.draw_row(row, bounds, canvas),
                WritingMode::Vertical => self.draw_column(row, bounds, canvas),
            };

            match &fit {
                Some(fit) => debug!(row = %row, ?fit, "Drew row"),
                None if row.is_empty() => debug!("Skipped empty row"),
                None => warn!(row = %row, "Skipped row that could not be fitted"),
            }

            report.rows.push(RowReport {
                text: row.clone(),
                fit,
            });
        }

        report
    }

    fn draw_row<C: Canvas + ?Sized>(
        &self,
        row: &str,
        bounds: Rect,
        canvas: &mut C,
    ) -> Option<Fit> {
        let chars = split_chars(row);

        let fit = fit(
            self.metrics,
            &chars,
            WritingMode::Horizontal,
            bounds.width(),
            bounds.height(),
            self.config.threshold,
            self.config.tuning(WritingMode::Horizontal),
        )?;

        let placements = place_row(self.metrics, &chars, &fit, bounds, self.config.y_adjust);
        draw_placements(canvas, &placements, self.config.text_color);

        Some(fit)
    }

    fn draw_column<C: Canvas + ?Sized>(
        &self,
        row: &str,
        bounds: Rect,
        canvas: &mut C,
    ) -> Option<Fit> {
        let normalized = match self.normalizer {
            Some(normalizer) => normalize_preserving_spaces(row, normalizer),
            None => row.to_owned(),
        };
        let chars = split_chars(&normalized);

        let fit = fit(
            self.metrics,
            &chars,
            WritingMode::Vertical,
            bounds.width(),
            bounds.height(),
            self.config.threshold,
            self.config.tuning(WritingMode::Vertical),
        )?;

        let (placements, fit) =
            place_column(self.metrics, &chars, fit, bounds, self.config.y_adjust);
        draw_placements(canvas, &placements, self.config.text_color);

        Some(fit)
    }
}
