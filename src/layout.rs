//! Splitting text into pages and pages into writing-direction bands.

use std::num::NonZeroUsize;

use anyhow::{Result, anyhow};
use kurbo::Rect;

use crate::{
    renderer::WritingMode,
    text::{split_chars, split_rows, strip_whitespace},
};

/// How many characters go on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LettersPerPage {
    /// One page; rows break on newlines.
    #[default]
    Unlimited,
    /// Whitespace is dropped and every page holds one row of at most this
    /// many characters.
    Limit(NonZeroUsize),
}

impl LettersPerPage {
    /// `-1` means unlimited; any other count must be positive.
    pub fn from_count(count: i64) -> Result<Self> {
        match count {
            -1 => Ok(LettersPerPage::Unlimited),
            n if n > 0 => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(LettersPerPage::Limit)
                .ok_or_else(|| anyhow!("Letters per page out of range: {n}")),
            n => Err(anyhow!(
                "Letters per page must be positive or -1 for unlimited, got {n}"
            )),
        }
    }
}

/// Splits text into pages, each a list of rows.
///
/// Unlimited text becomes one page with a row per line. Limited text loses
/// its whitespace and is chunked into `ceil(len / limit)` single-row pages.
pub fn paginate(text: &str, letters: LettersPerPage) -> Vec<Vec<String>> {
    match letters {
        LettersPerPage::Unlimited => vec![split_rows(text)],
        LettersPerPage::Limit(limit) => {
            let stripped = strip_whitespace(text);

            split_chars(&stripped)
                .chunks(limit.get())
                .map(|chunk| vec![chunk.concat()])
                .collect()
        }
    }
}

/// Page size and margin in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub fn printable_width(&self) -> f64 {
        self.width - self.margin * 2.0
    }

    pub fn printable_height(&self) -> f64 {
        self.height - self.margin * 2.0
    }

    pub fn is_printable(&self) -> bool {
        self.printable_width() > 0.0 && self.printable_height() > 0.0
    }
}

/// Boxes for `count` rows or columns, in drawing order.
///
/// Rows run top to bottom across the printable width; columns run right to
/// left down the printable height. Neighbouring bands are a margin apart.
pub fn bands(geometry: &PageGeometry, count: usize, mode: WritingMode) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }

    let margin = geometry.margin;
    let gaps = margin * (count + 1) as f64;

    match mode {
        WritingMode::Horizontal => {
            let row_height = (geometry.height - gaps) / count as f64;

            (0..count)
                .map(|i| {
                    let y = margin + (row_height + margin) * i as f64;
                    Rect::new(margin, y, margin + geometry.printable_width(), y + row_height)
                })
                .collect()
        }
        WritingMode::Vertical => {
            let column_width = (geometry.width - gaps) / count as f64;
            let right = margin * 2.0 + geometry.printable_width();

            (0..count)
                .map(|i| {
                    let x = margin * (i + 1) as f64 + column_width * i as f64;
                    let x0 = right - (x + column_width);
                    Rect::new(
                        x0,
                        margin,
                        x0 + column_width,
                        margin + geometry.printable_height(),
                    )
                })
                .collect()
        }
    }
}
