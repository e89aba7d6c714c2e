//! Vector output: one SVG document per page, text drawn as glyph outlines.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use kurbo::{Affine, BezPath, Rect, Shape};
use tracing::debug;

use crate::{
    color::Rgb,
    renderer::{Canvas, FaceRole, OutlineSource},
};

pub struct SvgCanvas<'a> {
    width: f64,
    height: f64,
    primary: &'a dyn OutlineSource,
    fallback: &'a dyn OutlineSource,
    face: FaceRole,
    transform: Affine,
    stack: Vec<Affine>,
    body: String,
    pages: Vec<String>,
}

impl<'a> SvgCanvas<'a> {
    /// A canvas for `width` × `height` point pages.
    pub fn new(
        width: f64,
        height: f64,
        primary: &'a dyn OutlineSource,
        fallback: &'a dyn OutlineSource,
    ) -> Self {
        Self {
            width,
            height,
            primary,
            fallback,
            face: FaceRole::Primary,
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            body: String::new(),
            pages: Vec::new(),
        }
    }

    /// Finished pages. Commands issued after the last page break are dropped.
    pub fn finish(self) -> Vec<String> {
        self.pages
    }

    fn push_path(&mut self, path: BezPath, color: Rgb) {
        if path.elements().is_empty() {
            return;
        }

        self.body.push_str(&format!(
            "<path d=\"{}\" fill=\"{color}\"/>\n",
            path.to_svg()
        ));
    }
}

impl Canvas for SvgCanvas<'_> {
    fn save(&mut self) {
        self.stack.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.stack.pop() {
            self.transform = transform;
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.transform = self.transform * affine;
    }

    fn select_face(&mut self, face: FaceRole) {
        self.face = face;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let path = self.transform * rect.to_path(0.1);
        self.push_path(path, color);
    }

    fn show_text(&mut self, text: &str, font_size: f64, color: Rgb) {
        let source = match self.face {
            FaceRole::Primary => self.primary,
            FaceRole::Fallback => self.fallback,
        };

        let path = self.transform * source.text_path(text, font_size);
        self.push_path(path, color);
    }

    fn show_page(&mut self) {
        let body = std::mem::take(&mut self.body);

        self.pages.push(format!(
            concat!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
                "width=\"{w}pt\" height=\"{h}pt\" viewBox=\"0 0 {w} {h}\">\n",
                "{body}",
                "</svg>\n"
            ),
            w = self.width,
            h = self.height,
            body = body,
        ));

        debug!(page = self.pages.len(), "Finished SVG page");

        self.transform = Affine::IDENTITY;
        self.stack.clear();
    }
}

/// Output path of page `index` (zero-based) out of `count`: the path itself
/// for a single page, `stem-N.ext` otherwise.
pub fn page_path(out_path: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return out_path.to_path_buf();
    }

    let stem = out_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_owned());

    let name = match out_path.extension() {
        Some(ext) => format!("{stem}-{}.{}", index + 1, ext.to_string_lossy()),
        None => format!("{stem}-{}", index + 1),
    };

    out_path.with_file_name(name)
}

/// Writes one page to its file and returns the path written.
pub fn write_page(page: &str, out_path: &Path, index: usize, count: usize) -> Result<PathBuf> {
    let path = page_path(out_path, index, count);

    fs::write(&path, page).with_context(|| format!("Failed to write output file: {path:?}"))?;

    Ok(path)
}
