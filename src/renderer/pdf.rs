//! Vector output: one PDF document, a page per [`Canvas::show_page`], text
//! filled as glyph outlines.

use std::path::Path;

use anyhow::{Context, Result};
use kurbo::{Affine, BezPath, PathEl, Point, QuadBez, Rect};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::debug;

use crate::{
    color::Rgb,
    renderer::{Canvas, FaceRole, OutlineSource},
};

pub struct PdfCanvas<'a> {
    width: f64,
    height: f64,
    primary: &'a dyn OutlineSource,
    fallback: &'a dyn OutlineSource,
    face: FaceRole,
    /// Open `q` operators on the current page.
    depth: usize,
    content: String,
    pages: Vec<Vec<u8>>,
}

/// Formats a number for a content stream, without exponents or trailing zeros.
fn num(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');

    match text {
        "-0" | "" => "0".to_owned(),
        text => text.to_owned(),
    }
}

fn point(p: Point) -> String {
    format!("{} {}", num(p.x), num(p.y))
}

impl<'a> PdfCanvas<'a> {
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
            depth: 0,
            content: String::new(),
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Builds the document from the finished pages. Commands issued after the
    /// last page break are dropped.
    pub fn finish(self) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            Object::Real(self.width as f32),
            Object::Real(self.height as f32),
        ];

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());

        for content in self.pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {},
                "MediaBox" => media_box.clone(),
            });

            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc
    }

    /// Writes the finished pages as one compressed document.
    pub fn save(self, out_path: &Path) -> Result<usize> {
        let count = self.page_count();
        let mut doc = self.finish();

        doc.compress();
        doc.save(out_path)
            .with_context(|| format!("Failed to write output file: {out_path:?}"))?;

        Ok(count)
    }

    fn set_fill(&mut self, color: Rgb) {
        let channel = |value: u8| num(f64::from(value) / 255.0);

        self.content.push_str(&format!(
            "{} {} {} rg\n",
            channel(color.r()),
            channel(color.g()),
            channel(color.b())
        ));
    }

    fn push_path(&mut self, path: &BezPath) {
        let mut start = Point::ZERO;
        let mut last = Point::ZERO;

        for el in path.elements() {
            let op = match *el {
                PathEl::MoveTo(p) => {
                    start = p;
                    last = p;
                    format!("{} m\n", point(p))
                }
                PathEl::LineTo(p) => {
                    last = p;
                    format!("{} l\n", point(p))
                }
                PathEl::QuadTo(p1, p2) => {
                    let cubic = QuadBez::new(last, p1, p2).raise();
                    last = p2;
                    format!(
                        "{} {} {} c\n",
                        point(cubic.p1),
                        point(cubic.p2),
                        point(cubic.p3)
                    )
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    last = p3;
                    format!("{} {} {} c\n", point(p1), point(p2), point(p3))
                }
                PathEl::ClosePath => {
                    last = start;
                    "h\n".to_owned()
                }
            };

            self.content.push_str(&op);
        }
    }
}

impl Canvas for PdfCanvas<'_> {
    fn save(&mut self) {
        self.depth += 1;
        self.content.push_str("q\n");
    }

    fn restore(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
            self.content.push_str("Q\n");
        }
    }

    fn transform(&mut self, affine: Affine) {
        let [a, b, c, d, e, f] = affine.as_coeffs();

        self.content.push_str(&format!(
            "{} {} {} {} {} {} cm\n",
            num(a),
            num(b),
            num(c),
            num(d),
            num(e),
            num(f)
        ));
    }

    fn select_face(&mut self, face: FaceRole) {
        self.face = face;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.set_fill(color);
        self.content.push_str(&format!(
            "{} {} {} {} re f\n",
            num(rect.x0),
            num(rect.y0),
            num(rect.width()),
            num(rect.height())
        ));
    }

    fn show_text(&mut self, text: &str, font_size: f64, color: Rgb) {
        let source = match self.face {
            FaceRole::Primary => self.primary,
            FaceRole::Fallback => self.fallback,
        };

        let path = source.text_path(text, font_size);
        if path.elements().is_empty() {
            return;
        }

        self.set_fill(color);
        self.push_path(&path);
        self.content.push_str("f\n");
    }

    fn show_page(&mut self) {
        let body = std::mem::take(&mut self.content);
        let unclosed = "Q\n".repeat(self.depth);

        // Canvas space is y-down from the top-left corner.
        let content = format!(
            "q 1 0 0 -1 0 {} cm\n{body}{unclosed}Q\n",
            num(self.height)
        );
        self.pages.push(content.into_bytes());

        debug!(page = self.pages.len(), "Finished PDF page");

        self.depth = 0;
    }
}
