use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context, Result, anyhow};
use fontcull_read_fonts::{FileRef, FontRef, TableProvider};
use fontcull_skrifa::{
    MetadataProvider,
    instance::{LocationRef, Size},
    string::StringId,
};
use glob::glob;
use kurbo::{Affine, BezPath, Rect, Shape, Vec2};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::{
    metrics::{FontExtents, MetricsProvider, TextExtents},
    pen::GlyphPen,
};

/// One glyph in font units, y down.
pub struct GlyphOutline {
    pub advance: f64,
    pub path: BezPath,
    pub ink: Option<Rect>,
}

/// A face loaded from a font file or collection, measured and drawn from its
/// outlines.
///
/// Characters the charmap does not cover have neither ink nor advance; this
/// is what makes a coverage check on an exemplar glyph fail.
pub struct OutlineFont {
    data: Vec<u8>,
    index: u32,
    family: String,
    upem: f64,
    ascent: f64,
    descent: f64,
    leading: f64,
    glyphs: RefCell<FxHashMap<char, Option<Rc<GlyphOutline>>>>,
}

impl OutlineFont {
    pub fn load(path: &Path, index: u32) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("Failed to read font file: {path:?}"))?;

        Self::from_data(data, index).with_context(|| format!("Failed to load font: {path:?}"))
    }

    pub fn from_data(data: Vec<u8>, index: u32) -> Result<Self> {
        let (family, upem, ascent, descent, leading) = {
            let font = FontRef::from_index(&data, index)
                .map_err(|e| anyhow!("Failed to parse font #{index}: {:?}", e))?;

            let upem = font.head()?.units_per_em() as f64;
            let metrics = font.metrics(Size::unscaled(), LocationRef::default());

            (
                family_name(&font),
                upem,
                metrics.ascent as f64,
                -(metrics.descent as f64),
                metrics.leading as f64,
            )
        };

        if upem <= 0.0 {
            return Err(anyhow!("Font #{index} has no units per em"));
        }

        debug!(family = %family, upem, ascent, descent, "Loaded font");

        Ok(Self {
            data,
            index,
            family,
            upem,
            ascent,
            descent,
            leading,
            glyphs: RefCell::new(FxHashMap::default()),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    fn font_ref(&self) -> Result<FontRef<'_>> {
        FontRef::from_index(&self.data, self.index)
            .map_err(|e| anyhow!("Failed to parse font #{}: {:?}", self.index, e))
    }

    fn scale(&self, font_size: f64) -> f64 {
        font_size / self.upem
    }

    /// Cached outline for `c`, or `None` when the charmap has no glyph for it.
    pub fn glyph(&self, c: char) -> Option<Rc<GlyphOutline>> {
        if let Some(hit) = self.glyphs.borrow().get(&c) {
            return hit.clone();
        }

        let outline = match self.load_glyph(c) {
            Ok(outline) => outline.map(Rc::new),
            Err(err) => {
                warn!("Failed to load glyph for {c:?}: {err:#}");
                None
            }
        };

        self.glyphs.borrow_mut().insert(c, outline.clone());

        outline
    }

    fn load_glyph(&self, c: char) -> Result<Option<GlyphOutline>> {
        let font = self.font_ref()?;

        let gid = match font.charmap().map(c) {
            Some(gid) if gid.to_u32() != 0 => gid,
            _ => return Ok(None),
        };

        let advance = font
            .glyph_metrics(Size::unscaled(), LocationRef::default())
            .advance_width(gid)
            .unwrap_or(0.0) as f64;

        let mut pen = GlyphPen::new();

        if let Some(glyph) = font.outline_glyphs().get(gid) {
            glyph
                .draw(Size::unscaled(), &mut pen)
                .map_err(|e| anyhow!("Failed to draw glyph {}: {:?}", gid.to_u32(), e))?;
        }

        let ink = (!pen.path.elements().is_empty()).then(|| pen.path.bounding_box());

        Ok(Some(GlyphOutline {
            advance,
            path: pen.path,
            ink,
        }))
    }

    /// Outline of `text` set on a baseline through the origin, in device units.
    pub fn text_path(&self, text: &str, font_size: f64) -> BezPath {
        let scale = self.scale(font_size);
        let mut out = BezPath::new();
        let mut pen_x = 0.0;

        for c in text.chars() {
            let Some(glyph) = self.glyph(c) else {
                continue;
            };

            let xform = Affine::scale(scale) * Affine::translate((pen_x, 0.0));
            out.extend((xform * glyph.path.clone()).elements().iter().copied());

            pen_x += glyph.advance;
        }

        out
    }
}

impl MetricsProvider for OutlineFont {
    fn text_extents(&self, text: &str, font_size: f64) -> TextExtents {
        let scale = self.scale(font_size);
        let mut pen_x = 0.0;
        let mut ink: Option<Rect> = None;

        for c in text.chars() {
            let Some(glyph) = self.glyph(c) else {
                continue;
            };

            if let Some(glyph_ink) = glyph.ink {
                let placed = glyph_ink + Vec2::new(pen_x, 0.0);
                ink = Some(ink.map_or(placed, |ink| ink.union(placed)));
            }

            pen_x += glyph.advance;
        }

        let ink = ink.unwrap_or(Rect::ZERO);

        TextExtents {
            x_bearing: ink.x0 * scale,
            y_bearing: ink.y0 * scale,
            width: ink.width() * scale,
            height: ink.height() * scale,
            x_advance: pen_x * scale,
        }
    }

    fn font_extents(&self, font_size: f64) -> FontExtents {
        let scale = self.scale(font_size);

        FontExtents {
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            height: (self.ascent + self.descent + self.leading) * scale,
        }
    }
}

fn family_name(font: &FontRef) -> String {
    font.localized_strings(StringId::FAMILY_NAME)
        .english_or_first()
        .map(|name| name.chars().collect())
        .unwrap_or_default()
}

/// A face discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    pub family: String,
    pub path: PathBuf,
    pub index: u32,
}

/// Lists every face in the files matched by `patterns`, sorted by family.
/// Unreadable files are skipped with a warning.
pub fn list_fonts(patterns: &[String]) -> Result<Vec<FontEntry>> {
    let mut entries = Vec::new();

    for pattern in patterns {
        let paths =
            glob(pattern).with_context(|| format!("Failed to expand glob pattern: {pattern:?}"))?;

        for path in paths.flatten().filter(|path| path.is_file()) {
            match faces_in_file(&path) {
                Ok(faces) => entries.extend(faces),
                Err(err) => warn!("Skipping {path:?}: {err:#}"),
            }
        }
    }

    entries.sort_by(|a, b| a.family.cmp(&b.family).then_with(|| a.path.cmp(&b.path)));
    entries.dedup();

    Ok(entries)
}

fn faces_in_file(path: &Path) -> Result<Vec<FontEntry>> {
    let data = fs::read(path).with_context(|| format!("Failed to read font file: {path:?}"))?;
    let file = FileRef::new(&data).map_err(|e| anyhow!("Failed to parse font file: {:?}", e))?;

    let mut entries = Vec::new();

    for (index, font) in file.fonts().enumerate() {
        let font = font.map_err(|e| anyhow!("Failed to load font #{index}: {:?}", e))?;

        entries.push(FontEntry {
            family: family_name(&font),
            path: path.to_path_buf(),
            index: index as u32,
        });
    }

    Ok(entries)
}

/// Opens `name` as a font file if such a path exists, otherwise looks the
/// family up (case-insensitively) in the files matched by `patterns`.
pub fn resolve_font(name: &str, patterns: &[String]) -> Result<OutlineFont> {
    let path = Path::new(name);

    if path.is_file() {
        return OutlineFont::load(path, 0);
    }

    let entry = list_fonts(patterns)?
        .into_iter()
        .find(|entry| entry.family.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("Font not found: {name:?} (searched {patterns:?})"))?;

    OutlineFont::load(&entry.path, entry.index)
}
