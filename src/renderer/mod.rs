pub mod fit;
pub mod pdf;
pub mod place;
pub mod svg;

use std::{
    f64::consts::FRAC_PI_2,
    ops::{Deref, DerefMut},
};

use kurbo::{Affine, BezPath, Point, Rect};

use crate::{color::Rgb, font::OutlineFont};

/// Direction text runs in on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
    /// Rows left to right, stacked top to bottom.
    #[default]
    Horizontal,
    /// Columns top to bottom, stacked right to left.
    Vertical,
}

/// Which of the two loaded faces text is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceRole {
    #[default]
    Primary,
    /// Face used for the error page when the primary face lacks coverage.
    Fallback,
}

/// A 2-D vector surface receiving draw commands, one page at a time.
///
/// Transform state is a stack: [`save_state`] pushes it and restores it when
/// the returned guard drops.
pub trait Canvas {
    fn save(&mut self);

    fn restore(&mut self);

    /// Pre-multiplies `affine` onto the current transform.
    fn transform(&mut self, affine: Affine);

    fn select_face(&mut self, face: FaceRole);

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Draws `text` with its baseline origin at (0, 0) of the current transform.
    fn show_text(&mut self, text: &str, font_size: f64, color: Rgb);

    fn show_page(&mut self);
}

/// Anything that can turn a string into an outline, baseline at the origin.
/// Vector backends draw text through it.
pub trait OutlineSource {
    fn text_path(&self, text: &str, font_size: f64) -> BezPath;
}

impl OutlineSource for OutlineFont {
    fn text_path(&self, text: &str, font_size: f64) -> BezPath {
        OutlineFont::text_path(self, text, font_size)
    }
}

/// Saved canvas state; restored on drop, including early returns and unwinding.
pub struct SavedState<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

pub fn save_state<C: Canvas + ?Sized>(canvas: &mut C) -> SavedState<'_, C> {
    canvas.save();

    SavedState { canvas }
}

impl<C: Canvas + ?Sized> Deref for SavedState<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> DerefMut for SavedState<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> Drop for SavedState<'_, C> {
    fn drop(&mut self) {
        self.canvas.restore();
    }
}

/// Quarter turns applied to rotated glyphs. Angles follow the canvas's y-down
/// convention, so a positive angle turns clockwise on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn radians(self) -> f64 {
        match self {
            Rotation::None => 0.0,
            Rotation::Clockwise => FRAC_PI_2,
            Rotation::CounterClockwise => -FRAC_PI_2,
        }
    }
}

/// Where and how one character unit is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlacement {
    pub text: String,
    pub font_size: f64,
    /// Baseline origin on the page.
    pub origin: Point,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Flip the glyph's y axis before rotating (vertical dashes).
    pub mirror_y: bool,
    pub rotation: Rotation,
}

impl GlyphPlacement {
    /// Translate, then scale, then rotate, the way the glyph is drawn.
    pub fn affine(&self) -> Affine {
        let scale_y = if self.mirror_y {
            -self.scale_y
        } else {
            self.scale_y
        };

        Affine::translate(self.origin.to_vec2())
            * Affine::scale_non_uniform(self.scale_x, scale_y)
            * Affine::rotate(self.rotation.radians())
    }
}

/// Draws each placement under its own saved transform.
pub fn draw_placements<C: Canvas + ?Sized>(
    canvas: &mut C,
    placements: &[GlyphPlacement],
    color: Rgb,
) {
    for placement in placements {
        let mut state = save_state(canvas);
        state.transform(placement.affine());
        state.show_text(&placement.text, placement.font_size, color);
    }
}

/// A command captured by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        transform: Affine,
        color: Rgb,
    },
    Text {
        text: String,
        font_size: f64,
        transform: Affine,
        face: FaceRole,
        color: Rgb,
    },
}

/// Canvas that keeps every command, page by page.
#[derive(Debug)]
pub struct RecordingCanvas {
    pub pages: Vec<Vec<DrawCommand>>,
    current: Vec<DrawCommand>,
    transform: Affine,
    stack: Vec<Affine>,
    face: FaceRole,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            face: FaceRole::Primary,
        }
    }

    /// Commands issued since the last [`Canvas::show_page`].
    pub fn pending(&self) -> &[DrawCommand] {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for RecordingCanvas {
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
        self.current.push(DrawCommand::FillRect {
            rect,
            transform: self.transform,
            color,
        });
    }

    fn show_text(&mut self, text: &str, font_size: f64, color: Rgb) {
        self.current.push(DrawCommand::Text {
            text: text.to_owned(),
            font_size,
            transform: self.transform,
            face: self.face,
            color,
        });
    }

    fn show_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.transform = Affine::IDENTITY;
        self.stack.clear();
    }
}
