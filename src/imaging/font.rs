//! Caption fonts: measurement, drawing, and resolution.
//!
//! [`Typeface`] is the seam the caption renderer works against. Two
//! implementations ship:
//!
//! - [`OutlineFont`]: a TrueType/OpenType face read with `ttf-parser`;
//!   glyph outlines are converted into tiny-skia paths and filled.
//! - [`BitmapFont`](super::bitmap_font::BitmapFont): the built-in 5×7 font.
//!
//! [`resolve_typeface`] walks the configured candidates (family names looked
//! up in the system font database, or font file paths), then the generic
//! sans-serif family, then falls back to the bitmap font. It never fails.

use resvg::tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use usvg::fontdb::{Database, Family, Query};

use super::bitmap_font::BitmapFont;
use crate::config::Rgba;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Font parse error: {0}")]
    Parse(String),
}

/// A font that can measure and draw single lines of text.
pub trait Typeface: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Advance width of `text` at `size` px.
    fn measure(&self, text: &str, size: f32) -> f32;

    /// Height of one line at `size` px.
    fn line_height(&self, size: f32) -> f32;

    /// Draw `text` with the top-left corner of its line box at `(x, y)`.
    fn draw(&self, pixmap: &mut Pixmap, text: &str, x: f32, y: f32, size: f32, color: Rgba);
}

/// A TrueType/OpenType face held in memory.
///
/// Line metrics and ASCII advances are read once at construction, so
/// measuring during word wrap does not re-parse the face. Other characters
/// and glyph outlines parse the face once per call.
pub struct OutlineFont {
    name: String,
    data: Arc<[u8]>,
    index: u32,
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    ascii_advances: [f32; 128],
}

impl std::fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFont")
            .field("name", &self.name)
            .field("index", &self.index)
            .finish()
    }
}

impl OutlineFont {
    /// Wrap raw font data, checking that the face parses.
    pub fn from_data(name: impl Into<String>, data: Vec<u8>, index: u32) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(&data, index)
            .map_err(|e| FontError::Parse(e.to_string()))?;
        if face.units_per_em() == 0 {
            return Err(FontError::Parse("units per em is zero".to_string()));
        }
        let mut ascii_advances = [0.0; 128];
        for (code, advance) in ascii_advances.iter_mut().enumerate() {
            *advance = advance_units(&face, char::from(code as u8));
        }
        let (units_per_em, ascender, descender) = (
            face.units_per_em() as f32,
            face.ascender() as f32,
            face.descender() as f32,
        );
        Ok(Self {
            name: name.into(),
            data: data.into(),
            index,
            units_per_em,
            ascender,
            descender,
            ascii_advances,
        })
    }

    /// Read a font file from disk.
    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::from_data(path.display().to_string(), data, 0)
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }
}

fn advance_units(face: &ttf_parser::Face<'_>, c: char) -> f32 {
    let fallback = face.units_per_em() as f32 * 0.5;
    face.glyph_index(c)
        .and_then(|g| face.glyph_hor_advance(g))
        .map(|a| a as f32)
        .unwrap_or(fallback)
}

impl Typeface for OutlineFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn measure(&self, text: &str, size: f32) -> f32 {
        let scale = size / self.units_per_em;
        let mut face = None;
        let mut units = 0.0;
        for c in text.chars() {
            units += match self.ascii_advances.get(c as usize) {
                Some(advance) => *advance,
                None => match face.get_or_insert_with(|| self.face()) {
                    Some(face) => advance_units(face, c),
                    None => self.units_per_em * 0.5,
                },
            };
        }
        units * scale
    }

    fn line_height(&self, size: f32) -> f32 {
        (self.ascender - self.descender) * size / self.units_per_em
    }

    fn draw(&self, pixmap: &mut Pixmap, text: &str, x: f32, y: f32, size: f32, color: Rgba) {
        let Some(face) = self.face() else {
            return;
        };
        let scale = size / self.units_per_em;
        let baseline = y + self.ascender * scale;

        let [r, g, b, a] = color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        let mut pen = x;
        for c in text.chars() {
            if let Some(glyph) = face.glyph_index(c) {
                let mut outline = GlyphPath {
                    builder: PathBuilder::new(),
                    origin_x: pen,
                    baseline,
                    scale,
                };
                if face.outline_glyph(glyph, &mut outline).is_some() {
                    if let Some(path) = outline.builder.finish() {
                        pixmap.fill_path(
                            &path,
                            &paint,
                            FillRule::Winding,
                            Transform::identity(),
                            None,
                        );
                    }
                }
            }
            pen += advance_units(&face, c) * scale;
        }
    }
}

/// Adapter from font units (y up) to pixel space (y down).
struct GlyphPath {
    builder: PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphPath {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for GlyphPath {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Whether a font candidate names a file rather than a family.
pub fn is_font_path(candidate: &str) -> bool {
    let lower = candidate.to_ascii_lowercase();
    candidate.contains('/')
        || candidate.contains('\\')
        || [".ttf", ".otf", ".ttc"].iter().any(|ext| lower.ends_with(ext))
}

fn query_family(db: &Database, family: Family<'_>, name: &str) -> Option<OutlineFont> {
    let families = [family];
    let id = db.query(&Query {
        families: &families,
        ..Default::default()
    })?;
    db.with_face_data(id, |data, index| {
        OutlineFont::from_data(name, data.to_vec(), index)
    })?
    .ok()
}

fn system_fonts(db: &mut Option<Database>) -> &Database {
    db.get_or_insert_with(|| {
        let mut d = Database::new();
        d.load_system_fonts();
        d
    })
}

/// Resolve the caption typeface from an ordered candidate list.
///
/// System fonts are only loaded when a family lookup is actually needed.
pub fn resolve_typeface(candidates: &[String]) -> Arc<dyn Typeface> {
    let mut db: Option<Database> = None;

    for candidate in candidates {
        let found = if is_font_path(candidate) {
            match OutlineFont::from_file(Path::new(candidate)) {
                Ok(font) => Some(font),
                Err(e) => {
                    tracing::debug!(font = %candidate, error = %e, "font file unusable");
                    None
                }
            }
        } else {
            query_family(system_fonts(&mut db), Family::Name(candidate), candidate)
        };
        if let Some(font) = found {
            tracing::debug!(font = %font.name(), "caption font resolved");
            return Arc::new(font);
        }
    }

    if let Some(font) = query_family(system_fonts(&mut db), Family::SansSerif, "sans-serif") {
        tracing::debug!(font = %font.name(), "caption font resolved to generic family");
        return Arc::new(font);
    }

    tracing::warn!("no outline font found, captions use the built-in bitmap font");
    Arc::new(BitmapFont)
}
