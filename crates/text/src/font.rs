use crate::error::FontError;
use glam::Vec2;
use lyon_path::math::{Point, point};
use serde::Deserialize;
use std::collections::HashMap;
use ttf_parser::{Face, OutlineBuilder};

/// Glyph used when a character is missing from the font.
const FALLBACK_GLYPH: char = '?';

/// Typeface JSON font: glyph outlines in font units.
#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, TypefaceGlyph>,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
    pub resolution: f32,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypefaceGlyph {
    /// Horizontal advance.
    pub ha: f32,
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    /// Outline commands; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

impl Typeface {
    fn glyph(&self, ch: char) -> Option<&TypefaceGlyph> {
        let mut buf = [0u8; 4];
        self.glyphs.get(ch.encode_utf8(&mut buf) as &str).or_else(|| {
            tracing::warn!(?ch, "glyph missing, using fallback");
            self.glyphs
                .get(FALLBACK_GLYPH.encode_utf8(&mut buf) as &str)
        })
    }
}

enum FontKind {
    Typeface(Typeface),
    OpenType(Vec<u8>),
}

/// A parsed font, ready to outline text.
pub struct Font {
    kind: FontKind,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            FontKind::Typeface(t) => format!("Typeface({})", t.family_name),
            FontKind::OpenType(bytes) => format!("OpenType({} bytes)", bytes.len()),
        };
        f.debug_struct("Font").field("kind", &kind).finish()
    }
}

impl Font {
    /// Parse typeface JSON or an OpenType/TrueType binary.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FontError> {
        let is_json = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'{');
        if is_json {
            let typeface: Typeface = serde_json::from_slice(&bytes)?;
            if typeface.resolution <= 0.0 {
                return Err(FontError::InvalidFont(format!(
                    "resolution must be positive, got {}",
                    typeface.resolution
                )));
            }
            return Ok(Self {
                kind: FontKind::Typeface(typeface),
            });
        }
        Face::parse(&bytes, 0).map_err(|e| FontError::InvalidFont(e.to_string()))?;
        Ok(Self {
            kind: FontKind::OpenType(bytes),
        })
    }

    pub fn family_name(&self) -> String {
        match &self.kind {
            FontKind::Typeface(t) => t.family_name.clone(),
            FontKind::OpenType(bytes) => Face::parse(bytes, 0)
                .ok()
                .and_then(|face| {
                    face.names()
                        .into_iter()
                        .find(|n| n.name_id == ttf_parser::name_id::FAMILY && n.is_unicode())
                        .and_then(|n| n.to_string())
                })
                .unwrap_or_default(),
        }
    }

    /// Lay out `text` at `size` world units per em, appending glyph outlines
    /// to `builder`. Lines start at x = 0 and step down by the line height.
    /// Returns the number of glyphs that produced outlines.
    pub fn outline_text(
        &self,
        text: &str,
        size: f32,
        builder: &mut lyon_path::path::Builder,
    ) -> Result<usize, FontError> {
        match &self.kind {
            FontKind::Typeface(typeface) => outline_typeface(typeface, text, size, builder),
            FontKind::OpenType(bytes) => {
                let face =
                    Face::parse(bytes, 0).map_err(|e| FontError::InvalidFont(e.to_string()))?;
                outline_opentype(&face, text, size, builder)
            }
        }
    }
}

fn outline_typeface(
    typeface: &Typeface,
    text: &str,
    size: f32,
    builder: &mut lyon_path::path::Builder,
) -> Result<usize, FontError> {
    let scale = size / typeface.resolution;
    let bbox = typeface.bounding_box;
    let line_height = (bbox.y_max - bbox.y_min + typeface.underline_thickness) * scale;
    let mut offset = Vec2::ZERO;
    let mut drawn = 0;

    for ch in text.chars() {
        if ch == '\n' {
            offset.x = 0.0;
            offset.y -= line_height;
            continue;
        }
        let Some(glyph) = typeface.glyph(ch) else {
            continue;
        };
        if let Some(outline) = glyph.o.as_deref() {
            if emit_commands(outline, scale, offset, builder)? {
                drawn += 1;
            }
        }
        offset.x += glyph.ha * scale;
    }
    Ok(drawn)
}

struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
    scale: f32,
    offset: Vec2,
}

impl Tokens<'_> {
    fn number(&mut self) -> Result<f32, FontError> {
        let token = self
            .iter
            .next()
            .ok_or_else(|| FontError::InvalidFont("outline ended mid-command".into()))?;
        token
            .parse::<f32>()
            .map_err(|_| FontError::InvalidFont(format!("bad outline number {token:?}")))
    }

    fn point(&mut self) -> Result<Point, FontError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(point(
            x * self.scale + self.offset.x,
            y * self.scale + self.offset.y,
        ))
    }
}

/// Replay one glyph's outline commands. Curves list the end point first,
/// then the control point(s). Returns whether any contour was emitted.
fn emit_commands(
    outline: &str,
    scale: f32,
    offset: Vec2,
    builder: &mut lyon_path::path::Builder,
) -> Result<bool, FontError> {
    let mut tokens = Tokens {
        iter: outline.split_whitespace(),
        scale,
        offset,
    };
    let mut open = false;
    let mut emitted = false;

    while let Some(command) = tokens.iter.next() {
        match command {
            "m" => {
                let at = tokens.point()?;
                if open {
                    builder.end(true);
                }
                builder.begin(at);
                open = true;
                emitted = true;
            }
            "l" | "q" | "b" if !open => {
                return Err(FontError::InvalidFont(format!(
                    "'{command}' before any 'm'"
                )));
            }
            "l" => {
                let to = tokens.point()?;
                builder.line_to(to);
            }
            "q" => {
                let to = tokens.point()?;
                let ctrl = tokens.point()?;
                builder.quadratic_bezier_to(ctrl, to);
            }
            "b" => {
                let to = tokens.point()?;
                let ctrl1 = tokens.point()?;
                let ctrl2 = tokens.point()?;
                builder.cubic_bezier_to(ctrl1, ctrl2, to);
            }
            "z" => {
                if open {
                    builder.end(true);
                    open = false;
                }
            }
            other => {
                return Err(FontError::InvalidFont(format!(
                    "unknown outline command {other:?}"
                )));
            }
        }
    }
    if open {
        builder.end(true);
    }
    Ok(emitted)
}

struct PathSink<'a> {
    builder: &'a mut lyon_path::path::Builder,
    scale: f32,
    offset: Vec2,
    open: bool,
}

impl PathSink<'_> {
    fn map(&self, x: f32, y: f32) -> Point {
        point(
            self.offset.x + x * self.scale,
            self.offset.y + y * self.scale,
        )
    }
}

impl OutlineBuilder for PathSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.open {
            self.builder.end(true);
        }
        let at = self.map(x, y);
        self.builder.begin(at);
        self.open = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let to = self.map(x, y);
        self.builder.line_to(to);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let ctrl = self.map(x1, y1);
        let to = self.map(x, y);
        self.builder.quadratic_bezier_to(ctrl, to);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let ctrl1 = self.map(x1, y1);
        let ctrl2 = self.map(x2, y2);
        let to = self.map(x, y);
        self.builder.cubic_bezier_to(ctrl1, ctrl2, to);
    }

    fn close(&mut self) {
        if self.open {
            self.builder.end(true);
            self.open = false;
        }
    }
}

fn outline_opentype(
    face: &Face<'_>,
    text: &str,
    size: f32,
    builder: &mut lyon_path::path::Builder,
) -> Result<usize, FontError> {
    let units = face.units_per_em() as f32;
    if units <= 0.0 {
        return Err(FontError::InvalidFont("units per em is zero".into()));
    }
    let scale = size / units;
    let line_height =
        (face.ascender() as f32 - face.descender() as f32 + face.line_gap() as f32) * scale;
    let mut offset = Vec2::ZERO;
    let mut drawn = 0;

    for ch in text.chars() {
        if ch == '\n' {
            offset.x = 0.0;
            offset.y -= line_height;
            continue;
        }
        let Some(gid) = face
            .glyph_index(ch)
            .or_else(|| face.glyph_index(FALLBACK_GLYPH))
        else {
            tracing::warn!(?ch, "glyph missing and no fallback");
            continue;
        };
        let mut sink = PathSink {
            builder: &mut *builder,
            scale,
            offset,
            open: false,
        };
        if face.outline_glyph(gid, &mut sink).is_some() {
            drawn += 1;
        }
        if sink.open {
            sink.builder.end(true);
        }
        offset.x += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
    }
    Ok(drawn)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lyon_path::Path;

    /// A two-glyph typeface: a square "O" with a square hole, and a bar "?".
    pub(crate) fn test_typeface_json() -> String {
        r#"{
            "familyName": "Test Sans",
            "resolution": 1000,
            "underlineThickness": 50,
            "boundingBox": { "xMin": 0, "xMax": 1000, "yMin": -200, "yMax": 800 },
            "glyphs": {
                "O": { "ha": 1000, "x_min": 0, "x_max": 800,
                       "o": "m 0 0 l 800 0 l 800 800 l 0 800 l 0 0 m 200 200 l 200 600 l 600 600 l 600 200 l 200 200" },
                "?": { "ha": 500, "o": "m 0 0 l 300 0 l 300 700 l 0 700 l 0 0" },
                " ": { "ha": 300 },
                "C": { "ha": 900, "o": "m 0 0 q 800 0 400 -300 l 800 800 b 0 800 600 1000 200 1000 z" }
            }
        }"#
        .to_string()
    }

    fn typeface_font() -> Font {
        Font::from_bytes(test_typeface_json().into_bytes()).unwrap()
    }

    #[test]
    fn parses_typeface_json() {
        let font = typeface_font();
        assert_eq!(font.family_name(), "Test Sans");
    }

    #[test]
    fn outlines_count_glyphs() {
        let font = typeface_font();
        let mut builder = Path::builder();
        let drawn = font.outline_text("O O", 1.0, &mut builder).unwrap();
        assert_eq!(drawn, 2);
        let path = builder.build();
        let begins = path
            .iter()
            .filter(|e| matches!(e, lyon_path::Event::Begin { .. }))
            .count();
        assert_eq!(begins, 4);
    }

    #[test]
    fn missing_glyph_uses_fallback() {
        let font = typeface_font();
        let mut builder = Path::builder();
        let drawn = font.outline_text("Z", 1.0, &mut builder).unwrap();
        assert_eq!(drawn, 1);
    }

    #[test]
    fn curves_parse() {
        let font = typeface_font();
        let mut builder = Path::builder();
        assert_eq!(font.outline_text("C", 1.0, &mut builder).unwrap(), 1);
        let path = builder.build();
        assert!(path
            .iter()
            .any(|e| matches!(e, lyon_path::Event::Quadratic { .. })));
        assert!(path
            .iter()
            .any(|e| matches!(e, lyon_path::Event::Cubic { .. })));
    }

    #[test]
    fn malformed_outline_is_rejected() {
        let mut builder = Path::builder();
        let err = emit_commands("l 0 0", 1.0, Vec2::ZERO, &mut builder).unwrap_err();
        assert!(matches!(err, FontError::InvalidFont(_)));
        let mut builder = Path::builder();
        let err = emit_commands("m 0", 1.0, Vec2::ZERO, &mut builder).unwrap_err();
        assert!(matches!(err, FontError::InvalidFont(_)));
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(matches!(
            Font::from_bytes(b"not a font".to_vec()),
            Err(FontError::InvalidFont(_))
        ));
        assert!(matches!(
            Font::from_bytes(b"{ \"glyphs\": 3 }".to_vec()),
            Err(FontError::Json(_))
        ));
    }
}
