//! Extruded 3D text: font sources, glyph outlines and mesh extrusion.
//!
//! Two font formats are understood: typeface JSON (glyph outlines as
//! `m`/`l`/`q`/`b` command strings) and OpenType/TrueType binaries.
//! Outlines are tessellated into front and back caps and joined by
//! side walls, then centered on their bounding box.

mod error;
mod extrude;
mod font;
mod source;

pub use error::FontError;
pub use extrude::{TextGeometryParams, build_text_mesh};
pub use font::{Font, Typeface, TypefaceGlyph};
pub use source::FontSource;

/// URL of the default font used by the text variant.
pub const DEFAULT_FONT_URL: &str =
    "https://threejs.org/examples/fonts/helvetiker_regular.typeface.json";
