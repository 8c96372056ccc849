//! A structurally-typed model of MapLibre style documents.
//!
//! Only the parts this system rewrites are modeled as fields; everything else is carried
//! verbatim through flattened maps, so reading and re-serializing a style never loses
//! unknown properties.

mod document;
mod fonts;
mod source;
mod sprite;

pub use document::{StyleDocument, METADATA_BOUNDS, METADATA_MAXZOOM, METADATA_SOURCE_FOLDERS};
pub use fonts::{collect_font_stacks, first_match, replace_font_stacks};
pub use source::{GeoJsonSource, Source, TileSetSource};
pub use sprite::{SpriteDef, SpriteEntry, DEFAULT_SPRITE_ID};
