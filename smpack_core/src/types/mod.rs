//! Leaf data types: blobs, geographical and tile bounding boxes, coordinates, formats,
//! and glyph ranges.

mod blob;
mod geo_bbox;
mod glyph_range;
mod tile_bbox;
mod tile_coord;
mod tile_format;

pub use blob::Blob;
pub use geo_bbox::{GeoBBox, MAX_MERCATOR_LAT};
pub use glyph_range::GlyphRange;
pub use tile_bbox::TileBBox;
pub use tile_coord::TileCoord;
pub use tile_format::TileFormat;
