//! Canonical archive paths, internal URIs, and content-type classification.
//!
//! Everything in a styled map package lives at a well-known path:
//!
//! ```text
//! VERSION
//! style.json
//! s/{source}/{z}/{x}/{y}.{ext}
//! fonts/{fontstack}/{range}.pbf.gz
//! sprites/{id}/sprite[@{r}x].{json|png}
//! ```
//!
//! Inside the style document these paths appear as `smp://maps.v1/{path}` URIs. All
//! functions here are pure; no I/O.

use crate::{GlyphRange, SmpError, TileCoord, TileFormat};
use anyhow::Result;

/// Path of the style document.
pub const STYLE_PATH: &str = "style.json";

/// Path of the format-version marker.
pub const VERSION_PATH: &str = "VERSION";

/// Content of the `VERSION` entry, `MAJOR.MINOR` plus a trailing newline.
pub const FORMAT_VERSION: &str = "1.0";

/// Format-version majors this implementation can read.
pub const SUPPORTED_MAJOR_VERSIONS: &[u32] = &[1];

/// Scheme + authority of internal URIs. A breaking format change bumps the path
/// component (`maps.v2`).
pub const URI_PREFIX: &str = "smp://maps.v1/";

/// The kind of resource an archive path refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResourceKind {
	Style,
	Version,
	Tile,
	Glyph,
	Sprite,
}

/// Classifies an archive path by its prefix.
pub fn resource_kind(path: &str) -> Result<ResourceKind> {
	if path == STYLE_PATH {
		Ok(ResourceKind::Style)
	} else if path == VERSION_PATH {
		Ok(ResourceKind::Version)
	} else if path.starts_with("fonts/") {
		Ok(ResourceKind::Glyph)
	} else if path.starts_with("sprites/") {
		Ok(ResourceKind::Sprite)
	} else if path.starts_with("s/") {
		Ok(ResourceKind::Tile)
	} else {
		Err(SmpError::UnknownResourceType(path.to_string()).into())
	}
}

/// Returns the content type for an archive path by ordered suffix match.
pub fn content_type(path: &str) -> Result<&'static str> {
	const TABLE: &[(&str, &str)] = &[
		(".json", "application/json"),
		(".pbf.gz", "application/x-protobuf"),
		(".pbf", "application/x-protobuf"),
		(".png", "image/png"),
		(".jpg", "image/jpeg"),
		(".webp", "image/webp"),
		(".mvt.gz", "application/vnd.mapbox-vector-tile"),
		(".mvt", "application/vnd.mapbox-vector-tile"),
	];
	for (suffix, content_type) in TABLE {
		if path.ends_with(suffix) {
			return Ok(content_type);
		}
	}
	Err(SmpError::UnknownContentType(path.to_string()).into())
}

/// Archive path of a tile.
pub fn tile_path(folder: &str, coord: &TileCoord, format: TileFormat) -> String {
	format!(
		"s/{folder}/{}/{}/{}{}",
		coord.level,
		coord.x,
		coord.y,
		format.as_extension()
	)
}

/// Tile path template of a source, with `{z}`, `{x}`, `{y}` placeholders.
pub fn tile_template_path(folder: &str, format: TileFormat) -> String {
	format!("s/{folder}/{{z}}/{{x}}/{{y}}{}", format.as_extension())
}

/// Archive path of a glyph range.
pub fn glyph_path(fontstack: &str, range: &GlyphRange) -> String {
	format!("fonts/{fontstack}/{range}.pbf.gz")
}

/// Glyph path template, with `{fontstack}` and `{range}` placeholders.
pub fn glyph_template_path() -> String {
	"fonts/{fontstack}/{range}.pbf.gz".to_string()
}

/// Archive path of one sprite file. `pixel_ratio` 1 has no `@{r}x` infix.
pub fn sprite_path(id: &str, pixel_ratio: u8, ext: &str) -> String {
	format!("{}{}{ext}", sprite_base_path(id), pixel_ratio_suffix(pixel_ratio))
}

/// Extension-less base path of a sprite, as referenced from the style.
pub fn sprite_base_path(id: &str) -> String {
	format!("sprites/{id}/sprite")
}

/// The `@{r}x` infix for a pixel ratio; empty for ratio 1.
pub fn pixel_ratio_suffix(pixel_ratio: u8) -> String {
	if pixel_ratio <= 1 {
		String::new()
	} else {
		format!("@{pixel_ratio}x")
	}
}

/// Turns an archive path into an internal `smp://` URI.
pub fn internal_uri(path: &str) -> String {
	format!("{URI_PREFIX}{path}")
}

/// Extracts the archive path from an internal URI; `None` for external URLs.
pub fn internal_path(uri: &str) -> Option<&str> {
	uri.strip_prefix(URI_PREFIX)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classification() {
		assert_eq!(resource_kind("style.json").unwrap(), ResourceKind::Style);
		assert_eq!(resource_kind("VERSION").unwrap(), ResourceKind::Version);
		assert_eq!(resource_kind("fonts/Open Sans/0-255.pbf.gz").unwrap(), ResourceKind::Glyph);
		assert_eq!(resource_kind("sprites/default/sprite.png").unwrap(), ResourceKind::Sprite);
		assert_eq!(resource_kind("s/osm/3/1/2.mvt.gz").unwrap(), ResourceKind::Tile);
		assert!(resource_kind("somewhere/else.txt").is_err());
	}

	#[test]
	fn content_types_match_longest_suffix_first() {
		assert_eq!(content_type("fonts/Arial/0-255.pbf.gz").unwrap(), "application/x-protobuf");
		assert_eq!(content_type("fonts/Arial/0-255.pbf").unwrap(), "application/x-protobuf");
		assert_eq!(
			content_type("s/osm/3/1/2.mvt.gz").unwrap(),
			"application/vnd.mapbox-vector-tile"
		);
		assert_eq!(content_type("sprites/default/sprite.json").unwrap(), "application/json");
		assert_eq!(content_type("sprites/default/sprite@2x.png").unwrap(), "image/png");
		assert!(content_type("VERSION").is_err());
	}

	#[test]
	fn tile_paths() {
		let coord = TileCoord::new(3, 1, 2).unwrap();
		assert_eq!(tile_path("osm", &coord, TileFormat::MVT), "s/osm/3/1/2.mvt.gz");
		assert_eq!(tile_path("sat", &coord, TileFormat::JPG), "s/sat/3/1/2.jpg");
		assert_eq!(
			tile_template_path("osm", TileFormat::MVT),
			"s/osm/{z}/{x}/{y}.mvt.gz"
		);
	}

	#[test]
	fn glyph_and_sprite_paths() {
		let range = GlyphRange::new(256).unwrap();
		assert_eq!(glyph_path("Open Sans Regular", &range), "fonts/Open Sans Regular/256-511.pbf.gz");
		assert_eq!(sprite_path("default", 1, ".json"), "sprites/default/sprite.json");
		assert_eq!(sprite_path("topo", 2, ".png"), "sprites/topo/sprite@2x.png");
	}

	#[test]
	fn internal_uris() {
		let uri = internal_uri("s/osm/3/1/2.mvt.gz");
		assert_eq!(uri, "smp://maps.v1/s/osm/3/1/2.mvt.gz");
		assert_eq!(internal_path(&uri), Some("s/osm/3/1/2.mvt.gz"));
		assert_eq!(internal_path("https://example.com/x"), None);
	}
}
