//! Fixtures for container tests: a mock style document and package builders.
//!
//! These helpers exist so tests never need network access or on-disk fixtures; packages
//! are produced in memory, either through [`SmpWriter`] (the normal path) or through a
//! raw ZIP writer when a test needs a malformed `VERSION`.

use crate::SmpWriter;
use anyhow::Result;
use smpack_core::{Blob, GlyphRange, StyleDocument, TileCoord, TileFormat};
use std::io::{Cursor, Write};
use zip::{write::SimpleFileOptions, ZipWriter};

/// Bytes with a PNG signature; not a decodable image, but enough for format sniffing.
pub const MOCK_BYTES_PNG: &[u8] = &[
	0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

/// A few bytes shaped like an uncompressed protobuf payload.
pub const MOCK_BYTES_MVT_RAW: &[u8] = &[0x1A, 0x0C, 0x0A, 0x04, 0x74, 0x65, 0x73, 0x74, 0x28, 0x80, 0x20, 0x78];

/// A complete little style: one vector source, a background and a symbol layer, internal
/// glyph and sprite references, and the required SMP metadata.
pub fn mock_style() -> StyleDocument {
	let value = serde_json::json!({
		"version": 8,
		"name": "Mock Style",
		"sources": {
			"osm": {
				"type": "vector",
				"tiles": ["smp://maps.v1/s/osm/{z}/{x}/{y}.mvt.gz"],
				"minzoom": 0,
				"maxzoom": 4
			}
		},
		"layers": [
			{"id": "background", "type": "background"},
			{
				"id": "labels",
				"type": "symbol",
				"source": "osm",
				"source-layer": "place",
				"layout": {"text-font": ["Open Sans Regular"]}
			}
		],
		"glyphs": "smp://maps.v1/fonts/{fontstack}/{range}.pbf.gz",
		"sprite": "smp://maps.v1/sprites/default/sprite",
		"metadata": {
			"smp:bounds": [-180.0, -85.051129, 180.0, 85.051129],
			"smp:maxzoom": 4
		}
	});
	serde_json::from_value(value).expect("mock style is valid")
}

/// Builds a writer-produced package containing everything the mock style references.
pub fn build_minimal_package() -> Result<Blob> {
	build_package(true, true)
}

/// Like [`build_minimal_package`], but without any tile entries.
pub fn build_package_without_tiles() -> Result<Blob> {
	build_package(false, true)
}

/// Like [`build_minimal_package`], but without the `@2x` sprite variants.
pub fn build_package_without_2x_sprites() -> Result<Blob> {
	build_package(true, false)
}

fn build_package(include_tiles: bool, include_2x: bool) -> Result<Blob> {
	let mut writer = SmpWriter::new(Cursor::new(Vec::new()), &mock_style())?;

	writer.add_glyphs(Blob::from(MOCK_BYTES_MVT_RAW), "Open Sans Regular", &GlyphRange::default())?;

	writer.add_sprite(Blob::from(r#"{"icon":{"x":0,"y":0,"width":16,"height":16}}"#), "default", 1, ".json")?;
	writer.add_sprite(Blob::from(MOCK_BYTES_PNG), "default", 1, ".png")?;
	if include_2x {
		writer.add_sprite(Blob::from(r#"{"icon":{"x":0,"y":0,"width":32,"height":32}}"#), "default", 2, ".json")?;
		writer.add_sprite(Blob::from(MOCK_BYTES_PNG), "default", 2, ".png")?;
	}

	if include_tiles {
		for coord in [TileCoord::new(0, 0, 0)?, TileCoord::new(1, 0, 0)?, TileCoord::new(1, 1, 0)?] {
			writer.add_tile(Blob::from(MOCK_BYTES_MVT_RAW), "osm", &coord, TileFormat::MVT)?;
		}
	}

	Ok(Blob::from(writer.finish()?.into_inner()))
}

/// Builds a package with an arbitrary `VERSION` payload, bypassing the writer.
pub fn build_package_with_version(version: &str) -> Result<Blob> {
	let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
	let options = SimpleFileOptions::default().unix_permissions(0o644);

	zip.start_file("VERSION", options.clone())?;
	zip.write_all(version.as_bytes())?;

	zip.start_file("style.json", options.clone())?;
	zip.write_all(mock_style().to_blob()?.as_slice())?;

	zip.start_file("fonts/Open Sans Regular/0-255.pbf.gz", options.clone())?;
	zip.write_all(smpack_core::utils::compress_gzip(&Blob::from(MOCK_BYTES_MVT_RAW))?.as_slice())?;

	for name in [
		"sprites/default/sprite.json",
		"sprites/default/sprite@2x.json",
	] {
		zip.start_file(name, options.clone())?;
		zip.write_all(b"{}")?;
	}
	for name in ["sprites/default/sprite.png", "sprites/default/sprite@2x.png"] {
		zip.start_file(name, options.clone())?;
		zip.write_all(MOCK_BYTES_PNG)?;
	}

	zip.start_file("s/osm/0/0/0.mvt.gz", options.clone())?;
	zip.write_all(smpack_core::utils::compress_gzip(&Blob::from(MOCK_BYTES_MVT_RAW))?.as_slice())?;

	Ok(Blob::from(zip.finish()?.into_inner()))
}
