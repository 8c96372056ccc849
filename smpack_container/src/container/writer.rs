//! Write resources into a styled map package.
//!
//! The archive entry order is part of the container contract: `VERSION`, then
//! `style.json`, then every other resource in the order it is added. Readers rely on
//! this so that streaming a package front-to-back yields the style and low-zoom coverage
//! first. The writer pins the first two entries at construction; everything else is
//! appended as it arrives.
//!
//! ## Compression
//! - `VERSION`, `style.json`, and sprite `.json` manifests are DEFLATE-compressed.
//! - Tiles, glyphs, and sprite PNGs are STOREd; their payloads are already compressed
//!   (`.mvt.gz`/`.pbf.gz` are gzip, images have their own codecs).

use crate::{BasicStyleValidator, StyleValidator};
use anyhow::{ensure, Context, Result};
use smpack_core::{
	glyph_path, sprite_path, tile_path,
	utils::{compress_gzip, is_gzip_compressed},
	Blob, GlyphRange, SmpError, StyleDocument, TileCoord, TileFormat, FORMAT_VERSION, STYLE_PATH, VERSION_PATH,
};
use std::collections::HashSet;
use std::io::{Seek, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Writer for styled map packages.
///
/// Constructed from a finished style document (including its SMP metadata); resources
/// are appended one by one and `finish()` closes the central directory.
pub struct SmpWriter<W: Write + Seek> {
	zip: ZipWriter<W>,
	paths: HashSet<String>,
}

impl<W: Write + Seek> SmpWriter<W> {
	/// Creates a writer and immediately appends `VERSION` and `style.json`.
	///
	/// The style must pass validation and carry the required `smp:bounds` and
	/// `smp:maxzoom` metadata; every internal URI it references is expected to be added
	/// before `finish()`.
	pub fn new(writer: W, style: &StyleDocument) -> Result<SmpWriter<W>> {
		SmpWriter::new_with_validator(writer, style, &BasicStyleValidator)
	}

	/// Like [`SmpWriter::new`], with a caller-supplied style validator.
	pub fn new_with_validator(writer: W, style: &StyleDocument, validator: &dyn StyleValidator) -> Result<SmpWriter<W>> {
		style.check()?;
		let messages = validator.validate(&style.to_value()?);
		ensure!(
			messages.is_empty(),
			SmpError::InvalidStyle(messages.join("; "))
		);
		style.smp_bounds().context("style is missing SMP metadata")?;
		style.smp_maxzoom().context("style is missing SMP metadata")?;

		let mut smp = SmpWriter {
			zip: ZipWriter::new(writer),
			paths: HashSet::new(),
		};
		smp.add_entry(
			VERSION_PATH,
			&Blob::from(format!("{FORMAT_VERSION}\n")),
			CompressionMethod::Deflated,
		)?;
		smp.add_entry(STYLE_PATH, &style.to_blob()?, CompressionMethod::Deflated)?;
		Ok(smp)
	}

	/// Appends one tile at its canonical path and returns that path.
	///
	/// Vector tile bodies are stored gzip-compressed; a raw protobuf body is compressed
	/// here so the `.mvt.gz` extension always holds.
	pub fn add_tile(&mut self, blob: Blob, folder: &str, coord: &TileCoord, format: TileFormat) -> Result<String> {
		let blob = match format {
			TileFormat::MVT if !is_gzip_compressed(&blob) => compress_gzip(&blob)?,
			_ => blob,
		};
		let path = tile_path(folder, coord, format);
		self.add_entry(&path, &blob, CompressionMethod::Stored)?;
		Ok(path)
	}

	/// Appends one glyph range for a font stack and returns its path.
	pub fn add_glyphs(&mut self, blob: Blob, fontstack: &str, range: &GlyphRange) -> Result<String> {
		let blob = if is_gzip_compressed(&blob) { blob } else { compress_gzip(&blob)? };
		let path = glyph_path(fontstack, range);
		self.add_entry(&path, &blob, CompressionMethod::Stored)?;
		Ok(path)
	}

	/// Appends one sprite file (`ext` is `.json` or `.png`) and returns its path.
	pub fn add_sprite(&mut self, blob: Blob, id: &str, pixel_ratio: u8, ext: &str) -> Result<String> {
		ensure!(
			ext == ".json" || ext == ".png",
			"sprite extension must be .json or .png, got {ext:?}"
		);
		let method = if ext == ".json" {
			CompressionMethod::Deflated
		} else {
			CompressionMethod::Stored
		};
		let path = sprite_path(id, pixel_ratio, ext);
		self.add_entry(&path, &blob, method)?;
		Ok(path)
	}

	/// Closes the central directory and returns the underlying writer.
	pub fn finish(self) -> Result<W> {
		Ok(self.zip.finish().context("closing archive")?)
	}

	/// Returns the number of entries written so far.
	pub fn entry_count(&self) -> usize {
		self.paths.len()
	}

	/// Returns `true` if a resource was already added at `path`.
	pub fn contains(&self, path: &str) -> bool {
		self.paths.contains(path)
	}

	fn add_entry(&mut self, path: &str, blob: &Blob, method: CompressionMethod) -> Result<()> {
		ensure!(self.paths.insert(path.to_string()), "duplicate archive entry {path:?}");
		let options = SimpleFileOptions::default()
			.compression_method(method)
			.unix_permissions(0o644);
		self
			.zip
			.start_file(path, options)
			.with_context(|| format!("starting archive entry {path:?}"))?;
		self
			.zip
			.write_all(blob.as_slice())
			.with_context(|| format!("writing archive entry {path:?}"))?;
		log::trace!("added {path} ({} bytes, {method:?})", blob.len());
		Ok(())
	}
}
