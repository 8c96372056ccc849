//! This module defines the `TileFormat` enum, representing the tile formats a styled map
//! package can carry, together with their storage extensions, content types, and
//! magic-byte detection.
//!
//! # Examples
//!
//! ```rust
//! use smpack_core::TileFormat;
//!
//! assert_eq!(TileFormat::PNG.as_extension(), ".png");
//! assert_eq!(TileFormat::MVT.as_extension(), ".mvt.gz");
//! assert_eq!(TileFormat::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap(), TileFormat::JPG);
//! ```

use crate::SmpError;
use anyhow::Result;
use std::fmt::{Display, Formatter};
use TileFormat::*;

/// Enum representing supported tile formats.
///
/// A tile source has exactly one format; mixed-format sources are malformed.
///
/// # Variants
/// - `MVT` - Mapbox Vector Tile, stored gzip-compressed (`.mvt.gz`)
/// - `PNG` - PNG image format
/// - `JPG` - JPEG image format
/// - `WEBP` - WebP image format
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TileFormat {
	MVT,
	PNG,
	JPG,
	WEBP,
}

impl TileFormat {
	/// Returns the storage extension of this format inside an archive, including the
	/// leading dot. Vector tiles are always stored gzip-compressed.
	pub fn as_extension(&self) -> &str {
		match self {
			MVT => ".mvt.gz",
			PNG => ".png",
			JPG => ".jpg",
			WEBP => ".webp",
		}
	}

	/// Returns the content type of this format.
	pub fn as_content_type(&self) -> &str {
		match self {
			MVT => "application/vnd.mapbox-vector-tile",
			PNG => "image/png",
			JPG => "image/jpeg",
			WEBP => "image/webp",
		}
	}

	/// Identifies the tile format from the leading bytes of a tile body.
	///
	/// Recognized signatures:
	/// - `89 50 4E 47 0D 0A 1A 0A` → PNG
	/// - `FF D8 FF` → JPG
	/// - `52 49 46 46 .. .. .. .. 57 45 42 50` → WebP
	/// - `1F 8B 08` → MVT (gzip-wrapped vector tile)
	///
	/// Anything else fails with [`SmpError::UnknownFileType`].
	pub fn from_bytes(bytes: &[u8]) -> Result<TileFormat> {
		if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
			return Ok(PNG);
		}
		if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
			return Ok(JPG);
		}
		if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
			return Ok(WEBP);
		}
		if bytes.starts_with(&[0x1F, 0x8B, 0x08]) {
			return Ok(MVT);
		}
		Err(
			SmpError::UnknownFileType(format!(
				"unrecognized magic bytes {:02X?}",
				&bytes[..bytes.len().min(12)]
			))
			.into(),
		)
	}

	/// Identifies the tile format from an HTTP content type, ignoring any parameters.
	pub fn from_content_type(content_type: &str) -> Option<TileFormat> {
		let mime = content_type.split(';').next().unwrap_or_default().trim();
		match mime {
			"application/vnd.mapbox-vector-tile" | "application/x-protobuf" | "application/protobuf" => Some(MVT),
			"image/png" => Some(PNG),
			"image/jpeg" | "image/jpg" => Some(JPG),
			"image/webp" => Some(WEBP),
			_ => None,
		}
	}
}

impl Display for TileFormat {
	fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
		f.write_str(match self {
			MVT => "mvt",
			PNG => "png",
			JPG => "jpg",
			WEBP => "webp",
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sniffs_known_magic_bytes() {
		assert_eq!(
			TileFormat::from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2]).unwrap(),
			PNG
		);
		assert_eq!(TileFormat::from_bytes(&[0xFF, 0xD8, 0xFF, 0xDB]).unwrap(), JPG);
		assert_eq!(TileFormat::from_bytes(b"RIFF\x10\x00\x00\x00WEBPVP8 ").unwrap(), WEBP);
		assert_eq!(TileFormat::from_bytes(&[0x1F, 0x8B, 0x08, 0x00]).unwrap(), MVT);
	}

	#[test]
	fn rejects_unknown_first_byte() {
		assert!(TileFormat::from_bytes(&[0x00, 0x01, 0x02]).is_err());
	}

	#[test]
	fn rejects_matching_prefix_with_wrong_suffix() {
		// PNG first byte without the rest of the signature
		assert!(TileFormat::from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x00, 0x00, 0x00, 0x00]).is_err());
		// RIFF container that is not WebP
		assert!(TileFormat::from_bytes(b"RIFF\x10\x00\x00\x00WAVEfmt ").is_err());
	}

	#[test]
	fn content_type_lookup() {
		assert_eq!(TileFormat::from_content_type("image/png"), Some(PNG));
		assert_eq!(
			TileFormat::from_content_type("application/x-protobuf; charset=binary"),
			Some(MVT)
		);
		assert_eq!(TileFormat::from_content_type("text/html"), None);
	}

	#[test]
	fn extensions() {
		assert_eq!(MVT.as_extension(), ".mvt.gz");
		assert_eq!(WEBP.as_extension(), ".webp");
		assert_eq!(MVT.to_string(), "mvt");
	}
}
