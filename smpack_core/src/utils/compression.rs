//! Gzip helpers.
//!
//! Vector tiles and glyph protobufs are stored gzip-compressed inside the archive
//! (`.mvt.gz`, `.pbf.gz`); remote servers deliver them either pre-compressed or raw.

use crate::Blob;
use anyhow::{Context, Result};
use flate2::bufread::{GzDecoder, GzEncoder};
use std::io::Read;

/// Compresses a blob using gzip at the best compression level.
pub fn compress_gzip(blob: &Blob) -> Result<Blob> {
	let mut encoder = GzEncoder::new(blob.as_slice(), flate2::Compression::best());
	let mut compressed_data = Vec::new();
	encoder
		.read_to_end(&mut compressed_data)
		.context("Failed to compress data using Gzip")?;
	Ok(Blob::from(compressed_data))
}

/// Decompresses a gzip-compressed blob.
pub fn decompress_gzip(blob: &Blob) -> Result<Blob> {
	let mut decoder = GzDecoder::new(blob.as_slice());
	let mut decompressed_data = Vec::new();
	decoder
		.read_to_end(&mut decompressed_data)
		.context("Failed to decompress data using Gzip")?;
	Ok(Blob::from(decompressed_data))
}

/// Returns `true` if the blob carries the gzip magic bytes.
pub fn is_gzip_compressed(blob: &Blob) -> bool {
	blob.starts_with(&[0x1F, 0x8B])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trip() {
		let data = Blob::from("ribbit ribbit ribbit ribbit");
		let compressed = compress_gzip(&data).unwrap();
		assert!(is_gzip_compressed(&compressed));
		assert!(!is_gzip_compressed(&data));
		assert_eq!(decompress_gzip(&compressed).unwrap(), data);
	}

	#[test]
	fn decompressing_garbage_fails() {
		assert!(decompress_gzip(&Blob::from("not gzip at all")).is_err());
	}
}
