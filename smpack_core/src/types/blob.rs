//! This module provides the [`Blob`] struct, a thin wrapper around [`Vec<u8>`] used for every
//! payload that moves through a styled map package: tile bodies, glyph protobufs, sprite
//! sheets, and serialized JSON documents.

use std::fmt::Debug;

/// A simple wrapper around [`Vec<u8>`] that provides additional methods for working with byte data.
///
/// # Examples
///
/// ```rust
/// use smpack_core::Blob;
///
/// let blob = Blob::from("Hello, world!");
/// assert_eq!(blob.len(), 13);
/// assert_eq!(blob.as_str(), "Hello, world!");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	/// Creates an empty `Blob`.
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Returns the underlying bytes as a slice.
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	/// Interprets the bytes as UTF-8 text, substituting an empty string on invalid data.
	pub fn as_str(&self) -> &str {
		std::str::from_utf8(&self.0).unwrap_or_default()
	}

	/// Consumes the blob and returns the underlying vector.
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Returns the number of bytes.
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	/// Returns `true` if the blob contains no bytes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `true` if the blob starts with the given prefix.
	pub fn starts_with(&self, prefix: &[u8]) -> bool {
		self.0.starts_with(prefix)
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&Vec<u8>> for Blob {
	fn from(item: &Vec<u8>) -> Self {
		Blob(item.clone())
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(item: &[u8; N]) -> Self {
		Blob(item.to_vec())
	}
}

impl From<String> for Blob {
	fn from(item: String) -> Self {
		Blob(item.into_bytes())
	}
}

impl From<&String> for Blob {
	fn from(item: &String) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl From<&str> for Blob {
	fn from(item: &str) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("Blob").field("len", &self.0.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn conversions() {
		let vec = vec![0u8, 1, 2, 3];
		assert_eq!(Blob::from(&vec).as_slice(), &[0, 1, 2, 3]);
		assert_eq!(Blob::from(vec.clone()).into_vec(), vec);
		assert_eq!(Blob::from("abc").as_str(), "abc");
		assert_eq!(Blob::from(String::from("abc")).len(), 3);
	}

	#[test]
	fn empty() {
		let blob = Blob::new_empty();
		assert!(blob.is_empty());
		assert_eq!(blob.len(), 0);
	}

	#[test]
	fn debug() {
		assert_eq!(format!("{:?}", Blob::from("abcd")), "Blob { len: 4 }");
	}

	#[test]
	fn starts_with() {
		let blob = Blob::from(&[0x89u8, 0x50, 0x4e, 0x47]);
		assert!(blob.starts_with(&[0x89, 0x50]));
		assert!(!blob.starts_with(&[0x50]));
	}
}
