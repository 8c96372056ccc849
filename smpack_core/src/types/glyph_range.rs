//! 256-codepoint glyph ranges as used by MapLibre font endpoints.

use anyhow::{bail, ensure, Context, Result};
use std::fmt::{self, Display};

/// A glyph range `N-N+255` where `N` is a multiple of 256 in `0..=65280`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GlyphRange {
	start: u16,
}

impl GlyphRange {
	/// Creates a glyph range starting at `start`.
	pub fn new(start: u16) -> Result<GlyphRange> {
		ensure!(start % 256 == 0, "glyph range start ({start}) must be a multiple of 256");
		ensure!(start <= 65280, "glyph range start ({start}) must be <= 65280");
		Ok(GlyphRange { start })
	}

	/// Parses a range of the form `"256-511"`.
	pub fn parse(input: &str) -> Result<GlyphRange> {
		let Some((first, last)) = input.split_once('-') else {
			bail!("glyph range {input:?} must have the form \"N-N+255\"");
		};
		let first: u16 = first.parse().with_context(|| format!("parsing glyph range {input:?}"))?;
		let last: u32 = last.parse().with_context(|| format!("parsing glyph range {input:?}"))?;
		ensure!(
			last == first as u32 + 255,
			"glyph range {input:?} must span exactly 256 codepoints"
		);
		GlyphRange::new(first)
	}

	pub fn first(&self) -> u16 {
		self.start
	}

	pub fn last(&self) -> u16 {
		self.start + 255
	}

	/// Iterates over every possible glyph range, `0-255` through `65280-65535`.
	pub fn all() -> impl Iterator<Item = GlyphRange> {
		(0u32..=65280).step_by(256).map(|start| GlyphRange { start: start as u16 })
	}
}

impl Default for GlyphRange {
	fn default() -> Self {
		GlyphRange { start: 0 }
	}
}

impl Display for GlyphRange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}-{}", self.first(), self.last())
	}
}

impl fmt::Debug for GlyphRange {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "GlyphRange({self})")
	}
}
