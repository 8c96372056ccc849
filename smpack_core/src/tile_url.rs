//! Remote tile-URL template rendering.
//!
//! Tile sources carry URL templates like `https://tiles.example.com/{z}/{x}/{y}.mvt`.
//! Rendering substitutes the coordinate into the placeholders; multi-template sources are
//! load-balanced deterministically by `(x + y) % templates.len()`.
//!
//! Supported placeholders: `{z}`, `{x}`, `{y}` (flipped for TMS sources), `{quadkey}`,
//! and `{prefix}` (two hex digits of `(x + y) % 16`, used by some CDN shard layouts).
//! Unknown placeholders are left untouched.

use crate::TileCoord;
use anyhow::{ensure, Result};

/// The axis convention of a remote tile source. Storage is always XYZ.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TileScheme {
	#[default]
	Xyz,
	Tms,
}

impl TileScheme {
	/// Parses the TileJSON `scheme` field; anything but `"tms"` is XYZ.
	pub fn from_str(input: Option<&str>) -> TileScheme {
		match input {
			Some("tms") => TileScheme::Tms,
			_ => TileScheme::Xyz,
		}
	}
}

/// Renders the tile URL for `coord`, picking one of `templates` by `(x + y) % len`.
pub fn render_tile_url(templates: &[String], scheme: TileScheme, coord: &TileCoord) -> Result<String> {
	ensure!(!templates.is_empty(), "tile source has no URL templates");
	let index = ((coord.x as u64 + coord.y as u64) % templates.len() as u64) as usize;
	Ok(render_template(&templates[index], scheme, coord))
}

fn render_template(template: &str, scheme: TileScheme, coord: &TileCoord) -> String {
	let y = match scheme {
		TileScheme::Xyz => coord.y,
		TileScheme::Tms => (1u32 << coord.level) - coord.y - 1,
	};
	template
		.replace("{z}", &coord.level.to_string())
		.replace("{x}", &coord.x.to_string())
		.replace("{y}", &y.to_string())
		.replace("{quadkey}", &coord.quadkey())
		.replace("{prefix}", &format!("{:02x}", (coord.x + coord.y) % 16))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn coord(level: u8, x: u32, y: u32) -> TileCoord {
		TileCoord::new(level, x, y).unwrap()
	}

	#[test]
	fn xyz_substitution() {
		let templates = vec!["https://t/{z}/{x}/{y}.mvt".to_string()];
		assert_eq!(
			render_tile_url(&templates, TileScheme::Xyz, &coord(3, 1, 2)).unwrap(),
			"https://t/3/1/2.mvt"
		);
	}

	#[test]
	fn tms_flips_y() {
		let templates = vec!["https://t/{z}/{x}/{y}.mvt".to_string()];
		assert_eq!(
			render_tile_url(&templates, TileScheme::Tms, &coord(1, 0, 0)).unwrap(),
			"https://t/1/0/1.mvt"
		);
	}

	#[test]
	fn quadkey_substitution() {
		let templates = vec!["https://t/{quadkey}.png".to_string()];
		assert_eq!(
			render_tile_url(&templates, TileScheme::Xyz, &coord(1, 1, 0)).unwrap(),
			"https://t/1.png"
		);
	}

	#[test]
	fn prefix_substitution() {
		let templates = vec!["https://{prefix}.t/{z}/{x}/{y}.png".to_string()];
		assert_eq!(
			render_tile_url(&templates, TileScheme::Xyz, &coord(0, 0, 0)).unwrap(),
			"https://00.t/0/0/0.png"
		);
	}

	#[test]
	fn load_balancing_by_x_plus_y() {
		let templates = vec![
			"https://a/{z}/{x}/{y}".to_string(),
			"https://b/{z}/{x}/{y}".to_string(),
		];
		assert_eq!(
			render_tile_url(&templates, TileScheme::Xyz, &coord(0, 0, 0)).unwrap(),
			"https://a/0/0/0"
		);
		assert_eq!(
			render_tile_url(&templates, TileScheme::Xyz, &coord(1, 1, 0)).unwrap(),
			"https://b/1/1/0"
		);
	}

	#[test]
	fn unknown_placeholders_survive() {
		let templates = vec!["https://t/{z}/{x}/{y}?key={apikey}".to_string()];
		assert_eq!(
			render_tile_url(&templates, TileScheme::Xyz, &coord(0, 0, 0)).unwrap(),
			"https://t/0/0/0?key={apikey}"
		);
	}

	#[test]
	fn empty_template_list_fails() {
		assert!(render_tile_url(&[], TileScheme::Xyz, &coord(0, 0, 0)).is_err());
	}
}
