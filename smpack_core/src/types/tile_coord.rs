//! Tile coordinates in the Web Mercator XYZ scheme.
//!
//! A [`TileCoord`] addresses a single tile by zoom level, column, and row. Storage
//! coordinates are always XYZ (y grows southwards); the TMS flip only ever happens when
//! rendering remote tile URLs.

use crate::GeoBBox;
use anyhow::{ensure, Result};
use std::f64::consts::PI;
use std::fmt::{self, Debug, Display};

/// A tile coordinate, consisting of zoom `level`, column `x`, and row `y`.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// Creates a new coordinate, checking that `x` and `y` fit the zoom level.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= 30, "level ({level}) must be <= 30");
		let max = 1u32 << level;
		ensure!(x < max, "x ({x}) must be < {max} at level {level}");
		ensure!(y < max, "y ({y}) must be < {max} at level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Returns the geographical bounding box covered by this tile.
	///
	/// Longitudes are linear in `x`; latitudes come from the inverse Gudermannian of the
	/// Mercator row. At `level` 0 this is the whole Web Mercator world,
	/// `[-180, -85.05…, 180, 85.05…]`.
	pub fn as_geo_bbox(&self) -> GeoBBox {
		let size: f64 = 2.0f64.powi(self.level as i32);
		let lon = |x: f64| x / size * 360.0 - 180.0;
		let lat = |y: f64| ((PI * (1.0 - 2.0 * y / size)).exp().atan() / PI - 0.25) * 360.0;

		GeoBBox(
			lon(self.x as f64),
			lat((self.y + 1) as f64),
			lon((self.x + 1) as f64),
			lat(self.y as f64),
		)
	}

	/// Returns the quadkey of this tile: a base-4 string of length `level`.
	///
	/// Per level, the x bit contributes 1 and the y bit contributes 2. Level 0 yields the
	/// empty string.
	pub fn quadkey(&self) -> String {
		let mut key = String::with_capacity(self.level as usize);
		for i in (1..=self.level).rev() {
			let bit = i - 1;
			let digit = ((self.x >> bit) & 1) + 2 * ((self.y >> bit) & 1);
			key.push(char::from(b'0' + digit as u8));
		}
		key
	}

	/// Returns `true` if `x` and `y` are valid for the zoom level.
	pub fn is_valid(&self) -> bool {
		if self.level > 30 {
			return false;
		}
		let max = 1u32 << self.level;
		self.x < max && self.y < max
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "TileCoord({}/{}/{})", self.level, self.x, self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_checks_ranges() {
		assert!(TileCoord::new(0, 0, 0).is_ok());
		assert!(TileCoord::new(0, 1, 0).is_err());
		assert!(TileCoord::new(3, 7, 7).is_ok());
		assert!(TileCoord::new(3, 8, 0).is_err());
		assert!(TileCoord::new(31, 0, 0).is_err());
	}

	#[test]
	fn world_bbox_at_level_zero() {
		let bbox = TileCoord::new(0, 0, 0).unwrap().as_geo_bbox();
		assert_eq!(bbox.west(), -180.0);
		assert_eq!(bbox.east(), 180.0);
		assert!(bbox.south() < -85.0);
		assert!(bbox.north() > 85.0);
	}

	#[test]
	fn north_west_quarter_at_level_one() {
		let bbox = TileCoord::new(1, 0, 0).unwrap().as_geo_bbox();
		assert_eq!(bbox.west(), -180.0);
		assert_eq!(bbox.east(), 0.0);
		assert!((bbox.south() - 0.0).abs() < 1e-9);
		assert!(bbox.north() > 85.0);
	}

	#[test]
	fn quadkeys() {
		assert_eq!(TileCoord::new(0, 0, 0).unwrap().quadkey(), "");
		assert_eq!(TileCoord::new(1, 0, 0).unwrap().quadkey(), "0");
		assert_eq!(TileCoord::new(1, 1, 0).unwrap().quadkey(), "1");
		assert_eq!(TileCoord::new(1, 0, 1).unwrap().quadkey(), "2");
		assert_eq!(TileCoord::new(1, 1, 1).unwrap().quadkey(), "3");
		assert_eq!(TileCoord::new(2, 3, 3).unwrap().quadkey(), "33");
	}

	#[test]
	fn display() {
		assert_eq!(TileCoord::new(3, 1, 2).unwrap().to_string(), "3/1/2");
	}
}
