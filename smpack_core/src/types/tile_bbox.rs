//! Tile-aligned bounding boxes for a single zoom level.
//!
//! A [`TileBBox`] describes a rectangular region of Web Mercator tiles at a specific zoom
//! level. Coordinates are zero-based and inclusive on both sides, so a bbox always covers
//! at least one tile; callers decide emptiness *before* construction by checking the
//! geographical intersection (see [`GeoBBox::is_degenerate`]).

use crate::{GeoBBox, TileCoord};
use anyhow::{ensure, Context, Result};
use std::fmt::{self, Debug};

/// A rectangular region of tiles at a specific zoom level, inclusive on all sides.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct TileBBox {
	pub level: u8,
	x_min: u32,
	y_min: u32,
	x_max: u32,
	y_max: u32,
}

impl TileBBox {
	/// Creates a bbox from inclusive minimum and maximum tile coordinates.
	pub fn from_min_and_max(level: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<TileBBox> {
		ensure!(level <= 30, "level ({level}) must be <= 30");
		let size = 1u32 << level;
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		ensure!(x_max < size, "x_max ({x_max}) must be < {size} at level {level}");
		ensure!(y_max < size, "y_max ({y_max}) must be < {size} at level {level}");
		Ok(TileBBox {
			level,
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// Covers the full tile grid of a zoom level.
	pub fn new_full(level: u8) -> Result<TileBBox> {
		let size = 1u32 << level;
		TileBBox::from_min_and_max(level, 0, 0, size - 1, size - 1)
	}

	/// Computes the tile rectangle covering `bbox` at the given zoom level.
	///
	/// Latitudes are clamped to the Web Mercator limit first, so poles never produce
	/// out-of-range rows.
	pub fn from_geo(level: u8, bbox: &GeoBBox) -> Result<TileBBox> {
		ensure!(level <= 30, "level ({level}) must be <= 30");
		bbox.check().with_context(|| format!("converting {bbox:?} to tiles"))?;
		let bbox = bbox.clamped_to_mercator();
		let size = 1u32 << level;
		let max_index = size - 1;

		let x_of = |lon: f64| (((lon + 180.0) / 360.0 * size as f64).floor() as i64).clamp(0, max_index as i64) as u32;
		let y_of = |lat: f64| {
			let rad = lat.to_radians();
			let row = (1.0 - rad.tan().asinh() / std::f64::consts::PI) / 2.0 * size as f64;
			(row.floor() as i64).clamp(0, max_index as i64) as u32
		};

		// North latitude maps to the smaller row index.
		TileBBox::from_min_and_max(level, x_of(bbox.west()), y_of(bbox.north()), x_of(bbox.east()), y_of(bbox.south()))
	}

	pub fn x_min(&self) -> u32 {
		self.x_min
	}

	pub fn y_min(&self) -> u32 {
		self.y_min
	}

	pub fn x_max(&self) -> u32 {
		self.x_max
	}

	pub fn y_max(&self) -> u32 {
		self.y_max
	}

	pub fn width(&self) -> u32 {
		self.x_max - self.x_min + 1
	}

	pub fn height(&self) -> u32 {
		self.y_max - self.y_min + 1
	}

	/// Returns the number of tiles in this bbox.
	pub fn count_tiles(&self) -> u64 {
		self.width() as u64 * self.height() as u64
	}

	/// Returns `true` if the coordinate lies within this bbox and level.
	pub fn contains(&self, coord: &TileCoord) -> bool {
		coord.level == self.level
			&& coord.x >= self.x_min
			&& coord.x <= self.x_max
			&& coord.y >= self.y_min
			&& coord.y <= self.y_max
	}

	/// Iterates over all coordinates in row-major order: `y` outer, `x` inner.
	pub fn iter_coords(self) -> impl Iterator<Item = TileCoord> {
		(self.y_min..=self.y_max)
			.flat_map(move |y| (self.x_min..=self.x_max).map(move |x| TileCoord { level: self.level, x, y }))
	}
}

impl Debug for TileBBox {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"{}: [{},{},{},{}] ({}x{})",
			self.level,
			self.x_min,
			self.y_min,
			self.x_max,
			self.y_max,
			self.width(),
			self.height()
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_min_and_max_validates() {
		assert!(TileBBox::from_min_and_max(2, 0, 0, 3, 3).is_ok());
		assert!(TileBBox::from_min_and_max(2, 0, 0, 4, 3).is_err());
		assert!(TileBBox::from_min_and_max(2, 2, 0, 1, 3).is_err());
	}

	#[test]
	fn full_world() {
		let bbox = TileBBox::from_geo(1, &GeoBBox(-180.0, -90.0, 180.0, 90.0)).unwrap();
		assert_eq!(bbox, TileBBox::new_full(1).unwrap());
		assert_eq!(bbox.count_tiles(), 4);
	}

	#[test]
	fn single_tile_at_level_zero() {
		let bbox = TileBBox::from_geo(0, &GeoBBox(-10.0, -10.0, 10.0, 10.0)).unwrap();
		assert_eq!(bbox.count_tiles(), 1);
		assert!(bbox.contains(&TileCoord::new(0, 0, 0).unwrap()));
	}

	#[test]
	fn northern_hemisphere_rows() {
		// Northern half of the world covers only the top row at level 1.
		let bbox = TileBBox::from_geo(1, &GeoBBox(-180.0, 1.0, 180.0, 90.0)).unwrap();
		assert_eq!((bbox.y_min(), bbox.y_max()), (0, 0));
		assert_eq!((bbox.x_min(), bbox.x_max()), (0, 1));
	}

	#[test]
	fn iteration_is_row_major() {
		let bbox = TileBBox::from_min_and_max(2, 1, 2, 2, 3).unwrap();
		let coords: Vec<String> = bbox.iter_coords().map(|c| c.to_string()).collect();
		assert_eq!(coords, vec!["2/1/2", "2/2/2", "2/1/3", "2/2/3"]);
	}
}
