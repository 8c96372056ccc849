//! Geographical bounding boxes in WGS84 degrees.

use anyhow::{ensure, Result};
use std::fmt::Debug;

/// Latitude limit of the Web Mercator projection.
///
/// Tile coverage calculations clamp latitudes to this value; beyond it the projection
/// diverges and no tiles exist.
pub const MAX_MERCATOR_LAT: f64 = 85.051129;

/// A geographical bounding box, represented by four `f64` values:
/// `[west, south, east, north]`.
///
/// Assumes:
/// - `west` and `east` are in the range `[-180.0, 180.0]`
/// - `south` and `north` are in the range `[-90.0, 90.0]`
///
/// and logically `west <= east` and `south <= north`.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox(pub f64, pub f64, pub f64, pub f64);

impl GeoBBox {
	/// Creates a new `GeoBBox` from `[west, south, east, north]`.
	pub fn new(west: f64, south: f64, east: f64, north: f64) -> GeoBBox {
		GeoBBox(west, south, east, north)
	}

	pub fn west(&self) -> f64 {
		self.0
	}

	pub fn south(&self) -> f64 {
		self.1
	}

	pub fn east(&self) -> f64 {
		self.2
	}

	pub fn north(&self) -> f64 {
		self.3
	}

	/// Returns the bounding box as a `[f64; 4]` in the form `[west, south, east, north]`.
	pub fn as_array(&self) -> [f64; 4] {
		[self.0, self.1, self.2, self.3]
	}

	/// Returns the bounding box as a `Vec<f64>` in the form `[west, south, east, north]`.
	pub fn as_vec(&self) -> Vec<f64> {
		vec![self.0, self.1, self.2, self.3]
	}

	/// Checks that all values are in range and correctly ordered.
	pub fn check(&self) -> Result<()> {
		ensure!(self.0 >= -180.0, "west ({}) must be >= -180", self.0);
		ensure!(self.1 >= -90.0, "south ({}) must be >= -90", self.1);
		ensure!(self.2 <= 180.0, "east ({}) must be <= 180", self.2);
		ensure!(self.3 <= 90.0, "north ({}) must be <= 90", self.3);
		ensure!(self.0 <= self.2, "west ({}) must be <= east ({})", self.0, self.2);
		ensure!(self.1 <= self.3, "south ({}) must be <= north ({})", self.1, self.3);
		Ok(())
	}

	/// Extends this bounding box to also cover `other`.
	pub fn extend(&mut self, other: &GeoBBox) {
		self.0 = self.0.min(other.0);
		self.1 = self.1.min(other.1);
		self.2 = self.2.max(other.2);
		self.3 = self.3.max(other.3);
	}

	/// Returns the union of this bounding box with `other`.
	pub fn extended(mut self, other: &GeoBBox) -> GeoBBox {
		self.extend(other);
		self
	}

	/// Returns the component-wise union of all boxes, or `None` for an empty iterator.
	pub fn union_all<I: IntoIterator<Item = GeoBBox>>(boxes: I) -> Option<GeoBBox> {
		let mut iter = boxes.into_iter();
		let first = iter.next()?;
		Some(iter.fold(first, |acc, b| acc.extended(&b)))
	}

	/// Intersects this bounding box with `other`.
	///
	/// The result may be degenerate (`west > east` or `south > north`) when the boxes are
	/// disjoint; see [`GeoBBox::is_degenerate`].
	pub fn intersected(&self, other: &GeoBBox) -> GeoBBox {
		GeoBBox(
			self.0.max(other.0),
			self.1.max(other.1),
			self.2.min(other.2),
			self.3.min(other.3),
		)
	}

	/// Returns `true` if the box covers no area.
	pub fn is_degenerate(&self) -> bool {
		self.0 > self.2 || self.1 > self.3
	}

	/// Clamps the latitudes to the Web Mercator limit [`MAX_MERCATOR_LAT`].
	pub fn clamped_to_mercator(&self) -> GeoBBox {
		GeoBBox(
			self.0,
			self.1.max(-MAX_MERCATOR_LAT),
			self.2,
			self.3.min(MAX_MERCATOR_LAT),
		)
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(input: Vec<f64>) -> Result<Self> {
		ensure!(input.len() == 4, "bounds must have 4 values, got {}", input.len());
		Ok(GeoBBox(input[0], input[1], input[2], input[3]))
	}
}

impl TryFrom<&serde_json::Value> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(value: &serde_json::Value) -> Result<Self> {
		let array = value
			.as_array()
			.ok_or_else(|| anyhow::anyhow!("bounds must be an array, got {value}"))?;
		let values = array
			.iter()
			.map(|v| v.as_f64().ok_or_else(|| anyhow::anyhow!("bounds must contain numbers")))
			.collect::<Result<Vec<f64>>>()?;
		GeoBBox::try_from(values)
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "[{}, {}, {}, {}]", self.0, self.1, self.2, self.3)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn union_is_idempotent_and_commutative() {
		let a = GeoBBox(-10.0, -5.0, 20.0, 15.0);
		let b = GeoBBox(0.0, -20.0, 30.0, 5.0);

		assert_eq!(GeoBBox::union_all([a, a]), Some(a));
		assert_eq!(a.extended(&b), b.extended(&a));
		assert_eq!(a.extended(&b), GeoBBox(-10.0, -20.0, 30.0, 15.0));
	}

	#[test]
	fn union_of_empty_iterator() {
		assert_eq!(GeoBBox::union_all([]), None);
	}

	#[test]
	fn intersection() {
		let a = GeoBBox(-10.0, -10.0, 10.0, 10.0);
		let b = GeoBBox(0.0, 0.0, 20.0, 20.0);
		assert_eq!(a.intersected(&b), GeoBBox(0.0, 0.0, 10.0, 10.0));

		let disjoint = GeoBBox(50.0, 50.0, 60.0, 60.0);
		assert!(a.intersected(&disjoint).is_degenerate());
	}

	#[test]
	fn check_rejects_bad_boxes() {
		assert!(GeoBBox(-181.0, 0.0, 0.0, 0.0).check().is_err());
		assert!(GeoBBox(0.0, 0.0, 181.0, 0.0).check().is_err());
		assert!(GeoBBox(10.0, 0.0, -10.0, 0.0).check().is_err());
		assert!(GeoBBox(0.0, 10.0, 0.0, -10.0).check().is_err());
		assert!(GeoBBox(-180.0, -90.0, 180.0, 90.0).check().is_ok());
	}

	#[test]
	fn mercator_clamp() {
		let world = GeoBBox(-180.0, -90.0, 180.0, 90.0).clamped_to_mercator();
		assert_eq!(world.south(), -MAX_MERCATOR_LAT);
		assert_eq!(world.north(), MAX_MERCATOR_LAT);
	}

	#[test]
	fn try_from_vec() {
		assert!(GeoBBox::try_from(vec![1.0, 2.0, 3.0]).is_err());
		assert_eq!(
			GeoBBox::try_from(vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
			GeoBBox(1.0, 2.0, 3.0, 4.0)
		);
	}

	#[test]
	fn try_from_json() {
		let value = serde_json::json!([-10.0, -20, 10.0, 20]);
		assert_eq!(GeoBBox::try_from(&value).unwrap(), GeoBBox(-10.0, -20.0, 10.0, 20.0));
		assert!(GeoBBox::try_from(&serde_json::json!("nope")).is_err());
	}
}
