//! Tagged views of style sources.
//!
//! Style sources are JSON objects discriminated by their `type` field. The downloader
//! only understands `vector`, `raster`, and `geojson`; everything else is kept as an
//! opaque value so callers can decide to drop or ignore it.

use crate::SmpError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `vector` or `raster` tile source. TileJSON fields this system rewrites are typed;
/// the remainder rides along in `rest`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TileSetSource {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tiles: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bounds: Option<Vec<f64>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub minzoom: Option<u8>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub maxzoom: Option<u8>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scheme: Option<String>,
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

/// A `geojson` source; `data` is either a URL string or an inline document.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GeoJsonSource {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub maxzoom: Option<u8>,
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

/// A style source, discriminated by its `type` field.
#[derive(Clone, Debug)]
pub enum Source {
	Vector(TileSetSource),
	Raster(TileSetSource),
	GeoJson(GeoJsonSource),
	Other(Value),
}

impl Source {
	/// Builds the typed view of a source value. Unrecognized types become
	/// [`Source::Other`].
	pub fn from_value(value: &Value) -> Result<Source> {
		let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
		let invalid = |e: serde_json::Error| SmpError::InvalidStyle(format!("malformed {kind} source: {e}"));
		Ok(match kind {
			"vector" => Source::Vector(serde_json::from_value(value.clone()).map_err(invalid)?),
			"raster" => Source::Raster(serde_json::from_value(value.clone()).map_err(invalid)?),
			"geojson" => Source::GeoJson(serde_json::from_value(value.clone()).map_err(invalid)?),
			_ => Source::Other(value.clone()),
		})
	}

	/// Serializes the typed view back to a source value.
	pub fn to_value(&self) -> Result<Value> {
		Ok(match self {
			Source::Vector(s) | Source::Raster(s) => serde_json::to_value(s)?,
			Source::GeoJson(s) => serde_json::to_value(s)?,
			Source::Other(v) => v.clone(),
		})
	}

	/// Returns `true` for source types a styled map package can carry.
	pub fn is_supported(&self) -> bool {
		!matches!(self, Source::Other(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn vector_source_round_trip_keeps_unknown_fields() {
		let value = json!({
			"type": "vector",
			"tiles": ["https://t/{z}/{x}/{y}.mvt"],
			"maxzoom": 14,
			"attribution": "© contributors",
			"promoteId": "osm_id"
		});
		let source = Source::from_value(&value).unwrap();
		let Source::Vector(tileset) = &source else {
			panic!("expected vector source");
		};
		assert_eq!(tileset.maxzoom, Some(14));
		assert_eq!(tileset.rest.get("promoteId"), Some(&json!("osm_id")));
		assert_eq!(source.to_value().unwrap(), value);
	}

	#[test]
	fn geojson_source() {
		let value = json!({"type": "geojson", "data": "https://example.com/places.geojson"});
		let source = Source::from_value(&value).unwrap();
		assert!(matches!(source, Source::GeoJson(_)));
		assert!(source.is_supported());
	}

	#[test]
	fn unsupported_source_types_are_other() {
		let value = json!({"type": "raster-dem", "tiles": ["https://t/{z}/{x}/{y}.png"]});
		let source = Source::from_value(&value).unwrap();
		assert!(!source.is_supported());
		assert_eq!(source.to_value().unwrap(), value);
	}
}
