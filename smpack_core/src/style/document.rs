//! The top-level style document.

use crate::{Blob, GeoBBox, SmpError, SpriteDef};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key holding the package bounds, `[west, south, east, north]`.
pub const METADATA_BOUNDS: &str = "smp:bounds";

/// Metadata key holding the maximum stored zoom level.
pub const METADATA_MAXZOOM: &str = "smp:maxzoom";

/// Metadata key mapping source ids to their archive folder names. Only present when some
/// source id is not usable as a folder name verbatim.
pub const METADATA_SOURCE_FOLDERS: &str = "smp:sourceFolders";

/// A MapLibre style document.
///
/// The fields this system reads or rewrites are typed; everything else is preserved
/// verbatim in `rest` so a parse/serialize round trip is lossless.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StyleDocument {
	pub version: i64,
	#[serde(default)]
	pub sources: Map<String, Value>,
	#[serde(default)]
	pub layers: Vec<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub glyphs: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sprite: Option<SpriteDef>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Map<String, Value>>,
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

impl StyleDocument {
	/// Parses a style document from raw JSON bytes.
	pub fn parse(blob: &Blob) -> Result<StyleDocument> {
		let style: StyleDocument = serde_json::from_slice(blob.as_slice())
			.map_err(|e| SmpError::InvalidStyle(format!("style document does not parse: {e}")))?;
		Ok(style)
	}

	/// Serializes the document to JSON bytes.
	pub fn to_blob(&self) -> Result<Blob> {
		Ok(Blob::from(serde_json::to_vec(self)?))
	}

	/// Serializes the document to a JSON value.
	pub fn to_value(&self) -> Result<Value> {
		Ok(serde_json::to_value(self)?)
	}

	/// Checks the structural minimum this system relies on.
	pub fn check(&self) -> Result<()> {
		ensure!(
			self.version == 8,
			SmpError::InvalidStyle(format!("style version must be 8, got {}", self.version))
		);
		Ok(())
	}

	/// Reads the required `smp:bounds` metadata.
	pub fn smp_bounds(&self) -> Result<GeoBBox> {
		let value = self
			.metadata_value(METADATA_BOUNDS)
			.ok_or_else(|| SmpError::MissingMetadata(METADATA_BOUNDS.to_string()))?;
		GeoBBox::try_from(value)
	}

	/// Reads the required `smp:maxzoom` metadata.
	pub fn smp_maxzoom(&self) -> Result<u8> {
		let value = self
			.metadata_value(METADATA_MAXZOOM)
			.ok_or_else(|| SmpError::MissingMetadata(METADATA_MAXZOOM.to_string()))?;
		let maxzoom = value
			.as_u64()
			.ok_or_else(|| SmpError::MissingMetadata(format!("{METADATA_MAXZOOM} must be a number, got {value}")))?;
		ensure!(maxzoom <= 30, "{METADATA_MAXZOOM} ({maxzoom}) must be <= 30");
		Ok(maxzoom as u8)
	}

	/// Reads the archive folder name of a source, defaulting to the source id.
	pub fn source_folder<'a>(&'a self, source_id: &'a str) -> &'a str {
		self
			.metadata_value(METADATA_SOURCE_FOLDERS)
			.and_then(|folders| folders.get(source_id))
			.and_then(Value::as_str)
			.unwrap_or(source_id)
	}

	/// Writes the SMP metadata keys, creating the metadata object when absent.
	pub fn set_smp_metadata(&mut self, bounds: &GeoBBox, maxzoom: u8, source_folders: Option<Map<String, Value>>) {
		let metadata = self.metadata.get_or_insert_with(Map::new);
		metadata.insert(METADATA_BOUNDS.to_string(), Value::from(bounds.as_vec()));
		metadata.insert(METADATA_MAXZOOM.to_string(), Value::from(maxzoom));
		if let Some(folders) = source_folders {
			metadata.insert(METADATA_SOURCE_FOLDERS.to_string(), Value::Object(folders));
		}
	}

	fn metadata_value(&self, key: &str) -> Option<&Value> {
		self.metadata.as_ref()?.get(key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn minimal_style() -> Value {
		json!({
			"version": 8,
			"name": "Test Style",
			"sources": {
				"osm": {"type": "vector", "tiles": ["https://t/{z}/{x}/{y}.mvt"]}
			},
			"layers": [{"id": "bg", "type": "background"}],
			"custom:extension": {"anything": true}
		})
	}

	#[test]
	fn parse_and_round_trip() {
		let blob = Blob::from(minimal_style().to_string());
		let style = StyleDocument::parse(&blob).unwrap();
		style.check().unwrap();
		assert_eq!(style.version, 8);
		assert_eq!(style.sources.len(), 1);
		assert_eq!(style.layers.len(), 1);

		// unknown top-level fields survive serialization
		let value = style.to_value().unwrap();
		assert_eq!(value["name"], json!("Test Style"));
		assert_eq!(value["custom:extension"], json!({"anything": true}));
	}

	#[test]
	fn wrong_version_fails_check() {
		let style = StyleDocument::parse(&Blob::from(r#"{"version": 7, "sources": {}, "layers": []}"#)).unwrap();
		assert!(style.check().is_err());
	}

	#[test]
	fn garbage_fails_parse() {
		let error = StyleDocument::parse(&Blob::from("{nope")).unwrap_err();
		assert!(matches!(
			error.downcast_ref::<SmpError>(),
			Some(SmpError::InvalidStyle(_))
		));
	}

	#[test]
	fn smp_metadata_round_trip() {
		let mut style = StyleDocument::parse(&Blob::from(minimal_style().to_string())).unwrap();
		assert!(style.smp_bounds().is_err());

		let mut folders = Map::new();
		folders.insert("osm/v1".to_string(), Value::from("osm_v1"));
		style.set_smp_metadata(&GeoBBox(-10.0, -20.0, 10.0, 20.0), 12, Some(folders));

		assert_eq!(style.smp_bounds().unwrap(), GeoBBox(-10.0, -20.0, 10.0, 20.0));
		assert_eq!(style.smp_maxzoom().unwrap(), 12);
		assert_eq!(style.source_folder("osm/v1"), "osm_v1");
		assert_eq!(style.source_folder("osm"), "osm");
	}
}
