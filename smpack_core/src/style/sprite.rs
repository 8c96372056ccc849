//! The style's `sprite` property, which is either a single URL or a list of
//! `{id, url}` entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sprite id used when the style carries the single-URL form.
pub const DEFAULT_SPRITE_ID: &str = "default";

/// The `sprite` property of a style.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SpriteDef {
	Single(String),
	Multi(Vec<SpriteEntry>),
}

/// One entry of the array-valued `sprite` form.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SpriteEntry {
	pub id: String,
	pub url: String,
	#[serde(flatten)]
	pub rest: Map<String, Value>,
}

impl SpriteDef {
	/// Returns `(id, url)` pairs regardless of form; the single form uses
	/// [`DEFAULT_SPRITE_ID`].
	pub fn entries(&self) -> Vec<(String, String)> {
		match self {
			SpriteDef::Single(url) => vec![(DEFAULT_SPRITE_ID.to_string(), url.clone())],
			SpriteDef::Multi(entries) => entries.iter().map(|e| (e.id.clone(), e.url.clone())).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn single_form() {
		let def: SpriteDef = serde_json::from_value(json!("https://example.com/sprite")).unwrap();
		assert_eq!(
			def.entries(),
			vec![("default".to_string(), "https://example.com/sprite".to_string())]
		);
	}

	#[test]
	fn multi_form_preserves_order() {
		let def: SpriteDef = serde_json::from_value(json!([
			{"id": "roads", "url": "https://example.com/roads"},
			{"id": "poi", "url": "https://example.com/poi"}
		]))
		.unwrap();
		let entries = def.entries();
		assert_eq!(entries[0].0, "roads");
		assert_eq!(entries[1].0, "poi");
	}
}
