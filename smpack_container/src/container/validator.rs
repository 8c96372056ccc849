//! Layered structural audit of a styled map package.
//!
//! Validation runs levels L1 through L8 and collects human-readable errors and
//! warnings instead of failing fast; only an unreadable archive or an unparseable style
//! stops the remaining levels. The result never carries an `Err` — broken input is a
//! finding, not a failure.
//!
//! | Level | Check |
//! |-------|-------|
//! | L1 | file exists, parses as ZIP |
//! | L2 | `VERSION` grammar and supported major |
//! | L3 | `style.json` present |
//! | L4 | style parses as JSON and passes the style validator |
//! | L5 | SMP metadata present and well-formed |
//! | L6 | every internal tile template has at least one tile entry |
//! | L7 | internal glyph template has at least one glyph entry |
//! | L8 | internal sprites have `.json` + `.png` (and `@2x` variants) |

use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use smpack_core::{internal_path, Blob, SUPPORTED_MAJOR_VERSIONS, STYLE_PATH, VERSION_PATH};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use zip::ZipArchive;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\n$").expect("version regex"));

/// The outcome of a validation run.
#[derive(Debug, Default)]
pub struct ValidationReport {
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
}

impl ValidationReport {
	/// A package is valid when no errors were found; warnings do not count.
	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	fn error(&mut self, message: impl Into<String>) {
		self.errors.push(message.into());
	}

	fn warning(&mut self, message: impl Into<String>) {
		self.warnings.push(message.into());
	}
}

/// Style-spec validation is an external capability; implementations return one message
/// per problem found.
pub trait StyleValidator {
	fn validate(&self, style: &Value) -> Vec<String>;
}

/// Built-in fallback validator checking the structural minimum: version 8, a `sources`
/// object, and a `layers` array of objects with `id` and `type`.
pub struct BasicStyleValidator;

impl StyleValidator for BasicStyleValidator {
	fn validate(&self, style: &Value) -> Vec<String> {
		let mut messages = Vec::new();
		if style.get("version").and_then(Value::as_i64) != Some(8) {
			messages.push("style version must be 8".to_string());
		}
		if !style.get("sources").is_some_and(Value::is_object) {
			messages.push("style must have a \"sources\" object".to_string());
		}
		match style.get("layers").and_then(Value::as_array) {
			None => messages.push("style must have a \"layers\" array".to_string()),
			Some(layers) => {
				for (index, layer) in layers.iter().enumerate() {
					if layer.get("id").and_then(Value::as_str).is_none()
						|| layer.get("type").and_then(Value::as_str).is_none()
					{
						messages.push(format!("layer {index} must have \"id\" and \"type\""));
					}
				}
			}
		}
		messages
	}
}

/// Validates the package at `path` with the built-in style validator.
pub fn validate_path(path: &Path) -> ValidationReport {
	validate_path_with(path, &BasicStyleValidator)
}

/// Validates the package at `path`, delegating style-spec checks to `style_validator`.
pub fn validate_path_with(path: &Path, style_validator: &dyn StyleValidator) -> ValidationReport {
	let mut report = ValidationReport::default();

	// L1: file exists and parses as ZIP
	let file = match File::open(path) {
		Ok(file) => file,
		Err(_) => {
			report.error(format!("File not found: {}", path.display()));
			return report;
		}
	};
	let mut archive = match ZipArchive::new(file) {
		Ok(archive) => archive,
		Err(e) => {
			report.error(format!("Not a valid ZIP archive: {e}"));
			return report;
		}
	};

	let entries = match entry_names(&mut archive) {
		Ok(entries) => entries,
		Err(e) => {
			report.error(format!("Not a valid ZIP archive: {e}"));
			return report;
		}
	};

	// L2: VERSION grammar and supported major
	match read_entry(&mut archive, VERSION_PATH) {
		None => report.warning("Missing VERSION file"),
		Some(blob) => check_version(&blob, &mut report),
	}

	// L3: style.json present
	let Some(style_blob) = read_entry(&mut archive, STYLE_PATH) else {
		report.error("style.json not found in archive");
		return report;
	};

	// L4: style parses and passes the style validator
	let style: Value = match serde_json::from_slice(style_blob.as_slice()) {
		Ok(style) => style,
		Err(e) => {
			report.error(format!("style.json is not valid JSON: {e}"));
			return report;
		}
	};
	for message in style_validator.validate(&style) {
		report.error(message);
	}

	check_metadata(&style, &mut report);
	check_tile_entries(&style, &entries, &mut report);
	check_glyph_entries(&style, &entries, &mut report);
	check_sprite_entries(&style, &entries, &mut report);

	report
}

fn check_version(blob: &Blob, report: &mut ValidationReport) {
	let content = blob.as_str();
	let Some(captures) = VERSION_RE.captures(content) else {
		report.error(format!("Invalid VERSION content {content:?}, expected \"MAJOR.MINOR\\n\""));
		return;
	};
	let major: u32 = captures[1].parse().unwrap_or(u32::MAX);
	if !SUPPORTED_MAJOR_VERSIONS.contains(&major) {
		report.error(format!("Unsupported major version {major}"));
	}
}

// L5
fn check_metadata(style: &Value, report: &mut ValidationReport) {
	let metadata = style.get("metadata");

	match metadata.and_then(|m| m.get("smp:bounds")) {
		None => report.error("Missing required style metadata \"smp:bounds\""),
		Some(bounds) => {
			let well_formed = bounds
				.as_array()
				.is_some_and(|values| values.len() == 4 && values.iter().all(Value::is_number));
			if !well_formed {
				report.warning(format!("Malformed \"smp:bounds\", expected 4 numbers, got {bounds}"));
			}
		}
	}

	match metadata.and_then(|m| m.get("smp:maxzoom")) {
		None => report.error("Missing required style metadata \"smp:maxzoom\""),
		Some(maxzoom) => {
			if !maxzoom.is_u64() {
				report.warning(format!(
					"Malformed \"smp:maxzoom\", expected a non-negative integer, got {maxzoom}"
				));
			}
		}
	}

	if let Some(folders) = metadata.and_then(|m| m.get("smp:sourceFolders")) {
		if !folders.is_object() {
			report.warning(format!("Malformed \"smp:sourceFolders\", expected an object, got {folders}"));
		}
	}
}

// L6
fn check_tile_entries(style: &Value, entries: &[String], report: &mut ValidationReport) {
	let Some(sources) = style.get("sources").and_then(Value::as_object) else {
		return;
	};
	for (id, source) in sources {
		let Some(templates) = source.get("tiles").and_then(Value::as_array) else {
			continue;
		};
		let missing = templates
			.iter()
			.filter_map(Value::as_str)
			.filter_map(internal_path)
			.any(|path| {
				let prefix = path.split('{').next().unwrap_or(path);
				!entries.iter().any(|entry| entry.starts_with(prefix))
			});
		if missing {
			report.error(format!("No tile files found for source \"{id}\""));
		}
	}
}

// L7
fn check_glyph_entries(style: &Value, entries: &[String], report: &mut ValidationReport) {
	let Some(glyphs) = style.get("glyphs").and_then(Value::as_str) else {
		return;
	};
	let Some(path) = internal_path(glyphs) else {
		return;
	};
	let prefix = path.split('{').next().unwrap_or_default();
	let found = if prefix.is_empty() {
		entries.iter().any(|entry| entry.ends_with(".pbf.gz"))
	} else {
		entries.iter().any(|entry| entry.starts_with(prefix))
	};
	if !found {
		report.error(format!("No glyph files found for \"{glyphs}\""));
	}
}

// L8
fn check_sprite_entries(style: &Value, entries: &[String], report: &mut ValidationReport) {
	for (id, url) in sprite_urls(style) {
		let Some(base) = internal_path(&url) else {
			continue;
		};
		for ext in [".json", ".png"] {
			let required = format!("{base}{ext}");
			if !entries.contains(&required) {
				report.error(format!("Missing sprite file \"{required}\""));
			}
		}
		let has_2x = [".json", ".png"]
			.iter()
			.all(|ext| entries.contains(&format!("{base}@2x{ext}")));
		if !has_2x {
			report.warning(format!("Missing @2x sprite files for \"{id}\""));
		}
	}
}

fn sprite_urls(style: &Value) -> Vec<(String, String)> {
	match style.get("sprite") {
		Some(Value::String(url)) => vec![("default".to_string(), url.clone())],
		Some(Value::Array(items)) => items
			.iter()
			.filter_map(|item| {
				let id = item.get("id").and_then(Value::as_str)?;
				let url = item.get("url").and_then(Value::as_str)?;
				Some((id.to_string(), url.to_string()))
			})
			.collect(),
		_ => Vec::new(),
	}
}

fn entry_names(archive: &mut ZipArchive<File>) -> Result<Vec<String>> {
	let mut names = Vec::with_capacity(archive.len());
	for index in 0..archive.len() {
		names.push(archive.by_index(index)?.name().to_string());
	}
	Ok(names)
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Option<Blob> {
	let mut entry = archive.by_name(name).ok()?;
	let mut bytes = Vec::new();
	entry.read_to_end(&mut bytes).ok()?;
	Some(Blob::from(bytes))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{build_minimal_package, build_package_with_version};
	use assert_fs::{prelude::*, NamedTempFile};

	fn write_temp(name: &str, blob: &Blob) -> NamedTempFile {
		let temp = NamedTempFile::new(name).unwrap();
		temp.write_binary(blob.as_slice()).unwrap();
		temp
	}

	#[test]
	fn minimal_package_is_valid_without_warnings() {
		let temp = write_temp("minimal.smp", &build_minimal_package().unwrap());
		let report = validate_path(temp.path());
		assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
		assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);
	}

	#[test]
	fn nonexistent_path() {
		let report = validate_path(Path::new("/no/such/file.smp"));
		assert!(!report.is_valid());
		assert!(report.errors[0].contains("File not found"));
	}

	#[test]
	fn random_bytes_are_not_a_zip() {
		let temp = write_temp("random.smp", &Blob::from("complete and utter garbage"));
		let report = validate_path(temp.path());
		assert!(!report.is_valid());
		assert!(report.errors[0].contains("Not a valid ZIP"));
	}

	#[test]
	fn unsupported_major_version() {
		let temp = write_temp("v2.smp", &build_package_with_version("2.0\n").unwrap());
		let report = validate_path(temp.path());
		assert!(!report.is_valid());
		assert!(report.errors.iter().any(|e| e.contains("Unsupported major version")));
	}

	#[test]
	fn minor_versions_are_forwards_compatible() {
		let temp = write_temp("v1_1.smp", &build_package_with_version("1.1\n").unwrap());
		let report = validate_path(temp.path());
		assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
	}

	#[test]
	fn bad_version_grammar_is_an_error() {
		let temp = write_temp("badversion.smp", &build_package_with_version("1.0").unwrap());
		let report = validate_path(temp.path());
		assert!(!report.is_valid());
		assert!(report.errors.iter().any(|e| e.contains("Invalid VERSION")));
	}

	#[test]
	fn missing_tiles_for_referenced_source() {
		let blob = crate::testing::build_package_without_tiles().unwrap();
		let temp = write_temp("notiles.smp", &blob);
		let report = validate_path(temp.path());
		assert!(!report.is_valid());
		assert!(report
			.errors
			.iter()
			.any(|e| e.contains("No tile files found for source \"osm\"")));
	}

	#[test]
	fn missing_2x_sprites_is_a_warning() {
		let blob = crate::testing::build_package_without_2x_sprites().unwrap();
		let temp = write_temp("no2x.smp", &blob);
		let report = validate_path(temp.path());
		assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
		assert!(report.warnings.iter().any(|w| w.contains("@2x")));
	}

	#[test]
	fn basic_style_validator_messages() {
		let messages = BasicStyleValidator.validate(&serde_json::json!({
			"version": 7,
			"layers": [{"id": "x"}]
		}));
		assert_eq!(messages.len(), 3);
	}
}
