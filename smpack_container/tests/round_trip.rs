//! Writer → reader round trip over a real file.

use anyhow::Result;
use assert_fs::{prelude::*, NamedTempFile};
use smpack_container::{testing, validate_path, SmpReader};
use smpack_core::utils::decompress_gzip;
use smpack_core::Blob;

#[test]
fn write_read_validate() -> Result<()> {
	let package = testing::build_minimal_package()?;
	let temp = NamedTempFile::new("round_trip.smp")?;
	temp.write_binary(package.as_slice())?;

	// the reader sees everything the writer put in
	let reader = SmpReader::open_path(temp.path())?;
	assert_eq!(reader.get_version()?, Some("1.0".to_string()));

	let style = reader.get_style()?;
	style.check()?;
	assert_eq!(style.smp_maxzoom()?, 4);

	let paths = reader.entry_paths()?;
	assert_eq!(&paths[0..2], &["VERSION".to_string(), "style.json".to_string()]);

	// every internal URI in the style resolves to an entry
	for source in style.sources.values() {
		for template in source["tiles"].as_array().unwrap() {
			let path = smpack_core::internal_path(template.as_str().unwrap()).unwrap();
			let prefix = path.split('{').next().unwrap();
			assert!(paths.iter().any(|p| p.starts_with(prefix)), "no entries under {prefix}");
		}
	}

	// tile payloads come back bit-identical
	let tile = reader.get_resource("s/osm/0/0/0.mvt.gz")?;
	assert_eq!(
		decompress_gzip(&tile.blob)?,
		Blob::from(testing::MOCK_BYTES_MVT_RAW)
	);

	// and the validator agrees
	let report = validate_path(temp.path());
	assert!(report.is_valid(), "errors: {:?}", report.errors);
	assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);

	reader.close();
	Ok(())
}
