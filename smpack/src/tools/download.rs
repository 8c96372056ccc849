use anyhow::{bail, Result};
use colored::Colorize;
use smpack::{download_to_path, DownloadOptions, GeoJsonPolicy};
use smpack_core::GeoBBox;
use std::path::Path;
use std::time::Duration;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// style URL, e.g. https://example.com/style.json or mapbox://styles/{user}/{id}
	#[arg(required = true)]
	style_url: String,

	/// output package file, e.g. map.smp
	#[arg(required = true)]
	output_file: String,

	/// area to download
	#[arg(
		long,
		short,
		value_name = "lon_min,lat_min,lon_max,lat_max",
		allow_hyphen_values = true,
		required = true,
		display_order = 1
	)]
	bbox: String,

	/// maximum zoom level to download
	#[arg(long, value_name = "int", required = true, display_order = 1)]
	max_zoom: u8,

	/// mapbox public access token (pk.*)
	#[arg(long, value_name = "token", display_order = 2)]
	access_token: Option<String>,

	/// number of parallel fetches
	#[arg(long, value_name = "int", display_order = 3)]
	concurrency: Option<usize>,

	/// retry attempts per resource
	#[arg(long, value_name = "int", display_order = 3)]
	retries: Option<u32>,

	/// per-fetch timeout in seconds
	#[arg(long, value_name = "seconds", display_order = 3)]
	timeout: Option<u64>,

	/// replace every font stack with its first match from this list
	#[arg(long, value_name = "names", value_delimiter = ',', display_order = 4)]
	fonts: Option<Vec<String>>,

	/// drop geojson sources with remote data instead of inlining them
	#[arg(long, display_order = 4)]
	drop_geojson: bool,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("download {:?} to {:?}", arguments.style_url, arguments.output_file);

	let mut options = DownloadOptions::new(&arguments.style_url, parse_bbox(&arguments.bbox)?, arguments.max_zoom);
	options.access_token = arguments.access_token.clone();
	options.fonts = arguments.fonts.clone();
	if arguments.drop_geojson {
		options.geojson_policy = GeoJsonPolicy::Drop;
	}
	if let Some(concurrency) = arguments.concurrency {
		options.concurrency = concurrency;
	}
	if let Some(retries) = arguments.retries {
		options.retries = retries;
	}
	if let Some(timeout) = arguments.timeout {
		options.timeout = Duration::from_secs(timeout);
	}

	let report = download_to_path(options, Path::new(&arguments.output_file)).await?;

	eprintln!(
		"wrote {} tiles ({} skipped), {} glyph ranges, {} sprite files",
		report.tiles_written, report.tiles_skipped, report.glyphs_written, report.sprites_written
	);
	for warning in &report.warnings {
		eprintln!("  {} {warning}", "⚠".yellow());
	}
	for error in &report.errors {
		eprintln!("  {} {error}", "✘".red());
	}

	Ok(())
}

fn parse_bbox(input: &str) -> Result<GeoBBox> {
	let values: Vec<f64> = input
		.split(&[' ', ',', ';'])
		.filter(|s| !s.is_empty())
		.map(|s| s.parse::<f64>().map_err(|_| anyhow::anyhow!("bbox value {s:?} is not a number")))
		.collect::<Result<Vec<f64>>>()?;

	if values.len() != 4 {
		bail!("bbox must contain exactly 4 numbers, got {input:?}");
	}

	let bbox = GeoBBox::try_from(values)?;
	bbox.check()?;
	Ok(bbox)
}
