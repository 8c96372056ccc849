//! The download pipeline: style in, styled map package out.

mod fetch;
mod plan;
mod rewrite;
mod scheduler;

pub use fetch::{FetchResponse, Fetcher, HttpFetcher, MockFetcher};
pub use plan::{build_plan, PlanEntry, PlanOptions, PlanResource};
pub use rewrite::{rewrite_style, RewriteOptions, RewriteOutput, SpritePlan, TileSourcePlan};
pub use scheduler::{run_plan, DownloadReport, SchedulerOptions};

use anyhow::{Context, Result};
use smpack_container::SmpWriter;
use smpack_core::{mapbox, GeoBBox, GlyphRange, StyleDocument};
use std::io::{Seek, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default number of parallel fetches.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default retry attempts per resource.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default per-fetch timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do with `geojson` sources whose `data` is a URL.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GeoJsonPolicy {
	/// Fetch the document and embed it in the style.
	#[default]
	Inline,
	/// Remove the source from the style.
	Drop,
}

/// Cooperative cancellation shared by every task of a download run.
///
/// Cancelling stops new fetches from being issued; whether the writer finalizes with
/// what it has or the run fails is selected by
/// [`DownloadOptions::finalize_on_cancel`]. Dropping the download future instead
/// aborts everything immediately.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
	pub fn new() -> CancelFlag {
		CancelFlag::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Relaxed);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

/// Configuration of one download run.
pub struct DownloadOptions {
	/// Style URL; `https://` or `mapbox://styles/{user}/{id}`.
	pub style_url: String,
	/// Area to cover, `[west, south, east, north]`.
	pub bbox: GeoBBox,
	/// Highest zoom level to fetch; sources with a lower maxzoom stop earlier.
	pub maxzoom: u8,
	/// Public (`pk.`) access token, required for `mapbox://` URLs.
	pub access_token: Option<String>,
	pub concurrency: usize,
	pub retries: u32,
	pub timeout: Duration,
	/// Glyph ranges to fetch per referenced font stack.
	pub glyph_ranges: Vec<GlyphRange>,
	/// Sprite pixel ratios to fetch.
	pub pixel_ratios: Vec<u8>,
	/// When set, every `text-font` stack is replaced by its first match in this list.
	pub fonts: Option<Vec<String>>,
	pub geojson_policy: GeoJsonPolicy,
	/// On cancellation, close the archive with what was fetched instead of failing.
	pub finalize_on_cancel: bool,
	pub cancel: CancelFlag,
}

impl DownloadOptions {
	/// Options with defaults for everything but the request itself.
	pub fn new(style_url: impl Into<String>, bbox: GeoBBox, maxzoom: u8) -> DownloadOptions {
		DownloadOptions {
			style_url: style_url.into(),
			bbox,
			maxzoom,
			access_token: None,
			concurrency: DEFAULT_CONCURRENCY,
			retries: DEFAULT_RETRIES,
			timeout: DEFAULT_TIMEOUT,
			glyph_ranges: vec![GlyphRange::default()],
			pixel_ratios: vec![1, 2],
			fonts: None,
			geojson_policy: GeoJsonPolicy::default(),
			finalize_on_cancel: false,
			cancel: CancelFlag::new(),
		}
	}
}

/// Downloads a style and everything it references into `out`, using the HTTP transport.
pub async fn download<W: Write + Seek>(options: DownloadOptions, out: W) -> Result<(DownloadReport, W)> {
	let fetcher = HttpFetcher::new(options.timeout, options.retries)?;
	download_with(options, &fetcher, out).await
}

/// Downloads into a file at `path`.
pub async fn download_to_path(options: DownloadOptions, path: &Path) -> Result<DownloadReport> {
	let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
	let (report, _file) = download(options, file).await?;
	Ok(report)
}

/// Downloads through a caller-supplied transport; this is the whole pipeline.
pub async fn download_with<W: Write + Seek>(
	options: DownloadOptions,
	fetcher: &dyn Fetcher,
	out: W,
) -> Result<(DownloadReport, W)> {
	options.bbox.check().context("request bounding box")?;

	// fetch and parse the style; failure here aborts the run
	let style_url = mapbox::normalize_url(&options.style_url, options.access_token.as_deref())?;
	let response = fetcher
		.fetch(&style_url)
		.await
		.with_context(|| format!("fetching style from {}", options.style_url))?;
	let style = StyleDocument::parse(&response.body)?;

	let rewrite = rewrite_style(
		style,
		&RewriteOptions {
			bbox: options.bbox,
			maxzoom: options.maxzoom,
			access_token: options.access_token.as_deref(),
			fonts: options.fonts.as_deref(),
			geojson_policy: options.geojson_policy,
		},
		fetcher,
	)
	.await?;

	let plan = build_plan(
		&rewrite,
		&PlanOptions {
			glyph_ranges: &options.glyph_ranges,
			pixel_ratios: &options.pixel_ratios,
			access_token: options.access_token.as_deref(),
		},
	)?;
	log::info!(
		"planned {} resources across {} tile sources, up to zoom {}",
		plan.len(),
		rewrite.tile_sources.len(),
		rewrite.maxzoom
	);

	let mut writer = SmpWriter::new(out, &rewrite.style)?;
	let mut report = run_plan(
		plan,
		&rewrite.tile_sources,
		fetcher,
		&mut writer,
		&SchedulerOptions {
			concurrency: options.concurrency,
			cancel: options.cancel.clone(),
			finalize_on_cancel: options.finalize_on_cancel,
		},
	)
	.await?;
	report.warnings.extend(rewrite.warnings);

	let out = writer.finish()?;
	log::info!(
		"wrote {} tiles ({} skipped), {} glyph ranges, {} sprite files",
		report.tiles_written,
		report.tiles_skipped,
		report.glyphs_written,
		report.sprites_written
	);
	Ok((report, out))
}
