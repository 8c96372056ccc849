//! Execute the resource plan with bounded concurrency and deliver results to the writer
//! in plan order.
//!
//! The plan becomes a stream of fetch futures run through `buffered(concurrency)`: at
//! most `concurrency` fetches are in flight, completed out-of-order results are held in
//! the buffered window until the head of the plan completes, and the sequential writer
//! drain applies backpressure — no new fetch starts while the window is full. That is
//! the whole reorder story; there is no separate queue to maintain.
//!
//! ## Failure policy (per resource)
//! - tile 4xx → skip silently; sparse coverage is allowed
//! - tile 5xx / network failure → transport retries, then skip with a warning
//! - tile with a format other than its source's → the source fails, its remaining
//!   tiles are skipped, the mismatch is reported
//! - glyph missing → skip
//! - sprite file missing at pixel ratio 1 → reported as an error for that sprite; the
//!   archive still completes
//! - higher-ratio sprite missing → warning

use crate::download::fetch::Fetcher;
use crate::download::plan::{PlanEntry, PlanResource};
use crate::download::rewrite::TileSourcePlan;
use crate::download::CancelFlag;
use anyhow::{bail, Result};
use futures::{stream, StreamExt};
use smpack_container::SmpWriter;
use smpack_core::{SmpError, TileFormat};
use std::io::{Seek, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scheduler knobs; `concurrency` bounds the in-flight fetches and the reorder window.
pub struct SchedulerOptions {
	pub concurrency: usize,
	pub cancel: CancelFlag,
	pub finalize_on_cancel: bool,
}

/// What a download run did: written/skipped counts plus collected warnings and errors.
/// `errors` being non-empty means the package is missing something a renderer may need
/// (a 1x sprite), not that the archive is unusable.
#[derive(Debug, Default)]
pub struct DownloadReport {
	pub tiles_written: usize,
	pub tiles_skipped: usize,
	pub glyphs_written: usize,
	pub glyphs_skipped: usize,
	pub sprites_written: usize,
	pub warnings: Vec<String>,
	pub errors: Vec<String>,
	pub cancelled: bool,
}

/// Fetches every plan entry and appends the results to `writer` in plan order.
pub async fn run_plan<W: Write + Seek>(
	plan: Vec<PlanEntry>,
	sources: &[TileSourcePlan],
	fetcher: &dyn Fetcher,
	writer: &mut SmpWriter<W>,
	options: &SchedulerOptions,
) -> Result<DownloadReport> {
	let mut report = DownloadReport::default();
	let failed_sources: Arc<Vec<AtomicBool>> = Arc::new((0..sources.len()).map(|_| AtomicBool::new(false)).collect());
	let cancel = options.cancel.clone();

	let mut results = stream::iter(plan.into_iter().map(|entry| {
		let failed_sources = Arc::clone(&failed_sources);
		let cancel = cancel.clone();
		async move {
			if cancel.is_cancelled() {
				return (entry, None);
			}
			if let PlanResource::Tile { source_index, .. } = &entry.resource {
				if failed_sources[*source_index].load(Ordering::Relaxed) {
					return (entry, None);
				}
			}
			let result = fetcher.fetch(entry.resource.url()).await;
			(entry, Some(result))
		}
	}))
	.buffered(options.concurrency.max(1));

	while let Some((entry, result)) = results.next().await {
		let Some(result) = result else {
			// skipped before fetching: cancellation or a failed source
			if matches!(entry.resource, PlanResource::Tile { .. }) {
				report.tiles_skipped += 1;
			}
			continue;
		};
		match entry.resource {
			PlanResource::Tile { source_index, coord, url } => {
				let source = &sources[source_index];
				match result {
					Ok(response) => {
						let sniffed = TileFormat::from_bytes(response.body.as_slice()).ok().or_else(|| {
							response.content_type.as_deref().and_then(TileFormat::from_content_type)
						});
						match sniffed {
							Some(format) if format == source.format => {
								writer.add_tile(response.body, &source.folder, &coord, format)?;
								report.tiles_written += 1;
							}
							Some(format) => {
								failed_sources[source_index].store(true, Ordering::Relaxed);
								let mismatch = SmpError::FormatMismatch {
									source: source.id.clone(),
									expected: source.format,
									found: format,
								};
								log::error!("{mismatch}");
								report.errors.push(mismatch.to_string());
								report.tiles_skipped += 1;
							}
							None => {
								log::warn!("skipping tile {coord} of {:?}: unidentifiable payload", source.id);
								report.warnings.push(format!("tile {coord} of {:?} has an unknown format", source.id));
								report.tiles_skipped += 1;
							}
						}
					}
					Err(e) if SmpError::is_not_found(&e) => {
						log::debug!("tile {coord} of {:?} is missing upstream", source.id);
						report.tiles_skipped += 1;
					}
					Err(e) => {
						log::warn!("giving up on tile {coord} of {:?}: {e:#}", source.id);
						report.warnings.push(format!("tile {url} failed: {e:#}"));
						report.tiles_skipped += 1;
					}
				}
			}
			PlanResource::Glyph { fontstack, range, url } => match result {
				Ok(response) => {
					writer.add_glyphs(response.body, &fontstack, &range)?;
					report.glyphs_written += 1;
				}
				Err(e) if SmpError::is_not_found(&e) => {
					log::debug!("glyph range {range} of {fontstack:?} is missing upstream");
					report.glyphs_skipped += 1;
				}
				Err(e) => {
					log::warn!("giving up on glyphs {fontstack:?} {range}: {e:#}");
					report.warnings.push(format!("glyphs {url} failed: {e:#}"));
					report.glyphs_skipped += 1;
				}
			},
			PlanResource::Sprite { id, pixel_ratio, ext, url } => match result {
				Ok(response) => {
					writer.add_sprite(response.body, &id, pixel_ratio, ext)?;
					report.sprites_written += 1;
				}
				Err(e) if pixel_ratio == 1 => {
					log::error!("sprite {id:?} is missing its 1x {ext} file: {e:#}");
					report.errors.push(format!("sprite {id:?} is missing {url}: {e:#}"));
				}
				Err(e) => {
					log::warn!("sprite {id:?} has no {pixel_ratio}x {ext} variant: {e:#}");
					report.warnings.push(format!("sprite {id:?} has no {pixel_ratio}x {ext} variant"));
				}
			},
		}
	}

	if cancel.is_cancelled() {
		report.cancelled = true;
		if !options.finalize_on_cancel {
			bail!("download cancelled");
		}
		log::info!("cancelled, finalizing with what was fetched");
	}

	Ok(report)
}
