//! Turn a rewritten style into the ordered resource plan.
//!
//! Plan order is part of the container contract, because the writer appends entries in
//! exactly this order and readers stream the archive front to back:
//!
//! 1. glyph ranges, range-major, so every font stack's `0-255` comes first,
//! 2. sprite files, pixel ratio 1 before 2, `.json` before `.png`,
//! 3. tiles by ascending zoom; within a zoom the sources are interleaved round-robin,
//!    and within one `(zoom, source)` the coverage rectangle is walked row-major.
//!
//! Low zoom levels therefore land at the front of the archive and a partially read
//! package can already render a coarse map.

use crate::download::rewrite::RewriteOutput;
use anyhow::{Context, Result};
use smpack_core::{mapbox, render_tile_url, GlyphRange, TileBBox, TileCoord};

/// One resource to fetch, tagged with everything the writer needs.
#[derive(Clone, Debug)]
pub enum PlanResource {
	Glyph {
		fontstack: String,
		range: GlyphRange,
		url: String,
	},
	Sprite {
		id: String,
		pixel_ratio: u8,
		ext: &'static str,
		url: String,
	},
	Tile {
		source_index: usize,
		coord: TileCoord,
		url: String,
	},
}

impl PlanResource {
	pub fn url(&self) -> &str {
		match self {
			PlanResource::Glyph { url, .. } => url,
			PlanResource::Sprite { url, .. } => url,
			PlanResource::Tile { url, .. } => url,
		}
	}
}

/// A plan entry; `index` is the position in plan order.
#[derive(Clone, Debug)]
pub struct PlanEntry {
	pub index: usize,
	pub resource: PlanResource,
}

/// Knobs for plan construction.
pub struct PlanOptions<'a> {
	pub glyph_ranges: &'a [GlyphRange],
	pub pixel_ratios: &'a [u8],
	pub access_token: Option<&'a str>,
}

/// Builds the full, ordered resource plan.
pub fn build_plan(rewrite: &RewriteOutput, options: &PlanOptions<'_>) -> Result<Vec<PlanEntry>> {
	let mut resources: Vec<PlanResource> = Vec::new();

	// 1. glyphs, range-major
	if let Some(template) = &rewrite.glyph_template {
		for range in options.glyph_ranges {
			for fontstack in &rewrite.fontstacks {
				let url = template
					.replace("{fontstack}", &encode_path_component(fontstack))
					.replace("{range}", &range.to_string());
				let url = mapbox::normalize_url(&url, options.access_token)
					.with_context(|| format!("glyph URL for stack {fontstack:?}"))?;
				resources.push(PlanResource::Glyph {
					fontstack: fontstack.clone(),
					range: *range,
					url,
				});
			}
		}
	}

	// 2. sprites, ratio-major, manifest before image
	for sprite in &rewrite.sprites {
		for &pixel_ratio in options.pixel_ratios {
			for ext in [".json", ".png"] {
				let url = mapbox::normalize_sprite_url(&sprite.url, pixel_ratio, ext, options.access_token)
					.with_context(|| format!("sprite URL for {:?}", sprite.id))?;
				resources.push(PlanResource::Sprite {
					id: sprite.id.clone(),
					pixel_ratio,
					ext,
					url,
				});
			}
		}
	}

	// 3. tiles: ascending zoom, round-robin across sources, row-major within a source
	let zoom_range = rewrite.tile_sources.iter().map(|s| s.minzoom).min().unwrap_or(0)
		..=rewrite.tile_sources.iter().map(|s| s.maxzoom).max().unwrap_or(0);
	for level in zoom_range {
		let mut iterators = Vec::new();
		for (source_index, source) in rewrite.tile_sources.iter().enumerate() {
			if level < source.minzoom || level > source.maxzoom || source.bounds.is_degenerate() {
				continue;
			}
			let bbox = TileBBox::from_geo(level, &source.bounds)
				.with_context(|| format!("tile coverage of source {:?} at level {level}", source.id))?;
			iterators.push((source_index, bbox.iter_coords()));
		}

		let mut exhausted = false;
		while !exhausted {
			exhausted = true;
			for (source_index, iterator) in iterators.iter_mut() {
				if let Some(coord) = iterator.next() {
					exhausted = false;
					let source = &rewrite.tile_sources[*source_index];
					let url = render_tile_url(&source.templates, source.scheme, &coord)?;
					let url = mapbox::normalize_url(&url, options.access_token)?;
					resources.push(PlanResource::Tile {
						source_index: *source_index,
						coord,
						url,
					});
				}
			}
		}
	}

	Ok(resources
		.into_iter()
		.enumerate()
		.map(|(index, resource)| PlanEntry { index, resource })
		.collect())
}

/// Percent-encodes the characters that actually occur in font stack names.
fn encode_path_component(component: &str) -> String {
	component.replace('%', "%25").replace(' ', "%20")
}
