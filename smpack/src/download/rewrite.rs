//! Rewrite a remote style into its package-internal form and derive what must be
//! fetched.
//!
//! This is the first half of the download pipeline: sources the package cannot carry are
//! dropped, TileJSON-by-URL sources are inlined, every resource reference is replaced by
//! an `smp://` URI, font stacks are collapsed against the available set, and the SMP
//! metadata is computed. The output carries the per-source fetch plans the planner turns
//! into concrete tile coordinates.

use crate::download::fetch::Fetcher;
use crate::download::GeoJsonPolicy;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use smpack_core::{
	collect_font_stacks, glyph_template_path, internal_uri, mapbox, render_tile_url, replace_font_stacks,
	sprite_base_path, tile_template_path, GeoBBox, SpriteDef, SpriteEntry, StyleDocument, Source, TileBBox, TileCoord,
	TileFormat, TileScheme, TileSetSource,
};

/// Maximum zoom stored for packages whose only sources are GeoJSON.
const GEOJSON_ONLY_MAXZOOM: u8 = 16;

/// What the rewriter needs to know about the download request.
pub struct RewriteOptions<'a> {
	pub bbox: GeoBBox,
	pub maxzoom: u8,
	pub access_token: Option<&'a str>,
	pub fonts: Option<&'a [String]>,
	pub geojson_policy: GeoJsonPolicy,
}

/// Fetch plan for one tile source.
#[derive(Clone, Debug)]
pub struct TileSourcePlan {
	pub id: String,
	pub folder: String,
	pub templates: Vec<String>,
	pub scheme: TileScheme,
	pub format: TileFormat,
	/// Source bounds intersected with the request bbox; degenerate when disjoint.
	pub bounds: GeoBBox,
	pub minzoom: u8,
	/// Stored maxzoom: the source maxzoom clamped to the requested one.
	pub maxzoom: u8,
}

/// One sprite to fetch, keyed by its id and remote base URL.
#[derive(Clone, Debug)]
pub struct SpritePlan {
	pub id: String,
	pub url: String,
}

/// The rewritten style plus everything the planner needs.
pub struct RewriteOutput {
	pub style: StyleDocument,
	pub tile_sources: Vec<TileSourcePlan>,
	/// Comma-joined font stack names to fetch glyphs for, in first-seen order.
	pub fontstacks: Vec<String>,
	/// The remote glyph URL template, with `{fontstack}` and `{range}` placeholders.
	pub glyph_template: Option<String>,
	pub sprites: Vec<SpritePlan>,
	pub bounds: GeoBBox,
	pub maxzoom: u8,
	pub warnings: Vec<String>,
}

/// Rewrites `style` for packaging. Fetches TileJSON documents, GeoJSON data (per
/// policy), and format-probe tiles through `fetcher`; a TileJSON that cannot be fetched
/// aborts, since without it no tile set can be planned.
pub async fn rewrite_style(
	mut style: StyleDocument,
	options: &RewriteOptions<'_>,
	fetcher: &dyn Fetcher,
) -> Result<RewriteOutput> {
	style.check()?;

	let mut tile_sources: Vec<TileSourcePlan> = Vec::new();
	let mut new_sources = Map::new();
	let mut folders = Map::new();
	let mut any_folder_differs = false;
	let mut geojson_bounds: Vec<GeoBBox> = Vec::new();
	let mut has_geojson = false;
	let mut warnings = Vec::new();

	for (id, value) in std::mem::take(&mut style.sources) {
		match Source::from_value(&value)? {
			Source::Vector(tileset) | Source::Raster(tileset) => {
				let mut tileset = tileset;
				if tileset.tiles.is_none() {
					let Some(url) = tileset.url.take() else {
						warnings.push(format!("dropping source {id:?}: neither \"tiles\" nor \"url\" is set"));
						continue;
					};
					inline_tilejson(&mut tileset, &url, options, fetcher)
						.await
						.with_context(|| format!("inlining TileJSON of source {id:?}"))?;
				}
				tileset.url = None;

				let templates = tileset.tiles.clone().unwrap_or_default();
				if templates.is_empty() {
					warnings.push(format!("dropping source {id:?}: its TileJSON has no tile URLs"));
					continue;
				}

				let plan = plan_tile_source(&id, &mut tileset, templates, options, fetcher).await?;
				if plan.folder != id {
					any_folder_differs = true;
				}
				folders.insert(id.clone(), Value::from(plan.folder.clone()));
				tile_sources.push(plan);
				new_sources.insert(id, serde_json::to_value(&tileset)?);
			}
			Source::GeoJson(geojson) => {
				let mut geojson = geojson;
				has_geojson = true;
				if let Some(Value::String(url)) = &geojson.data {
					let url = url.clone();
					match options.geojson_policy {
						GeoJsonPolicy::Drop => {
							warnings.push(format!("dropping geojson source {id:?} with remote data"));
							continue;
						}
						GeoJsonPolicy::Inline => match fetch_geojson(&url, fetcher).await {
							Ok(data) => geojson.data = Some(data),
							Err(e) => {
								warnings.push(format!("dropping geojson source {id:?}: {e:#}"));
								continue;
							}
						},
					}
				}
				if let Some(data) = &geojson.data {
					if let Ok(bbox) = GeoBBox::try_from(data.get("bbox").unwrap_or(&Value::Null)) {
						geojson_bounds.push(bbox);
					}
				}
				new_sources.insert(id, serde_json::to_value(&geojson)?);
			}
			Source::Other(value) => {
				warnings.push(format!(
					"dropping source {id:?}: unsupported type {}",
					value.get("type").cloned().unwrap_or_default()
				));
			}
		}
	}
	style.sources = new_sources;

	// Fonts: collapse each referenced stack against the available set, then rewrite the
	// glyph endpoint. A style with no text layers needs no glyph entries at all.
	if let Some(available) = options.fonts {
		replace_font_stacks(&mut style.layers, available);
	}
	let fontstacks: Vec<String> = collect_font_stacks(&style.layers)
		.iter()
		.map(|stack| stack.join(","))
		.collect();
	let glyph_template = style.glyphs.clone();
	style.glyphs = if glyph_template.is_some() && !fontstacks.is_empty() {
		Some(internal_uri(&glyph_template_path()))
	} else {
		None
	};

	// Sprites: remember the remote base URLs, point the style at the internal ones.
	let mut sprites = Vec::new();
	if let Some(def) = style.sprite.take() {
		for (id, url) in def.entries() {
			sprites.push(SpritePlan { id, url });
		}
		style.sprite = Some(match &def {
			SpriteDef::Single(_) => SpriteDef::Single(internal_uri(&sprite_base_path(smpack_core::DEFAULT_SPRITE_ID))),
			SpriteDef::Multi(entries) => SpriteDef::Multi(
				entries
					.iter()
					.map(|entry| SpriteEntry {
						id: entry.id.clone(),
						url: internal_uri(&sprite_base_path(&entry.id)),
						rest: entry.rest.clone(),
					})
					.collect(),
			),
		});
	}

	// SMP metadata: bounds are the union of what the package actually covers.
	let bounds = GeoBBox::union_all(
		tile_sources
			.iter()
			.filter(|source| !source.bounds.is_degenerate())
			.map(|source| source.bounds)
			.chain(geojson_bounds),
	)
	.unwrap_or(options.bbox);
	let maxzoom = match tile_sources.iter().map(|source| source.maxzoom).max() {
		Some(maxzoom) => maxzoom,
		None if has_geojson => GEOJSON_ONLY_MAXZOOM,
		None => options.maxzoom,
	};
	style.set_smp_metadata(&bounds, maxzoom, any_folder_differs.then_some(folders));

	for warning in &warnings {
		log::warn!("{warning}");
	}

	Ok(RewriteOutput {
		style,
		tile_sources,
		fontstacks,
		glyph_template,
		sprites,
		bounds,
		maxzoom,
		warnings,
	})
}

/// Fetches a TileJSON document and fills the missing source fields from it.
async fn inline_tilejson(
	tileset: &mut TileSetSource,
	url: &str,
	options: &RewriteOptions<'_>,
	fetcher: &dyn Fetcher,
) -> Result<()> {
	let url = mapbox::normalize_url(url, options.access_token)?;
	let response = fetcher.fetch(&url).await?;
	let tilejson: Value = serde_json::from_slice(response.body.as_slice()).context("TileJSON does not parse")?;

	if tileset.tiles.is_none() {
		tileset.tiles = serde_json::from_value(tilejson.get("tiles").cloned().unwrap_or(Value::Null)).ok();
	}
	if tileset.bounds.is_none() {
		tileset.bounds = serde_json::from_value(tilejson.get("bounds").cloned().unwrap_or(Value::Null)).ok();
	}
	if tileset.minzoom.is_none() {
		tileset.minzoom = tilejson.get("minzoom").and_then(Value::as_u64).map(|z| z as u8);
	}
	if tileset.maxzoom.is_none() {
		tileset.maxzoom = tilejson.get("maxzoom").and_then(Value::as_u64).map(|z| z as u8);
	}
	if tileset.scheme.is_none() {
		tileset.scheme = tilejson.get("scheme").and_then(Value::as_str).map(str::to_string);
	}
	Ok(())
}

async fn fetch_geojson(url: &str, fetcher: &dyn Fetcher) -> Result<Value> {
	let response = fetcher.fetch(url).await?;
	serde_json::from_slice(response.body.as_slice()).context("GeoJSON does not parse")
}

/// Computes one source's fetch plan and rewrites its fields to package-internal form.
async fn plan_tile_source(
	id: &str,
	tileset: &mut TileSetSource,
	templates: Vec<String>,
	options: &RewriteOptions<'_>,
	fetcher: &dyn Fetcher,
) -> Result<TileSourcePlan> {
	let scheme = TileScheme::from_str(tileset.scheme.as_deref());
	let folder = sanitize_folder(id);

	let source_bounds = match &tileset.bounds {
		Some(values) => GeoBBox::try_from(values.clone()).with_context(|| format!("bounds of source {id:?}"))?,
		None => GeoBBox::new(-180.0, -90.0, 180.0, 90.0),
	};
	let bounds = source_bounds.intersected(&options.bbox);

	let minzoom = tileset.minzoom.unwrap_or(0);
	let maxzoom = tileset.maxzoom.unwrap_or(options.maxzoom).min(options.maxzoom);

	let format = match declared_format(tileset, &templates) {
		Some(format) => format,
		None => probe_format(id, &templates, scheme, &bounds, minzoom, maxzoom, options, fetcher).await?,
	};

	// Rewrite: storage is always XYZ, coverage is what we will actually fetch.
	tileset.tiles = Some(vec![internal_uri(&tile_template_path(&folder, format))]);
	tileset.scheme = None;
	if !bounds.is_degenerate() {
		tileset.bounds = Some(bounds.as_vec());
	}
	tileset.minzoom = Some(minzoom.min(maxzoom));
	tileset.maxzoom = Some(maxzoom);

	Ok(TileSourcePlan {
		id: id.to_string(),
		folder,
		templates,
		scheme,
		format,
		bounds,
		minzoom,
		maxzoom,
	})
}

/// The format a source's tiles must have, when it is knowable without fetching: vector
/// sources are MVT, raster sources declare by the template's file extension. `None`
/// means the first tile decides (see [`probe_format`]).
fn declared_format(tileset: &TileSetSource, templates: &[String]) -> Option<TileFormat> {
	if tileset.kind == "vector" {
		return Some(TileFormat::MVT);
	}
	let template = templates[0].to_ascii_lowercase();
	if template.contains(".webp") {
		Some(TileFormat::WEBP)
	} else if template.contains(".jpg") || template.contains(".jpeg") {
		Some(TileFormat::JPG)
	} else if template.contains(".png") {
		Some(TileFormat::PNG)
	} else {
		None
	}
}

/// Fetches the first tile of a source's coverage and sniffs its format, so
/// extension-less raster templates (content-negotiated endpoints, query-string format
/// selectors) get the format their server actually serves. The style must name the
/// storage extension before any tile is written, which is why the first tile is pulled
/// forward to here instead of being decided in the scheduler.
///
/// A source whose probe cannot be fetched or identified falls back to PNG with a
/// warning; if its real tiles then sniff differently, the scheduler fails the source.
#[allow(clippy::too_many_arguments)]
async fn probe_format(
	id: &str,
	templates: &[String],
	scheme: TileScheme,
	bounds: &GeoBBox,
	minzoom: u8,
	maxzoom: u8,
	options: &RewriteOptions<'_>,
	fetcher: &dyn Fetcher,
) -> Result<TileFormat> {
	let Some(coord) = first_coord(bounds, minzoom, maxzoom) else {
		// nothing will be fetched for this source, so the format is moot
		return Ok(TileFormat::PNG);
	};
	let url = render_tile_url(templates, scheme, &coord)?;
	let url = mapbox::normalize_url(&url, options.access_token)?;

	match fetcher.fetch(&url).await {
		Ok(response) => {
			let sniffed = TileFormat::from_bytes(response.body.as_slice())
				.ok()
				.or_else(|| response.content_type.as_deref().and_then(TileFormat::from_content_type));
			match sniffed {
				Some(format) => {
					log::debug!("probed source {id:?}: first tile {coord} is {format}");
					Ok(format)
				}
				None => {
					log::warn!("probe tile {coord} of source {id:?} has an unidentifiable format, assuming png");
					Ok(TileFormat::PNG)
				}
			}
		}
		Err(e) => {
			log::warn!("could not probe source {id:?} ({e:#}), assuming png");
			Ok(TileFormat::PNG)
		}
	}
}

fn first_coord(bounds: &GeoBBox, minzoom: u8, maxzoom: u8) -> Option<TileCoord> {
	if bounds.is_degenerate() || minzoom > maxzoom {
		return None;
	}
	TileBBox::from_geo(minzoom, bounds).ok()?.iter_coords().next()
}

/// Folder names keep `[A-Za-z0-9._-]` and replace everything else, so source ids like
/// `"maptiler/v3"` never produce surprising archive paths.
fn sanitize_folder(id: &str) -> String {
	id.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
				c
			} else {
				'_'
			}
		})
		.collect()
}
