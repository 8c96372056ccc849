//! Expansion of `mapbox://` URLs to their HTTPS API endpoints.
//!
//! Mapbox styles reference resources through a private URL scheme that only the Mapbox
//! SDKs understand. Downloading them requires rewriting to `api.mapbox.com` endpoints and
//! appending an access token. Only public (`pk.`) tokens are accepted; requests signed
//! with secret (`sk.`) tokens must never leave the machine.
//!
//! Non-mapbox URLs pass through unchanged.

use crate::{pixel_ratio_suffix, SmpError};
use anyhow::Result;

const API_ORIGIN: &str = "https://api.mapbox.com";

/// Returns `true` for URLs using the `mapbox://` scheme.
pub fn is_mapbox_url(url: &str) -> bool {
	url.starts_with("mapbox://")
}

/// Expands a `mapbox://` style, font, or tileset URL to its HTTPS endpoint and appends
/// the access token. Non-mapbox URLs are returned unchanged.
///
/// Expansion table:
/// - `mapbox://styles/{user}/{id}` → `{api}/styles/v1/{user}/{id}`
/// - `mapbox://fonts/{user}/{stack}/{range}.pbf` → `{api}/fonts/v1/{user}/{stack}/{range}.pbf`
/// - `mapbox://{tileset}` → `{api}/v4/{tileset}.json?secure` (TileJSON metadata)
pub fn normalize_url(url: &str, access_token: Option<&str>) -> Result<String> {
	let Some(path) = url.strip_prefix("mapbox://") else {
		return Ok(url.to_string());
	};
	let token = check_token(access_token)?;

	let expanded = if let Some(rest) = path.strip_prefix("styles/") {
		format!("{API_ORIGIN}/styles/v1/{rest}")
	} else if let Some(rest) = path.strip_prefix("fonts/") {
		format!("{API_ORIGIN}/fonts/v1/{rest}")
	} else {
		format!("{API_ORIGIN}/v4/{path}.json?secure")
	};

	Ok(append_token(&expanded, token))
}

/// Builds the fetch URL for one sprite file from the style's sprite base URL.
///
/// `mapbox://sprites/{user}/{id}` expands to
/// `{api}/styles/v1/{user}/{id}/sprite{@Nx}{ext}?access_token=…`; any other base URL
/// simply gets the pixel-ratio infix and extension appended.
pub fn normalize_sprite_url(url: &str, pixel_ratio: u8, ext: &str, access_token: Option<&str>) -> Result<String> {
	let suffix = pixel_ratio_suffix(pixel_ratio);
	let Some(path) = url.strip_prefix("mapbox://") else {
		return Ok(format!("{url}{suffix}{ext}"));
	};
	let token = check_token(access_token)?;

	let Some(rest) = path.strip_prefix("sprites/") else {
		return Err(SmpError::UnknownResourceType(format!("not a mapbox sprite URL: {url}")).into());
	};
	Ok(append_token(
		&format!("{API_ORIGIN}/styles/v1/{rest}/sprite{suffix}{ext}"),
		token,
	))
}

fn check_token(access_token: Option<&str>) -> Result<&str> {
	let token = access_token.ok_or(SmpError::MissingAccessToken)?;
	if token.starts_with("sk.") {
		return Err(SmpError::SecretToken.into());
	}
	Ok(token)
}

fn append_token(url: &str, token: &str) -> String {
	let separator = if url.contains('?') { '&' } else { '?' };
	format!("{url}{separator}access_token={token}")
}

#[cfg(test)]
mod tests {
	use super::*;

	const TOKEN: Option<&str> = Some("pk.test123");

	#[test]
	fn non_mapbox_urls_pass_through() {
		let url = "https://demotiles.maplibre.org/style.json";
		assert_eq!(normalize_url(url, None).unwrap(), url);
	}

	#[test]
	fn style_urls() {
		let url = normalize_url("mapbox://styles/mapbox/streets-v12", TOKEN).unwrap();
		assert_eq!(
			url,
			"https://api.mapbox.com/styles/v1/mapbox/streets-v12?access_token=pk.test123"
		);
	}

	#[test]
	fn font_urls() {
		let url = normalize_url("mapbox://fonts/mapbox/{fontstack}/{range}.pbf", TOKEN).unwrap();
		assert!(url.contains("api.mapbox.com"));
		assert!(url.contains("/fonts/v1/"));
		assert!(url.contains("access_token="));
	}

	#[test]
	fn tileset_urls() {
		let url = normalize_url("mapbox://mapbox.mapbox-streets-v8", TOKEN).unwrap();
		assert_eq!(
			url,
			"https://api.mapbox.com/v4/mapbox.mapbox-streets-v8.json?secure&access_token=pk.test123"
		);
	}

	#[test]
	fn sprite_urls() {
		let url = normalize_sprite_url("mapbox://sprites/mapbox/streets-v12", 2, ".png", TOKEN).unwrap();
		assert_eq!(
			url,
			"https://api.mapbox.com/styles/v1/mapbox/streets-v12/sprite@2x.png?access_token=pk.test123"
		);

		let plain = normalize_sprite_url("https://example.com/sprites/base", 1, ".json", None).unwrap();
		assert_eq!(plain, "https://example.com/sprites/base.json");
	}

	#[test]
	fn missing_token_fails() {
		let error = normalize_url("mapbox://styles/mapbox/streets-v12", None).unwrap_err();
		assert_eq!(
			error.downcast_ref::<SmpError>(),
			Some(&SmpError::MissingAccessToken)
		);
	}

	#[test]
	fn secret_token_fails() {
		let error = normalize_url("mapbox://styles/mapbox/streets-v12", Some("sk.secret")).unwrap_err();
		assert_eq!(error.downcast_ref::<SmpError>(), Some(&SmpError::SecretToken));
	}
}
