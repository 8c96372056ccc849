//! Download a MapLibre style and every resource it references into a styled map
//! package.
//!
//! The pipeline normalizes the style URL, rewrites the style to archive-internal URIs,
//! plans the full resource set (tiles across the bounding box and zoom range, glyph
//! ranges per font stack, sprite variants per pixel ratio), fetches it with bounded
//! concurrency, and streams the archive out in a deterministic order that lets readers
//! render low-zoom coverage progressively.

pub mod download;

pub use download::{
	download, download_to_path, download_with, CancelFlag, DownloadOptions, DownloadReport, GeoJsonPolicy,
};
