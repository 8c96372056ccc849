//! Core types and primitives for styled map packages: tile geometry, archive paths and
//! URIs, mapbox URL normalization, format sniffing, and the style document model.

mod error;
pub use error::SmpError;

pub mod mapbox;

mod paths;
pub use paths::*;

mod style;
pub use style::*;

mod tile_url;
pub use tile_url::*;

mod types;
pub use types::*;

pub mod utils;
