//! The styled map package container: a ZIP archive carrying a MapLibre style and every
//! resource it references.
//!
//! This crate implements the three sides of the container contract:
//! - [`SmpWriter`]: compose an archive with the prescribed entry order and per-kind
//!   compression,
//! - [`SmpReader`]: random-access retrieval of resources by archive path,
//! - [`validate_path`]: a layered structural audit producing errors and warnings.

mod container;
pub use container::*;

pub mod testing;
