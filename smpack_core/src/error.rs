//! Typed error kinds shared across the workspace.
//!
//! Errors travel as [`anyhow::Error`] like everywhere else in this codebase; the variants
//! here exist so callers that need to *classify* a failure (skip-vs-retry policies, the
//! validator, the reader surface) can `downcast_ref::<SmpError>()` instead of matching on
//! message strings.

use crate::TileFormat;
use std::error::Error;
use std::fmt::{self, Display};

/// Error kinds of the styled-map-package system.
#[derive(Clone, Debug, PartialEq)]
pub enum SmpError {
	/// A file or archive entry does not exist. Permission failures classify the same way.
	NotFound(String),
	/// The container could not be parsed as a ZIP archive.
	InvalidArchive(String),
	/// The style document failed to parse or failed style-spec validation.
	InvalidStyle(String),
	/// Required SMP metadata is absent or malformed.
	MissingMetadata(String),
	/// Magic-byte sniffing failed to identify a payload.
	UnknownFileType(String),
	/// No content type is known for a path.
	UnknownContentType(String),
	/// A path matches no resource kind.
	UnknownResourceType(String),
	/// The archive's VERSION major is outside the supported set.
	UnsupportedVersion(String),
	/// A `mapbox://` URL was given without an access token.
	MissingAccessToken,
	/// A secret (`sk.`) token was given where only public (`pk.`) tokens are accepted.
	SecretToken,
	/// A style reference points at an archive entry that does not exist.
	ResourceMissing(String),
	/// A tile's format differs from the format of its source.
	FormatMismatch {
		source: String,
		expected: TileFormat,
		found: TileFormat,
	},
	/// A network-level failure (connection, DNS, protocol).
	NetworkError(String),
	/// A fetch exceeded its configured timeout.
	Timeout(String),
	/// A retryable failure persisted through every allowed attempt.
	RetriesExhausted(String),
}

impl Display for SmpError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		use SmpError::*;
		match self {
			NotFound(what) => write!(f, "not found: {what}"),
			InvalidArchive(what) => write!(f, "not a valid ZIP archive: {what}"),
			InvalidStyle(what) => write!(f, "invalid style: {what}"),
			MissingMetadata(what) => write!(f, "missing metadata: {what}"),
			UnknownFileType(what) => write!(f, "unknown file type: {what}"),
			UnknownContentType(what) => write!(f, "unknown content type: {what}"),
			UnknownResourceType(what) => write!(f, "unknown resource type: {what}"),
			UnsupportedVersion(what) => write!(f, "unsupported version: {what}"),
			MissingAccessToken => write!(f, "mapbox URLs require an access token"),
			SecretToken => write!(f, "secret access tokens (sk.*) are not accepted, use a public token (pk.*)"),
			ResourceMissing(what) => write!(f, "referenced resource missing from archive: {what}"),
			FormatMismatch {
				source,
				expected,
				found,
			} => write!(f, "tile format mismatch in source {source:?}: expected {expected}, found {found}"),
			NetworkError(what) => write!(f, "network error: {what}"),
			Timeout(what) => write!(f, "timeout: {what}"),
			RetriesExhausted(what) => write!(f, "retries exhausted: {what}"),
		}
	}
}

impl Error for SmpError {}

impl SmpError {
	/// Returns `true` if `error` is or wraps [`SmpError::NotFound`].
	pub fn is_not_found(error: &anyhow::Error) -> bool {
		matches!(error.downcast_ref::<SmpError>(), Some(SmpError::NotFound(_)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display() {
		assert_eq!(
			SmpError::NotFound("style.json".to_string()).to_string(),
			"not found: style.json"
		);
		assert!(SmpError::SecretToken.to_string().contains("pk.*"));
	}

	#[test]
	fn downcast_through_anyhow() {
		let error: anyhow::Error = SmpError::NotFound("x".to_string()).into();
		assert!(SmpError::is_not_found(&error));

		let other: anyhow::Error = SmpError::MissingAccessToken.into();
		assert!(!SmpError::is_not_found(&other));
	}
}
