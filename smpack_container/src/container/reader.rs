//! Random-access reads from a styled map package.

use anyhow::{Context, Result};
use smpack_core::{content_type, Blob, SmpError, StyleDocument, STYLE_PATH, VERSION_PATH};
use std::fmt::Debug;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;
use zip::{result::ZipError, ZipArchive};

/// Backing storage of an open package: a file on disk or an in-memory buffer.
enum ArchiveSource {
	File(File),
	Memory(Cursor<Vec<u8>>),
}

impl Read for ArchiveSource {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		match self {
			ArchiveSource::File(f) => f.read(buf),
			ArchiveSource::Memory(c) => c.read(buf),
		}
	}
}

impl Seek for ArchiveSource {
	fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
		match self {
			ArchiveSource::File(f) => f.seek(pos),
			ArchiveSource::Memory(c) => c.seek(pos),
		}
	}
}

/// A resource retrieved from a package: its bytes plus the content type derived from the
/// path extension.
pub struct SmpResource {
	pub blob: Blob,
	pub content_type: &'static str,
}

/// Reader over a styled map package.
///
/// The archive handle lives behind a mutex, so concurrent `get_resource` calls are
/// serialized; every call is independent and no cross-call ordering is guaranteed.
/// `close()` is idempotent and releases the file descriptor; a failed open never leaves
/// one behind.
pub struct SmpReader {
	name: String,
	archive: Mutex<Option<ZipArchive<ArchiveSource>>>,
}

impl SmpReader {
	/// Opens a package from the filesystem.
	pub fn open_path(path: &Path) -> Result<SmpReader> {
		let file = File::open(path).map_err(|e| match e.kind() {
			std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
				anyhow::Error::from(SmpError::NotFound(path.display().to_string()))
			}
			_ => anyhow::Error::from(e).context(format!("opening {}", path.display())),
		})?;
		// On parse failure ZipArchive::new drops the file, so the descriptor is
		// released no matter which way this returns.
		let archive =
			ZipArchive::new(ArchiveSource::File(file)).map_err(|e| SmpError::InvalidArchive(e.to_string()))?;
		Ok(SmpReader {
			name: path.display().to_string(),
			archive: Mutex::new(Some(archive)),
		})
	}

	/// Opens a package held in memory.
	pub fn from_blob(blob: Blob) -> Result<SmpReader> {
		let archive = ZipArchive::new(ArchiveSource::Memory(Cursor::new(blob.into_vec())))
			.map_err(|e| SmpError::InvalidArchive(e.to_string()))?;
		Ok(SmpReader {
			name: "<memory>".to_string(),
			archive: Mutex::new(Some(archive)),
		})
	}

	/// Returns the package format version (`"1.0"`), or `None` if the archive has no
	/// `VERSION` entry.
	pub fn get_version(&self) -> Result<Option<String>> {
		match self.read_entry(VERSION_PATH) {
			Ok(blob) => Ok(Some(blob.as_str().trim_end().to_string())),
			Err(e) if SmpError::is_not_found(&e) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Reads and parses `style.json`.
	pub fn get_style(&self) -> Result<StyleDocument> {
		let blob = self.read_entry(STYLE_PATH)?;
		StyleDocument::parse(&blob).with_context(|| format!("parsing style of {}", self.name))
	}

	/// Retrieves an arbitrary resource by its archive path.
	pub fn get_resource(&self, path: &str) -> Result<SmpResource> {
		let content_type = content_type(path)?;
		let blob = self.read_entry(path)?;
		Ok(SmpResource { blob, content_type })
	}

	/// Returns all entry paths in central-directory order.
	pub fn entry_paths(&self) -> Result<Vec<String>> {
		let mut guard = self.lock()?;
		let archive = Self::require_open(&mut guard)?;
		let mut paths = Vec::with_capacity(archive.len());
		for index in 0..archive.len() {
			paths.push(archive.by_index(index)?.name().to_string());
		}
		Ok(paths)
	}

	/// Closes the reader, releasing the underlying file. Idempotent; subsequent reads
	/// fail with a not-found kind.
	pub fn close(&self) {
		if let Ok(mut guard) = self.archive.lock() {
			guard.take();
		}
	}

	fn read_entry(&self, path: &str) -> Result<Blob> {
		let mut guard = self.lock()?;
		let archive = Self::require_open(&mut guard)?;
		let mut entry = match archive.by_name(path) {
			Ok(entry) => entry,
			Err(ZipError::FileNotFound) => {
				return Err(SmpError::NotFound(format!("{path} in {}", self.name)).into());
			}
			Err(e) => return Err(anyhow::Error::from(e).context(format!("reading {path}"))),
		};
		let mut bytes = Vec::with_capacity(entry.size() as usize);
		entry
			.read_to_end(&mut bytes)
			.with_context(|| format!("reading {path} from {}", self.name))?;
		Ok(Blob::from(bytes))
	}

	fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<ZipArchive<ArchiveSource>>>> {
		self
			.archive
			.lock()
			.map_err(|_| anyhow::anyhow!("archive mutex poisoned for {}", self.name))
	}

	fn require_open<'a>(
		guard: &'a mut std::sync::MutexGuard<'_, Option<ZipArchive<ArchiveSource>>>,
	) -> Result<&'a mut ZipArchive<ArchiveSource>> {
		guard
			.as_mut()
			.ok_or_else(|| anyhow::Error::new(SmpError::NotFound("reader is closed".to_string())))
	}
}

impl Debug for SmpReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SmpReader").field("name", &self.name).finish()
	}
}
