use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::ArtifactConfig;

/// How an artifact's header is meant to be compiled, decided by its base
/// name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
	/// A code fragment, compiled inside a function body.
	Snippet,
	/// Namespace-scope code, often with its own `main()`.
	Listing,
	/// Neither prefix matched. Such artifacts cannot be synthesized.
	Other,
}

/// A logical example: one base name and the family of sibling files derived
/// from it (`base.hh`, `base.cpp`, `base.inc0`, `base.inc1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedArtifact {
	directory: PathBuf,
	base_name: String,
	extension: String,
}

impl NamedArtifact {
	pub fn new(
		directory: impl Into<PathBuf>,
		base_name: impl Into<String>,
		extension: impl Into<String>,
	) -> Self {
		Self {
			directory: directory.into(),
			base_name: base_name.into(),
			extension: extension.into(),
		}
	}

	/// Split a file name such as `list0101.hh` into an artifact living in
	/// `directory`. The extension keeps its leading dot and is empty when the
	/// name has none.
	pub fn from_file_name(directory: impl Into<PathBuf>, file_name: &str) -> Self {
		let (base, extension) = match file_name.rfind('.') {
			Some(0) | None => (file_name, ""),
			Some(idx) => file_name.split_at(idx),
		};
		Self::new(directory, base, extension)
	}

	pub fn directory(&self) -> &Path {
		&self.directory
	}

	pub fn base_name(&self) -> &str {
		&self.base_name
	}

	pub fn extension(&self) -> &str {
		&self.extension
	}

	/// The file this artifact was discovered from.
	pub fn source_path(&self) -> PathBuf {
		self.path(&self.extension)
	}

	/// File name of the sibling with extension `ext`, as written into
	/// generated text. The artifact directory is flat, so this is the name
	/// alone.
	pub fn name(&self, ext: &str) -> String {
		format!("{}{ext}", self.base_name)
	}

	/// Filesystem path of the sibling with extension `ext`.
	pub fn path(&self, ext: &str) -> PathBuf {
		self.directory.join(self.name(ext))
	}

	pub fn header_name(&self, config: &ArtifactConfig) -> String {
		self.name(&config.header_extension)
	}

	pub fn unit_path(&self, config: &ArtifactConfig) -> PathBuf {
		self.path(&config.unit_extension)
	}

	/// File name of fragment number `serial`, e.g. `list0101.inc2`.
	pub fn fragment_name(&self, config: &ArtifactConfig, serial: usize) -> String {
		self.name(&format!("{}{serial}", config.fragment_extension))
	}

	pub fn kind(&self, config: &ArtifactConfig) -> ArtifactKind {
		if self.base_name.starts_with(&config.snippet_prefix) {
			ArtifactKind::Snippet
		} else if self.base_name.starts_with(&config.listing_prefix) {
			ArtifactKind::Listing
		} else {
			ArtifactKind::Other
		}
	}
}
