use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::ExgenResult;

/// What happened to a file during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
	/// The file did not exist and was created.
	Created,
	/// The file was renamed to its `~` backup before being replaced.
	BackedUp,
}

/// A single filesystem change, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEvent {
	pub path: PathBuf,
	pub action: FileAction,
}

/// Returns the backup name for `path`: the same path with `~` appended.
pub fn backup_path(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push("~");
	PathBuf::from(name)
}

/// Read `path` as text. A missing file reads as empty; any other failure is
/// returned.
pub fn read_or_empty(path: &Path) -> ExgenResult<String> {
	match std::fs::read_to_string(path) {
		Ok(text) => Ok(text),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
		Err(e) => Err(e.into()),
	}
}

/// The only way files are written during generation.
///
/// Every write goes through [`FileGuard::create_if_absent`], which never
/// touches an existing file. Replacing a file means renaming it to its backup
/// first so the create succeeds.
///
/// In dry-run mode nothing reaches the disk; the guard keeps an overlay of
/// planned creations and renames so later existence checks in the same run
/// see the state the real run would have produced.
#[derive(Debug, Default)]
pub struct FileGuard {
	dry_run: bool,
	planned: BTreeSet<PathBuf>,
	moved_away: BTreeSet<PathBuf>,
	events: Vec<FileEvent>,
}

impl FileGuard {
	pub fn new(dry_run: bool) -> Self {
		Self {
			dry_run,
			..Self::default()
		}
	}

	pub fn is_dry_run(&self) -> bool {
		self.dry_run
	}

	/// All changes made (or planned, in dry-run mode) so far.
	pub fn events(&self) -> &[FileEvent] {
		&self.events
	}

	pub fn into_events(self) -> Vec<FileEvent> {
		self.events
	}

	/// Whether `path` exists, taking planned dry-run changes into account.
	pub fn exists(&self, path: &Path) -> bool {
		if self.planned.contains(path) {
			return true;
		}
		if self.moved_away.contains(path) {
			return false;
		}
		path.exists()
	}

	/// Create `path` with `content` unless something already exists there.
	/// Returns whether the file was written.
	pub fn create_if_absent(&mut self, path: &Path, content: &str) -> ExgenResult<bool> {
		if self.dry_run {
			if self.exists(path) {
				tracing::debug!(path = %path.display(), "exists, skipping");
				return Ok(false);
			}
			self.moved_away.remove(path);
			self.planned.insert(path.to_path_buf());
			self.record(path, FileAction::Created);
			return Ok(true);
		}

		let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
			Ok(file) => file,
			Err(e) if e.kind() == ErrorKind::AlreadyExists => {
				tracing::debug!(path = %path.display(), "exists, skipping");
				return Ok(false);
			}
			Err(e) => return Err(e.into()),
		};
		file.write_all(content.as_bytes())?;
		tracing::info!(path = %path.display(), "created");
		self.record(path, FileAction::Created);

		Ok(true)
	}

	/// Rename `path` to its `~` backup if it exists. An older backup is
	/// replaced. Returns the backup path when a rename happened.
	pub fn backup(&mut self, path: &Path) -> ExgenResult<Option<PathBuf>> {
		if !self.exists(path) {
			return Ok(None);
		}

		let backup = backup_path(path);
		if self.dry_run {
			self.planned.remove(path);
			self.moved_away.insert(path.to_path_buf());
			self.planned.insert(backup.clone());
		} else {
			std::fs::rename(path, &backup)?;
			tracing::info!(path = %path.display(), backup = %backup.display(), "backed up");
		}
		self.record(path, FileAction::BackedUp);

		Ok(Some(backup))
	}

	/// Move the current file aside and create it again with `content`.
	pub fn replace(&mut self, path: &Path, content: &str) -> ExgenResult<bool> {
		self.backup(path)?;
		self.create_if_absent(path, content)
	}

	/// Names of the regular files directly inside `dir`, including files
	/// planned by a dry run. Sorted.
	pub fn file_names(&self, dir: &Path) -> ExgenResult<Vec<String>> {
		let mut names = BTreeSet::new();
		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			if !path.is_file() || self.moved_away.contains(&path) {
				continue;
			}
			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				names.insert(name.to_string());
			}
		}

		for path in &self.planned {
			if path.parent() == Some(dir) {
				if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
					names.insert(name.to_string());
				}
			}
		}

		Ok(names.into_iter().collect())
	}

	fn record(&mut self, path: &Path, action: FileAction) {
		self.events.push(FileEvent {
			path: path.to_path_buf(),
			action,
		});
	}
}
