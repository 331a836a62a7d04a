use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use globset::Glob;
use globset::GlobMatcher;
use globset::GlobSet;
use globset::GlobSetBuilder;
use serde::Serialize;

use crate::ExgenError;
use crate::ExgenResult;
use crate::NamedArtifact;
use crate::config::ExgenConfig;
use crate::fs_guard::FileEvent;
use crate::fs_guard::FileGuard;
use crate::manifest::merge_manifest;
use crate::rewriter::rewrite_file;
use crate::synthesizer::Synthesis;
use crate::synthesizer::UnitTemplate;
use crate::synthesizer::synthesize_unit;

/// Options for a generation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
	/// Compute everything but leave the disk untouched.
	pub dry_run: bool,
}

/// A compilable unit written during the run.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedUnit {
	pub path: PathBuf,
	pub template: UnitTemplate,
}

/// A header whose unit could not be synthesized.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedArtifact {
	pub path: PathBuf,
	pub reason: String,
}

/// Everything a generation run did.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
	pub dry_run: bool,
	/// Every file created or backed up, in order.
	pub events: Vec<FileEvent>,
	/// Source files whose placeholder lines were rewritten.
	pub rewritten: Vec<PathBuf>,
	/// Fragment files created for placeholder lines.
	pub fragments: Vec<PathBuf>,
	pub units: Vec<CreatedUnit>,
	pub skipped: Vec<SkippedArtifact>,
	/// Artifact names listed in the manifest.
	pub manifest_entries: Vec<String>,
	pub manifest_path: PathBuf,
	pub manifest_changed: bool,
}

impl GenerateReport {
	/// Returns true when every header could be handled.
	pub fn is_ok(&self) -> bool {
		self.skipped.is_empty()
	}

	/// Returns true when the run changed (or would change) nothing on disk.
	pub fn is_noop(&self) -> bool {
		self.events.is_empty()
	}
}

fn build_matcher(pattern: &str) -> ExgenResult<GlobMatcher> {
	Glob::new(pattern)
		.map(|glob| glob.compile_matcher())
		.map_err(|e| {
			ExgenError::InvalidGlob {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})
}

fn build_glob_set(patterns: &[String]) -> ExgenResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			ExgenError::InvalidGlob {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}
	builder.build().map_err(|e| {
		ExgenError::InvalidGlob {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

fn check_cancelled(cancel: &AtomicBool) -> ExgenResult<()> {
	if cancel.load(Ordering::Relaxed) {
		return Err(ExgenError::Interrupted);
	}
	Ok(())
}

/// Run generation in `root` with the config discovered there.
pub fn generate_project(
	root: &Path,
	options: GenerateOptions,
	cancel: &AtomicBool,
) -> ExgenResult<GenerateReport> {
	let config = ExgenConfig::load_or_default(root)?;
	generate(root, &config, options, cancel)
}

/// Run the whole pipeline over the flat directory `root`:
///
/// 1. repair placeholder lines in every compilable unit,
/// 2. repair placeholder lines in every header and synthesize its missing
///    unit,
/// 3. merge the build manifest over all snippet and listing units.
///
/// A header with an unrecognized name prefix is reported in
/// [`GenerateReport::skipped`] and does not stop the run. `cancel` is
/// checked before each file; once set the run stops with
/// [`ExgenError::Interrupted`] and files already written stay.
pub fn generate(
	root: &Path,
	config: &ExgenConfig,
	options: GenerateOptions,
	cancel: &AtomicBool,
) -> ExgenResult<GenerateReport> {
	let artifacts = &config.artifacts;
	let units = build_matcher(&name_glob("", &artifacts.unit_extension))?;
	let headers = build_matcher(&name_glob("", &artifacts.header_extension))?;
	let listed = build_glob_set(&[
		name_glob(&artifacts.snippet_prefix, &artifacts.unit_extension),
		name_glob(&artifacts.listing_prefix, &artifacts.unit_extension),
	])?;

	let mut guard = FileGuard::new(options.dry_run);
	let mut rewritten = Vec::new();
	let mut fragments = Vec::new();
	let mut created_units = Vec::new();
	let mut skipped = Vec::new();

	let names = guard.file_names(root)?;
	for name in names.iter().filter(|name| units.is_match(name.as_str())) {
		check_cancelled(cancel)?;
		let artifact = NamedArtifact::from_file_name(root, name);
		let outcome = rewrite_file(&artifact, artifacts, &mut guard)?;
		if outcome.rewritten {
			rewritten.push(artifact.source_path());
		}
		fragments.extend(outcome.created_fragments);
	}

	for name in names.iter().filter(|name| headers.is_match(name.as_str())) {
		check_cancelled(cancel)?;
		let artifact = NamedArtifact::from_file_name(root, name);
		let outcome = rewrite_file(&artifact, artifacts, &mut guard)?;
		if outcome.rewritten {
			rewritten.push(artifact.source_path());
		}
		fragments.extend(outcome.created_fragments);

		match synthesize_unit(&artifact, &outcome.scanned.outline, artifacts, &mut guard) {
			Ok(Synthesis::Created { path, template }) => {
				created_units.push(CreatedUnit { path, template });
			}
			Ok(Synthesis::Existing(_)) => {}
			Err(e @ ExgenError::InvalidArtifactKind { .. }) => {
				tracing::warn!(path = %artifact.source_path().display(), "{e}");
				skipped.push(SkippedArtifact {
					path: artifact.source_path(),
					reason: e.to_string(),
				});
			}
			Err(e) => return Err(e),
		}
	}

	check_cancelled(cancel)?;
	let manifest_entries: Vec<String> = guard
		.file_names(root)?
		.iter()
		.filter(|name| listed.is_match(name.as_str()))
		.map(|name| NamedArtifact::from_file_name(root, name).base_name().to_string())
		.collect();
	let manifest = merge_manifest(root, &manifest_entries, config, &mut guard)?;

	Ok(GenerateReport {
		dry_run: guard.is_dry_run(),
		events: guard.into_events(),
		rewritten,
		fragments,
		units: created_units,
		skipped,
		manifest_entries,
		manifest_path: manifest.path,
		manifest_changed: manifest.changed,
	})
}

/// Glob matching file names that start with `prefix` and end with
/// `extension`. Both are taken literally.
fn name_glob(prefix: &str, extension: &str) -> String {
	format!("{}*{}", globset::escape(prefix), globset::escape(extension))
}
