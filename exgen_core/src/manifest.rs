use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::ExgenResult;
use crate::config::ExgenConfig;
use crate::fs_guard::FileGuard;
use crate::fs_guard::read_or_empty;

static EXAMPLE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^example\(([-_\w]+)(?: +([-_/\w. ]+))?\)")
		.unwrap_or_else(|e| panic!("invalid manifest entry pattern: {e}"))
});

/// User edits recovered from an existing manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestExceptions {
	/// Extra arguments of `example(name ...)` entries, keyed by name. A later
	/// entry for the same name wins.
	pub arguments: BTreeMap<String, String>,
	/// Lines that are not `example(...)` entries, verbatim and in their
	/// original order, terminators included.
	pub verbatim: Vec<String>,
}

/// One `example(...)` line of the generated manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
	pub name: String,
	/// Space separated dependencies and options. May be empty.
	pub arguments: String,
}

impl ManifestEntry {
	/// Append `dependency` unless the arguments already mention it.
	pub fn add_dependency(&mut self, dependency: &str) {
		if self.arguments.contains(dependency) {
			return;
		}
		if !self.arguments.is_empty() {
			self.arguments.push(' ');
		}
		self.arguments.push_str(dependency);
	}

	pub fn render(&self) -> String {
		if self.arguments.is_empty() {
			format!("example({})\n", self.name)
		} else {
			format!("example({} {})\n", self.name, self.arguments)
		}
	}
}

/// Extract the user exceptions from manifest text.
///
/// Entries without extra arguments carry nothing worth keeping and are
/// dropped, as are blank lines and lines starting with one of
/// `skip_prefixes`. Everything else that is not an entry is kept verbatim.
pub fn parse_manifest(text: &str, skip_prefixes: &[String]) -> ManifestExceptions {
	let mut exceptions = ManifestExceptions::default();

	for line in text.split_inclusive('\n') {
		if let Some(captures) = EXAMPLE.captures(line) {
			if let Some(arguments) = captures.get(2) {
				exceptions
					.arguments
					.insert(captures[1].to_string(), arguments.as_str().to_string());
			}
			continue;
		}

		if line.trim().is_empty() || skip_prefixes.iter().any(|prefix| line.starts_with(prefix)) {
			continue;
		}

		exceptions.verbatim.push(line.to_string());
	}

	exceptions
}

/// Render the manifest: one entry per line in the given order, then the
/// verbatim exception lines.
pub fn render_manifest(entries: &[ManifestEntry], verbatim: &[String]) -> String {
	let mut text = String::new();
	for entry in entries {
		text.push_str(&entry.render());
	}
	for line in verbatim {
		text.push_str(line);
	}
	text
}

/// Build the entries for `names`, sorted and deduplicated, merging the
/// remembered arguments and adding `name.hh` as a dependency when
/// `has_header` says the header exists.
pub fn build_entries(
	names: &[String],
	exceptions: &ManifestExceptions,
	header_extension: &str,
	has_header: impl Fn(&str) -> bool,
) -> Vec<ManifestEntry> {
	let mut names: Vec<&String> = names.iter().collect();
	names.sort();
	names.dedup();

	names
		.into_iter()
		.map(|name| {
			let mut entry = ManifestEntry {
				name: name.clone(),
				arguments: exceptions.arguments.get(name).cloned().unwrap_or_default(),
			};
			let header = format!("{name}{header_extension}");
			if has_header(&header) {
				entry.add_dependency(&header);
			}
			entry
		})
		.collect()
}

/// Outcome of merging the manifest.
#[derive(Debug, Clone)]
pub struct ManifestOutcome {
	pub path: PathBuf,
	/// The regenerated manifest text.
	pub text: String,
	/// The text differed from the old manifest and was written.
	pub changed: bool,
	/// Where the old manifest was moved, if it existed and changed.
	pub backup: Option<PathBuf>,
}

/// Regenerate the manifest in `directory` for the artifacts `names`.
///
/// The file is only written when the new text differs from the old one, and
/// the old file is kept as its `~` backup.
pub fn merge_manifest(
	directory: &Path,
	names: &[String],
	config: &ExgenConfig,
	guard: &mut FileGuard,
) -> ExgenResult<ManifestOutcome> {
	let path = directory.join(&config.manifest.file);
	let original = read_or_empty(&path)?;
	let exceptions = parse_manifest(&original, &config.manifest.skip_prefixes);
	let entries = build_entries(
		names,
		&exceptions,
		&config.artifacts.header_extension,
		|header| guard.exists(&directory.join(header)),
	);
	let text = render_manifest(&entries, &exceptions.verbatim);

	if text == original {
		tracing::debug!(path = %path.display(), "manifest unchanged");
		return Ok(ManifestOutcome {
			path,
			text,
			changed: false,
			backup: None,
		});
	}

	let backup = guard.backup(&path)?;
	guard.create_if_absent(&path, &text)?;

	Ok(ManifestOutcome {
		path,
		text,
		changed: true,
		backup,
	})
}
