use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::ExgenResult;
use crate::NamedArtifact;
use crate::classify::LineClass;
use crate::classify::classify_line;
use crate::classify::strip_terminator;
use crate::config::ArtifactConfig;
use crate::fs_guard::FileGuard;

/// A `...` line found in a source file, and the fragment that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderOccurrence {
	/// Where the fragment file lives.
	pub fragment_path: PathBuf,
	/// The fragment file name, as written into the `#include` directive.
	pub fragment_name: String,
	/// The placeholder line, without its terminator.
	pub line: String,
}

impl PlaceholderOccurrence {
	/// Initial content of the fragment file: the placeholder as a comment.
	pub fn fragment_content(&self) -> String {
		format!("// {}\n", self.line)
	}
}

/// What the line scan learned about namespace-scope declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOutline {
	/// The source defines the entry point itself.
	pub self_contained: bool,
	/// Names of other namespace-scope declarations.
	pub globals: BTreeSet<String>,
}

/// The result of scanning one source file.
#[derive(Debug, Clone, Default)]
pub struct ScannedSource {
	/// The content with every placeholder line replaced.
	pub content: String,
	pub placeholders: Vec<PlaceholderOccurrence>,
	pub outline: SourceOutline,
}

impl ScannedSource {
	pub fn has_placeholders(&self) -> bool {
		!self.placeholders.is_empty()
	}
}

/// Per-file scan state. The fragment serial starts at zero for every file
/// and only ever increases.
struct LineScan<'a> {
	artifact: &'a NamedArtifact,
	config: &'a ArtifactConfig,
	next_serial: usize,
	scanned: ScannedSource,
}

impl<'a> LineScan<'a> {
	fn new(artifact: &'a NamedArtifact, config: &'a ArtifactConfig) -> Self {
		Self {
			artifact,
			config,
			next_serial: 0,
			scanned: ScannedSource::default(),
		}
	}

	fn next_fragment(&mut self) -> (PathBuf, String) {
		let name = self.artifact.fragment_name(self.config, self.next_serial);
		self.next_serial += 1;
		(self.artifact.directory().join(&name), name)
	}

	fn push_line(&mut self, raw: &str) {
		let line = strip_terminator(raw);
		match classify_line(line) {
			LineClass::Placeholder => {
				let (fragment_path, fragment_name) = self.next_fragment();
				// Keep the file's line ending; a final line without one gets `\n`.
				let terminator = match &raw[line.len()..] {
					"" => "\n",
					terminator => terminator,
				};
				self.scanned.content.push_str(&format!(
					"// {line}{terminator}#include \"{fragment_name}\"{terminator}"
				));
				self.scanned.placeholders.push(PlaceholderOccurrence {
					fragment_path,
					fragment_name,
					line: line.to_string(),
				});
			}
			LineClass::Function(name) if name == self.config.entry_point => {
				self.scanned.outline.self_contained = true;
				self.scanned.content.push_str(raw);
			}
			LineClass::Function(name) | LineClass::Declaration(name) => {
				self.scanned.outline.globals.insert(name.to_string());
				self.scanned.content.push_str(raw);
			}
			LineClass::Plain => self.scanned.content.push_str(raw),
		}
	}
}

/// Scan `text` line by line, replacing placeholder lines and recording the
/// declaration outline. Lines that are not placeholders are copied byte for
/// byte, terminators included.
pub fn scan_source(artifact: &NamedArtifact, config: &ArtifactConfig, text: &str) -> ScannedSource {
	let mut scan = LineScan::new(artifact, config);
	for raw in text.split_inclusive('\n') {
		scan.push_line(raw);
	}
	scan.scanned
}

/// Outcome of rewriting one file on disk.
#[derive(Debug, Clone, Default)]
pub struct RewriteOutcome {
	pub scanned: ScannedSource,
	/// Fragment files that were created. Existing fragments are left alone
	/// and do not appear here.
	pub created_fragments: Vec<PathBuf>,
	/// The source file was replaced by its rewritten content.
	pub rewritten: bool,
}

/// Repair the placeholder lines of `artifact`'s source file.
///
/// A file without placeholders is not touched. Otherwise each missing
/// fragment is created, the original is moved to its `~` backup and the
/// rewritten content takes its place.
pub fn rewrite_file(
	artifact: &NamedArtifact,
	config: &ArtifactConfig,
	guard: &mut FileGuard,
) -> ExgenResult<RewriteOutcome> {
	let source = artifact.source_path();
	let text = std::fs::read_to_string(&source)?;
	let scanned = scan_source(artifact, config, &text);

	if !scanned.has_placeholders() {
		return Ok(RewriteOutcome {
			scanned,
			..RewriteOutcome::default()
		});
	}

	tracing::debug!(
		path = %source.display(),
		count = scanned.placeholders.len(),
		"found placeholder lines"
	);

	let mut created_fragments = Vec::new();
	for placeholder in &scanned.placeholders {
		if guard.create_if_absent(&placeholder.fragment_path, &placeholder.fragment_content())? {
			created_fragments.push(placeholder.fragment_path.clone());
		}
	}

	let rewritten = guard.replace(&source, &scanned.content)?;

	Ok(RewriteOutcome {
		scanned,
		created_fragments,
		rewritten,
	})
}
