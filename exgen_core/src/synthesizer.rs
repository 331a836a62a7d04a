use std::path::PathBuf;

use serde::Serialize;

use crate::ArtifactKind;
use crate::ExgenError;
use crate::ExgenResult;
use crate::NamedArtifact;
use crate::config::ArtifactConfig;
use crate::fs_guard::FileGuard;
use crate::rewriter::SourceOutline;

/// The compilable unit written for a header, one per wrapping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTemplate {
	/// The header already defines `main()`: include it and nothing else.
	SelfContained,
	/// Include the header at namespace scope and add an empty `main()`.
	///
	/// The header's own top-level statements are never executed by this
	/// unit; headers landing here are expected to hold declarations only.
	NamespaceScope,
	/// Include the header inside the body of `main()`.
	FunctionBody,
}

impl UnitTemplate {
	/// Pick the template for a header of `kind` with the given outline.
	pub fn select(kind: ArtifactKind, outline: &SourceOutline) -> Option<Self> {
		match kind {
			ArtifactKind::Other => None,
			_ if outline.self_contained => Some(Self::SelfContained),
			ArtifactKind::Listing => Some(Self::NamespaceScope),
			// Classes, namespaces and function definitions cannot be declared
			// locally, so a snippet with any of them stays at namespace scope.
			ArtifactKind::Snippet if !outline.globals.is_empty() => Some(Self::NamespaceScope),
			ArtifactKind::Snippet => Some(Self::FunctionBody),
		}
	}

	/// Render the unit text for the header named `header`.
	pub fn render(self, header: &str) -> String {
		match self {
			Self::SelfContained => format!("#include \"{header}\"\n"),
			Self::NamespaceScope => {
				format!("#include <iostream>\n#include \"{header}\"\nint main() {{\n\n}}\n")
			}
			Self::FunctionBody => {
				format!("#include <iostream>\nint main() {{\n#include \"{header}\"\n}}\n")
			}
		}
	}
}

/// Outcome of synthesizing one compilable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
	/// A unit already existed and was left untouched.
	Existing(PathBuf),
	/// A new unit was written with `template`.
	Created { path: PathBuf, template: UnitTemplate },
}

/// Make sure the header `artifact` has a compilable unit next to it.
///
/// An existing unit is never modified, whatever the header contains. For a
/// missing one the template is chosen from the artifact kind and the outline
/// gathered while scanning the header.
pub fn synthesize_unit(
	artifact: &NamedArtifact,
	outline: &SourceOutline,
	config: &ArtifactConfig,
	guard: &mut FileGuard,
) -> ExgenResult<Synthesis> {
	let unit = artifact.unit_path(config);
	if guard.exists(&unit) {
		tracing::debug!(path = %unit.display(), "unit exists, skipping");
		return Ok(Synthesis::Existing(unit));
	}

	let Some(template) = UnitTemplate::select(artifact.kind(config), outline) else {
		return Err(ExgenError::InvalidArtifactKind {
			path: artifact.source_path().display().to_string(),
			snippet_prefix: config.snippet_prefix.clone(),
			listing_prefix: config.listing_prefix.clone(),
		});
	};

	let content = template.render(&artifact.header_name(config));
	if guard.create_if_absent(&unit, &content)? {
		Ok(Synthesis::Created {
			path: unit,
			template,
		})
	} else {
		Ok(Synthesis::Existing(unit))
	}
}
