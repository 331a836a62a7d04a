use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ExgenError {
	#[error(transparent)]
	#[diagnostic(code(exgen::io_error))]
	Io(#[from] std::io::Error),

	#[error("file name must start with `{snippet_prefix}` or `{listing_prefix}`, not `{path}`")]
	#[diagnostic(
		code(exgen::invalid_artifact_kind),
		help("rename the header, or write its compilable unit by hand so it is skipped")
	)]
	InvalidArtifactKind {
		path: String,
		snippet_prefix: String,
		listing_prefix: String,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(exgen::config_parse),
		help("check that exgen.toml is valid TOML with [artifacts], [manifest], [precompile] or [test] sections")
	)]
	ConfigParse(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(exgen::invalid_glob))]
	InvalidGlob { pattern: String, reason: String },

	#[error("test executable not found: `{0}`")]
	#[diagnostic(
		code(exgen::missing_executable),
		help("build the example before running its test")
	)]
	MissingExecutable(String),

	#[error("failed to run `{program}`: {reason}")]
	#[diagnostic(code(exgen::spawn))]
	Spawn { program: String, reason: String },

	#[error("interrupted")]
	#[diagnostic(code(exgen::interrupted))]
	Interrupted,
}

pub type ExgenResult<T> = Result<T, ExgenError>;
pub type AnyEmptyResult = Result<(), Box<dyn std::error::Error>>;
