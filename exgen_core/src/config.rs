use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ExgenError;
use crate::ExgenResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["exgen.toml", ".exgen.toml", ".config/exgen.toml"];

/// Standard library headers precompiled into header units when neither the
/// command line nor the config names any.
pub const DEFAULT_HEADERS: [&str; 50] = [
	"algorithm",
	"array",
	"bit",
	"bitset",
	"charconv",
	"chrono",
	"compare",
	"concepts",
	"deque",
	"exception",
	"filesystem",
	"format",
	"fstream",
	"functional",
	"initializer_list",
	"iomanip",
	"ios",
	"iosfwd",
	"iostream",
	"istream",
	"iterator",
	"limits",
	"list",
	"locale",
	"map",
	"memory",
	"numbers",
	"numeric",
	"optional",
	"ostream",
	"queue",
	"random",
	"ranges",
	"ratio",
	"regex",
	"set",
	"span",
	"sstream",
	"stdexcept",
	"streambuf",
	"string",
	"string_view",
	"system_error",
	"tuple",
	"type_traits",
	"unordered_map",
	"unordered_set",
	"utility",
	"vector",
	"version",
];

/// Configuration loaded from an `exgen.toml` file.
///
/// ```toml
/// [artifacts]
/// snippet_prefix = "snip"
/// listing_prefix = "list"
///
/// [manifest]
/// file = "CMakeLists.txt"
/// skip_prefixes = ["run_test"]
///
/// [precompile]
/// compiler = "mod-g++"
/// include_dir = "/usr/local/include/c++/11.0.0"
///
/// [test]
/// interpreter = "python3"
/// ```
///
/// Every section is optional. A missing config file behaves exactly like an
/// empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExgenConfig {
	/// Naming conventions for headers, units and fragments.
	#[serde(default)]
	pub artifacts: ArtifactConfig,
	/// Build manifest location and pass-through rules.
	#[serde(default)]
	pub manifest: ManifestConfig,
	/// Header unit precompilation settings.
	#[serde(default)]
	pub precompile: PrecompileConfig,
	/// Test runner settings.
	#[serde(default)]
	pub test: TestConfig,
}

/// File naming conventions shared by the rewriter, synthesizer and manifest
/// merger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
	/// Base name prefix of code fragments that are wrapped in `main()`.
	pub snippet_prefix: String,
	/// Base name prefix of namespace-scope listings.
	pub listing_prefix: String,
	/// Extension (with the dot) of extracted headers.
	pub header_extension: String,
	/// Extension (with the dot) of compilable units.
	pub unit_extension: String,
	/// Extension stem of placeholder fragments; the serial number is appended.
	pub fragment_extension: String,
	/// Name of the program entry point.
	pub entry_point: String,
}

impl Default for ArtifactConfig {
	fn default() -> Self {
		Self {
			snippet_prefix: "snip".to_string(),
			listing_prefix: "list".to_string(),
			header_extension: ".hh".to_string(),
			unit_extension: ".cpp".to_string(),
			fragment_extension: ".inc".to_string(),
			entry_point: "main".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
	/// File name of the build manifest, relative to the artifact directory.
	pub file: PathBuf,
	/// Lines of the old manifest starting with one of these prefixes are
	/// dropped instead of being carried over.
	pub skip_prefixes: Vec<String>,
}

impl Default for ManifestConfig {
	fn default() -> Self {
		Self {
			file: PathBuf::from("CMakeLists.txt"),
			skip_prefixes: vec!["run_test".to_string()],
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrecompileConfig {
	/// Compiler used when `CXX` is not set.
	pub compiler: String,
	/// Directory holding the standard library headers.
	pub include_dir: PathBuf,
	/// Headers to precompile. Empty means [`DEFAULT_HEADERS`].
	pub headers: Vec<String>,
	/// Mapping file written after all headers are processed.
	pub module_map: PathBuf,
}

impl Default for PrecompileConfig {
	fn default() -> Self {
		Self {
			compiler: "mod-g++".to_string(),
			include_dir: PathBuf::from("/usr/local/include/c++/11.0.0"),
			headers: Vec::new(),
			module_map: PathBuf::from("module.map"),
		}
	}
}

impl PrecompileConfig {
	/// The configured headers, falling back to [`DEFAULT_HEADERS`].
	pub fn header_names(&self) -> Vec<String> {
		if self.headers.is_empty() {
			DEFAULT_HEADERS.iter().map(ToString::to_string).collect()
		} else {
			self.headers.clone()
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestConfig {
	/// Interpreter used for executable `.test` scripts.
	pub interpreter: String,
}

impl Default for TestConfig {
	fn default() -> Self {
		Self {
			interpreter: "python3".to_string(),
		}
	}
}

impl ExgenConfig {
	/// Resolve the first config file that exists at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> ExgenResult<Option<ExgenConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: ExgenConfig =
			toml::from_str(&content).map_err(|e| ExgenError::ConfigParse(e.to_string()))?;

		tracing::debug!(path = %config_path.display(), "loaded config");
		Ok(Some(config))
	}

	/// Load the config at `root`, or the defaults when there is none.
	pub fn load_or_default(root: &Path) -> ExgenResult<ExgenConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}
}
