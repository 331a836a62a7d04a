use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Turn extracted C++ listings and snippets into compilable examples.",
	long_about = "exgen prepares the code examples extracted from a C++ book for building and \
	              testing.\n\nIt replaces elided `...` lines with includable fragments, wraps \
	              every header in a compilable translation unit and keeps a CMake manifest of \
	              all examples in sync. Files that already exist are never overwritten.\n\nQuick \
	              start:\n  exgen generate             Create missing units and update the \
	              manifest\n  exgen run-test NAME.test SRC BUILD  Check one example's output\n  \
	              exgen precompile           Build standard header units"
)]
pub struct ExgenCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the examples directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create missing fragments and units and merge the build manifest.
	///
	/// Rewrites placeholder `...` lines in every source, synthesizes a
	/// compilable unit for every header that lacks one, and regenerates
	/// `CMakeLists.txt` while keeping hand-written entries. This is the
	/// default command.
	///
	/// Exits with status 1 when a header has an unrecognized name prefix;
	/// the other headers are still processed.
	Generate {
		/// Show what would be created or backed up without touching the
		/// disk.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Output format for the run report.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Run one built example and compare its output.
	///
	/// Feeds `NAME.input` (when present) to the executable `NAME` in the
	/// build directory and compares its combined output with `NAME.test`.
	/// An executable `NAME.test` is run as a script instead.
	RunTest {
		/// The expected output file, relative to the source directory.
		test_file: PathBuf,
		/// Directory holding the `.test` and `.input` files.
		source_dir: PathBuf,
		/// Directory holding the built executables.
		build_dir: PathBuf,
	},
	/// Precompile standard headers into header units.
	///
	/// Runs the compiler named by `CXX` (or the configured compiler) once
	/// per header and writes `module.map` in the examples directory.
	Precompile {
		/// Headers to precompile. Defaults to the configured list.
		headers: Vec<String>,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
