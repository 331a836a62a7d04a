use std::io::ErrorKind;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

use similar::TextDiff;

use crate::ExgenError;
use crate::ExgenResult;
use crate::config::TestConfig;

/// The three arguments of a test run: `NAME.test SOURCE_DIR BUILD_DIR`.
#[derive(Debug, Clone)]
pub struct TestInvocation {
	/// The expected-output fixture, relative to `source_dir`.
	pub test_file: PathBuf,
	pub source_dir: PathBuf,
	pub build_dir: PathBuf,
}

impl TestInvocation {
	/// The example name: the test file without its extension.
	pub fn name(&self) -> String {
		self.test_file.with_extension("").display().to_string()
	}

	pub fn test_path(&self) -> PathBuf {
		self.source_dir.join(&self.test_file)
	}

	pub fn input_path(&self) -> PathBuf {
		self.source_dir.join(format!("{}.input", self.name()))
	}

	pub fn executable_path(&self) -> PathBuf {
		self.build_dir
			.join(format!("{}{}", self.name(), std::env::consts::EXE_SUFFIX))
	}
}

/// How a test run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
	/// The output matched the fixture, or the test script succeeded.
	Passed,
	/// The output differed. Holds a unified diff from expected to actual.
	Mismatch { diff: String },
	/// The test script exited unsuccessfully.
	ScriptFailed { code: Option<i32> },
}

impl TestOutcome {
	pub fn is_pass(&self) -> bool {
		matches!(self, Self::Passed)
	}
}

/// Run one example test.
///
/// An executable `.test` file is a script that does its own checking; it is
/// run through the configured interpreter with the name and both
/// directories. Otherwise the built example runs with `NAME.input` (if any)
/// on stdin, and its merged stdout and stderr must equal the `.test` file
/// byte for byte.
pub fn run_test(invocation: &TestInvocation, config: &TestConfig) -> ExgenResult<TestOutcome> {
	let test_path = invocation.test_path();
	if is_executable(&test_path) {
		return run_script(invocation, &test_path, config);
	}

	let input = match std::fs::read(invocation.input_path()) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
		Err(e) => return Err(e.into()),
	};
	let expected = std::fs::read(&test_path)?;
	let actual = run_executable(&invocation.executable_path(), &input)?;

	if actual == expected {
		return Ok(TestOutcome::Passed);
	}

	Ok(TestOutcome::Mismatch {
		diff: render_diff(&expected, &actual),
	})
}

/// Unified diff between the expected and actual output. Invalid UTF-8 is
/// replaced for display only; the comparison itself is on bytes.
pub fn render_diff(expected: &[u8], actual: &[u8]) -> String {
	let expected = String::from_utf8_lossy(expected);
	let actual = String::from_utf8_lossy(actual);
	TextDiff::from_lines(expected.as_ref(), actual.as_ref())
		.unified_diff()
		.header("Expected", "Actual")
		.to_string()
}

fn run_script(
	invocation: &TestInvocation,
	test_path: &Path,
	config: &TestConfig,
) -> ExgenResult<TestOutcome> {
	tracing::debug!(script = %test_path.display(), "running test script");
	let status = Command::new(&config.interpreter)
		.arg(test_path)
		.arg(invocation.name())
		.arg(&invocation.source_dir)
		.arg(&invocation.build_dir)
		.status()
		.map_err(|e| {
			ExgenError::Spawn {
				program: config.interpreter.clone(),
				reason: e.to_string(),
			}
		})?;

	if status.success() {
		Ok(TestOutcome::Passed)
	} else {
		Ok(TestOutcome::ScriptFailed {
			code: status.code(),
		})
	}
}

/// Run `executable` with `input` on stdin and return everything it wrote to
/// stdout and stderr, interleaved as written.
fn run_executable(executable: &Path, input: &[u8]) -> ExgenResult<Vec<u8>> {
	if !executable.is_file() {
		return Err(ExgenError::MissingExecutable(
			executable.display().to_string(),
		));
	}

	let spawn_error = |e: std::io::Error| {
		ExgenError::Spawn {
			program: executable.display().to_string(),
			reason: e.to_string(),
		}
	};

	// Both streams share one file so the output keeps its original order.
	let mut output = tempfile::tempfile()?;
	let mut child = Command::new(executable)
		.stdin(Stdio::piped())
		.stdout(output.try_clone()?)
		.stderr(output.try_clone()?)
		.spawn()
		.map_err(spawn_error)?;

	if let Some(mut stdin) = child.stdin.take() {
		match stdin.write_all(input) {
			Ok(()) => {}
			// The program may exit without reading its input.
			Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
			Err(e) => return Err(e.into()),
		}
	}
	let status = child.wait().map_err(spawn_error)?;
	tracing::debug!(executable = %executable.display(), ?status, "example finished");

	let mut actual = Vec::new();
	output.seek(SeekFrom::Start(0))?;
	output.read_to_end(&mut actual)?;

	Ok(actual)
}

/// On Unix a test script is marked by the execute bit for others.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
	use std::os::unix::fs::PermissionsExt;

	std::fs::metadata(path).is_ok_and(|meta| meta.permissions().mode() & 0o001 != 0)
}

/// Elsewhere a test script is recognized by its `#!` line.
#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
	let Ok(mut file) = std::fs::File::open(path) else {
		return false;
	};
	let mut magic = [0_u8; 2];
	file.read_exact(&mut magic).is_ok() && &magic == b"#!"
}
