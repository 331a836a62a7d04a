use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde::Serialize;

use crate::ExgenError;
use crate::ExgenResult;
use crate::config::PrecompileConfig;
use crate::fs_guard::FileGuard;
use crate::fs_guard::read_or_empty;

/// Directory, relative to the working directory, where the compiler stores
/// compiled header units.
pub const HEADER_UNIT_CACHE: &str = "gcm.cache";

/// One standard header turned into a header unit.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderUnit {
	pub header: String,
	/// Absolute path of the header source.
	pub source: PathBuf,
	/// Absolute path where the compiler caches the unit.
	pub cache: PathBuf,
	/// Whether the compiler exited successfully.
	pub compiled: bool,
}

impl HeaderUnit {
	pub fn map_line(&self) -> String {
		format!("{} {}\n", self.source.display(), self.cache.display())
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct PrecompileReport {
	pub units: Vec<HeaderUnit>,
	pub module_map: PathBuf,
	/// The mapping file was written (its content changed).
	pub written: bool,
}

impl PrecompileReport {
	pub fn failures(&self) -> impl Iterator<Item = &HeaderUnit> {
		self.units.iter().filter(|unit| !unit.compiled)
	}
}

/// The compiler arguments for turning `source` into a header unit.
pub fn compiler_args(source: &Path) -> Vec<String> {
	let mut args: Vec<String> = ["-std=c++20", "-fmodule-header", "-c", "-x", "c++"]
		.iter()
		.map(ToString::to_string)
		.collect();
	args.push(source.display().to_string());
	args
}

/// Where the compiler caches the unit for `source` when run from
/// `work_dir`: the source path appended to `gcm.cache`.
pub fn cache_path(work_dir: &Path, source: &Path) -> ExgenResult<PathBuf> {
	let relative = format!("{HEADER_UNIT_CACHE}{}", source.display());
	Ok(std::path::absolute(work_dir.join(relative))?)
}

pub fn render_module_map(units: &[HeaderUnit]) -> String {
	units.iter().map(HeaderUnit::map_line).collect()
}

/// Precompile each of `headers` with `compiler`, running in `work_dir`, and
/// write the source-to-cache mapping file there.
///
/// A compiler that exits unsuccessfully is logged and recorded in the report
/// but does not stop the run; a compiler that cannot be started does.
pub fn precompile_headers(
	work_dir: &Path,
	compiler: &str,
	headers: &[String],
	config: &PrecompileConfig,
	cancel: &AtomicBool,
) -> ExgenResult<PrecompileReport> {
	let mut units = Vec::with_capacity(headers.len());

	for header in headers {
		if cancel.load(Ordering::Relaxed) {
			return Err(ExgenError::Interrupted);
		}

		let source = config.include_dir.join(header);
		let args = compiler_args(&source);
		tracing::info!("{compiler} {}", args.join(" "));

		let status = Command::new(compiler)
			.args(&args)
			.current_dir(work_dir)
			.status()
			.map_err(|e| {
				ExgenError::Spawn {
					program: compiler.to_string(),
					reason: e.to_string(),
				}
			})?;
		if !status.success() {
			tracing::warn!(header, ?status, "header unit failed to compile");
		}

		units.push(HeaderUnit {
			header: header.clone(),
			cache: cache_path(work_dir, &source)?,
			source,
			compiled: status.success(),
		});
	}

	let module_map = work_dir.join(&config.module_map);
	let text = render_module_map(&units);
	let current = read_or_empty(&module_map)?;
	let mut guard = FileGuard::new(false);
	let written = current != text && guard.replace(&module_map, &text)?;

	Ok(PrecompileReport {
		units,
		module_map,
		written,
	})
}
