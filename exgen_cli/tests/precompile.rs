#![cfg(unix)]

mod common;

use common::exgen_cmd;
use common::read;
use common::write;
use exgen_core::AnyEmptyResult;

#[test]
fn precompile_writes_module_map() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = std::path::absolute(tmp.path())?;
	write(&root, "exgen.toml", "[precompile]\ninclude_dir = \"/inc\"\n");

	exgen_cmd()
		.env("CXX", "true")
		.arg("precompile")
		.arg("iostream")
		.arg("vector")
		.arg("--path")
		.arg(&root)
		.assert()
		.success()
		.stdout(predicates::str::contains("Precompiled 2 header(s)"));

	assert_eq!(
		read(&root, "module.map"),
		format!(
			"/inc/iostream {0}/gcm.cache/inc/iostream\n/inc/vector {0}/gcm.cache/inc/vector\n",
			root.display()
		)
	);

	exgen_cmd()
		.env("CXX", "true")
		.arg("precompile")
		.arg("iostream")
		.arg("vector")
		.arg("--path")
		.arg(&root)
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));

	Ok(())
}

#[test]
fn precompile_uses_configured_header_list() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write(
		tmp.path(),
		"exgen.toml",
		"[precompile]\ncompiler = \"false\"\ninclude_dir = \"/inc\"\nheaders = [\"string\"]\n",
	);

	exgen_cmd()
		.env_remove("CXX")
		.arg("precompile")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("failed: string"));

	assert!(read(tmp.path(), "module.map").starts_with("/inc/string "));

	Ok(())
}

#[test]
fn precompile_fails_when_compiler_is_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	exgen_cmd()
		.env("CXX", "exgen-no-such-compiler")
		.arg("precompile")
		.arg("iostream")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("exgen::spawn"));

	assert!(!tmp.path().join("module.map").exists());

	Ok(())
}

#[test]
fn precompile_stops_on_interrupt() -> AnyEmptyResult {
	use std::os::unix::fs::PermissionsExt;

	let tmp = tempfile::tempdir()?;
	// Sends SIGINT to exgen, which is the compiler's parent process.
	let compiler = tmp.path().join("interrupting-cxx");
	std::fs::write(&compiler, "#!/bin/sh\nkill -INT $PPID\nsleep 1\n")?;
	std::fs::set_permissions(&compiler, std::fs::Permissions::from_mode(0o755))?;

	exgen_cmd()
		.env("CXX", &compiler)
		.arg("precompile")
		.arg("iostream")
		.arg("vector")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(130)
		.stderr(predicates::str::contains("Interrupted"));

	assert!(!tmp.path().join("module.map").exists());

	Ok(())
}
