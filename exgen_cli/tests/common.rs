#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn exgen_std_cmd() -> std::process::Command {
	let mut cmd = std::process::Command::new(get_cargo_bin("exgen"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("EXGEN_LOG");
	cmd
}

pub fn exgen_cmd() -> Command {
	Command::from_std(exgen_std_cmd())
}

pub fn write(dir: &Path, name: &str, content: &str) {
	std::fs::write(dir.join(name), content).unwrap_or_else(|e| panic!("write {name}: {e}"));
}

pub fn read(dir: &Path, name: &str) -> String {
	std::fs::read_to_string(dir.join(name)).unwrap_or_else(|e| panic!("read {name}: {e}"))
}
