mod common;

use common::exgen_cmd;
use common::exgen_std_cmd;
use common::read;
use common::write;
use exgen_core::AnyEmptyResult;
use insta_cmd::assert_cmd_snapshot;
use rstest::rstest;
use similar_asserts::assert_eq;

fn sample_project(dir: &std::path::Path) {
	write(dir, "list0101.hh", "#include <iostream>\nint main()\n{\n}\n");
	write(dir, "snip0101.hh", "std::cout << 42;\n");
	write(
		dir,
		"CMakeLists.txt",
		"example(list0100 extra_dep.hh)\ninclude_directories(.)\n",
	);
	write(dir, "list0100.cpp", "#include <iostream>\nint main() {}\n");
}

#[test]
fn generate_creates_units_and_manifest() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path());

	exgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"))
		.stderr(predicates::str::contains("created list0101.cpp"))
		.stderr(predicates::str::contains("created snip0101.cpp"));

	assert_eq!(read(tmp.path(), "list0101.cpp"), "#include \"list0101.hh\"\n");
	assert_eq!(
		read(tmp.path(), "snip0101.cpp"),
		"#include <iostream>\nint main() {\n#include \"snip0101.hh\"\n}\n"
	);
	assert_eq!(
		read(tmp.path(), "CMakeLists.txt"),
		"example(list0100 extra_dep.hh)\nexample(list0101 list0101.hh)\nexample(snip0101 \
		 snip0101.hh)\ninclude_directories(.)\n"
	);
	assert_eq!(
		read(tmp.path(), "CMakeLists.txt~"),
		"example(list0100 extra_dep.hh)\ninclude_directories(.)\n"
	);

	Ok(())
}

#[rstest]
#[case::self_contained_listing("list0301.hh", "int main()\n{\n}\n", "#include \"list0301.hh\"\n")]
#[case::declaration_listing(
	"list0302.hh",
	"void greet()\n{\n}\n",
	"#include <iostream>\n#include \"list0302.hh\"\nint main() {\n\n}\n"
)]
#[case::snippet_with_type(
	"snip0301.hh",
	"struct point { int x, y; };\n",
	"#include <iostream>\n#include \"snip0301.hh\"\nint main() {\n\n}\n"
)]
#[case::snippet_statements(
	"snip0302.hh",
	"std::cout << 42;\n",
	"#include <iostream>\nint main() {\n#include \"snip0302.hh\"\n}\n"
)]
fn generate_picks_unit_template(
	#[case] header: &str,
	#[case] content: &str,
	#[case] expected: &str,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write(tmp.path(), header, content);

	exgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let unit = header.replace(".hh", ".cpp");
	assert_eq!(read(tmp.path(), &unit), expected);

	Ok(())
}

#[test]
fn generate_is_the_default_command() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path());

	exgen_cmd().arg("--path").arg(tmp.path()).assert().success();

	assert!(tmp.path().join("list0101.cpp").exists());

	Ok(())
}

#[test]
fn generate_second_run_is_noop() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path());

	exgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	std::fs::remove_file(tmp.path().join("CMakeLists.txt~"))?;

	assert_cmd_snapshot!(exgen_std_cmd().arg("generate").arg("--path").arg(tmp.path()), @r"
	success: true
	exit_code: 0
	----- stdout -----
	All examples are already up to date.

	----- stderr -----
	");
	assert!(!tmp.path().join("CMakeLists.txt~").exists());

	Ok(())
}

#[test]
fn generate_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path());

	exgen_cmd()
		.arg("generate")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run"))
		.stderr(predicates::str::contains("would create list0101.cpp"));

	assert!(!tmp.path().join("list0101.cpp").exists());
	assert!(!tmp.path().join("CMakeLists.txt~").exists());
	assert_eq!(
		read(tmp.path(), "CMakeLists.txt"),
		"example(list0100 extra_dep.hh)\ninclude_directories(.)\n"
	);

	Ok(())
}

#[test]
fn generate_reports_unrecognized_headers() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write(tmp.path(), "rational.hh", "class rational {};\n");
	write(tmp.path(), "list0101.hh", "int main() {}\n");

	exgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("skipped: rational.hh"));

	assert!(tmp.path().join("list0101.cpp").exists());
	assert!(!tmp.path().join("rational.cpp").exists());
	assert_eq!(
		read(tmp.path(), "CMakeLists.txt"),
		"example(list0101 list0101.hh)\n"
	);

	Ok(())
}

#[test]
fn generate_json_report() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	sample_project(tmp.path());

	let output = exgen_cmd()
		.arg("generate")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["dry_run"], serde_json::json!(false));
	assert_eq!(report["manifest_changed"], serde_json::json!(true));
	assert_eq!(report["units"].as_array().map(Vec::len), Some(2));
	assert_eq!(report["units"][0]["template"], serde_json::json!("self_contained"));
	assert_eq!(
		report["manifest_entries"],
		serde_json::json!(["list0100", "list0101", "snip0101"])
	);

	Ok(())
}

#[test]
fn generate_rejects_extra_arguments() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	exgen_cmd()
		.arg("generate")
		.arg("unexpected")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2);

	assert!(!tmp.path().join("CMakeLists.txt").exists());

	Ok(())
}

#[test]
fn generate_fails_on_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write(tmp.path(), "exgen.toml", "[artifacts\n");

	exgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("exgen::config_parse"));

	Ok(())
}
