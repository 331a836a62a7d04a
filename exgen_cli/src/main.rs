use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Parser;
use exgen_cli::Commands;
use exgen_cli::ExgenCli;
use exgen_cli::OutputFormat;
use exgen_core::ExgenConfig;
use exgen_core::ExgenError;
use exgen_core::FileAction;
use exgen_core::GenerateOptions;
use exgen_core::GenerateReport;
use exgen_core::generate;
use exgen_core::precompile::precompile_headers;
use exgen_core::test_runner::TestInvocation;
use exgen_core::test_runner::TestOutcome;
use exgen_core::test_runner::run_test;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

/// Exit status for a run interrupted by Ctrl-C.
const EXIT_INTERRUPTED: i32 = 130;

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult = Result<i32, Box<dyn std::error::Error>>;

fn main() {
	let args = ExgenCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let cancel = Arc::new(AtomicBool::new(false));
	let handler_flag = Arc::clone(&cancel);
	if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
		tracing::warn!("could not install the Ctrl-C handler: {e}");
	}

	let result = match &args.command {
		Some(Commands::Generate { dry_run, format }) => {
			run_generate(&args, *dry_run, *format, &cancel)
		}
		Some(Commands::RunTest {
			test_file,
			source_dir,
			build_dir,
		}) => run_run_test(&args, test_file, source_dir, build_dir),
		Some(Commands::Precompile { headers }) => run_precompile(&args, headers, &cancel),
		None => run_generate(&args, false, OutputFormat::Text, &cancel),
	};

	match result {
		Ok(code) => process::exit(code),
		Err(e) => {
			// Try to render through miette for rich diagnostics with help text
			// and error codes.
			match e.downcast::<ExgenError>() {
				Ok(exgen_err) if matches!(*exgen_err, ExgenError::Interrupted) => {
					eprintln!("Interrupted");
					process::exit(EXIT_INTERRUPTED);
				}
				Ok(exgen_err) => {
					let report: miette::Report = (*exgen_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `EXGEN_LOG` takes an `EnvFilter` directive; `--verbose`
/// forces `debug`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_env("EXGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &ExgenCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_generate(
	args: &ExgenCli,
	dry_run: bool,
	format: OutputFormat,
	cancel: &AtomicBool,
) -> CliResult {
	let root = resolve_root(args);
	let config = ExgenConfig::load_or_default(&root)?;
	let report = generate(&root, &config, GenerateOptions { dry_run }, cancel)?;

	match format {
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
		OutputFormat::Text => print_generate_report(&report, &root, args.verbose),
	}

	Ok(i32::from(!report.is_ok()))
}

fn print_generate_report(report: &GenerateReport, root: &Path, verbose: bool) {
	let verb = if report.dry_run { "would create" } else { "created" };
	let backup_verb = if report.dry_run {
		"would back up"
	} else {
		"backed up"
	};

	for event in &report.events {
		let rel = make_relative(&event.path, root);
		match event.action {
			FileAction::Created => eprintln!("{} {rel}", colored!(verb, green)),
			FileAction::BackedUp if verbose => eprintln!("{} {rel}", colored!(backup_verb, yellow)),
			FileAction::BackedUp => {}
		}
	}

	for skipped in &report.skipped {
		let rel = make_relative(&skipped.path, root);
		eprintln!("{} {rel}: {}", colored!("skipped:", yellow), skipped.reason);
	}

	if report.is_noop() {
		println!("All examples are already up to date.");
		return;
	}

	let created = report
		.events
		.iter()
		.filter(|event| event.action == FileAction::Created)
		.count();
	let prefix = if report.dry_run { "Dry run: " } else { "" };
	println!(
		"{prefix}{} {created} file(s): {} unit(s), {} fragment(s), {} rewritten source(s); \
		 manifest {}.",
		if report.dry_run { "would create" } else { "Created" },
		report.units.len(),
		report.fragments.len(),
		report.rewritten.len(),
		if report.manifest_changed {
			"updated"
		} else {
			"unchanged"
		},
	);
}

fn run_run_test(
	args: &ExgenCli,
	test_file: &Path,
	source_dir: &Path,
	build_dir: &Path,
) -> CliResult {
	let config = ExgenConfig::load_or_default(&resolve_root(args))?;
	let invocation = TestInvocation {
		test_file: test_file.to_path_buf(),
		source_dir: source_dir.to_path_buf(),
		build_dir: build_dir.to_path_buf(),
	};

	match run_test(&invocation, &config.test)? {
		TestOutcome::Passed => {
			if args.verbose {
				eprintln!("{} {}", colored!("passed", green), invocation.name());
			}
			Ok(0)
		}
		TestOutcome::Mismatch { diff } => {
			print_diff(&diff);
			Ok(1)
		}
		TestOutcome::ScriptFailed { code } => {
			eprintln!(
				"{} {}: test script exited with {}",
				colored!("failed", red),
				invocation.name(),
				code.map_or_else(|| "a signal".to_string(), |code| code.to_string()),
			);
			Ok(code.unwrap_or(1))
		}
	}
}

fn print_diff(diff: &str) {
	for line in diff.split_inclusive('\n') {
		if line.starts_with("---") || line.starts_with("+++") {
			print!("{}", colored!(line, bold));
		} else if line.starts_with('-') {
			print!("{}", colored!(line, red));
		} else if line.starts_with('+') {
			print!("{}", colored!(line, green));
		} else {
			print!("{line}");
		}
	}
}

fn run_precompile(args: &ExgenCli, headers: &[String], cancel: &AtomicBool) -> CliResult {
	let root = resolve_root(args);
	let config = ExgenConfig::load_or_default(&root)?;
	let compiler = std::env::var("CXX")
		.ok()
		.filter(|cxx| !cxx.is_empty())
		.unwrap_or_else(|| config.precompile.compiler.clone());
	let headers = if headers.is_empty() {
		config.precompile.header_names()
	} else {
		headers.to_vec()
	};

	let report = precompile_headers(&root, &compiler, &headers, &config.precompile, cancel)?;

	for unit in report.failures() {
		eprintln!(
			"{} {} ({})",
			colored!("failed:", yellow),
			unit.header,
			unit.source.display()
		);
	}

	let rel = make_relative(&report.module_map, &root);
	if report.written {
		println!(
			"Precompiled {} header(s); wrote {rel}.",
			report.units.len() - report.failures().count()
		);
	} else {
		println!("{rel} is already up to date.");
	}

	Ok(0)
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
