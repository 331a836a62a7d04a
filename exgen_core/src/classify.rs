//! Line-level heuristics for extracted C++ code.
//!
//! These are text patterns, not a parser. They are tuned for curated textbook
//! listings and will misclassify adversarial input: a multi-line call such as
//! `print(x,` looks like a function definition, and a declaration split
//! across lines is only recognized by its first line.

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[ \t]*\.{3}").unwrap_or_else(|e| panic!("invalid placeholder pattern: {e}"))
});

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[ \t]*(?:(?P<keyword>class|struct|namespace|module)\b[ \t]*(?P<type>[a-zA-Z_][\w:]*)?.*|(?:[a-zA-Z_][\w:]*[ \t]+)?(?P<function>[a-zA-Z_][\w:]*)\([^;]*)$",
	)
	.unwrap_or_else(|e| panic!("invalid declaration pattern: {e}"))
});

/// The outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
	/// A line starting with `...`, standing for omitted code.
	Placeholder,
	/// A function definition. Holds the function name.
	Function(&'a str),
	/// A class, struct, namespace or module declaration. Holds the declared
	/// name, or the keyword itself for unnamed ones such as `namespace {`.
	Declaration(&'a str),
	/// Anything else.
	Plain,
}

/// Classify a single line. `line` must not include its terminator.
pub fn classify_line(line: &str) -> LineClass<'_> {
	if PLACEHOLDER.is_match(line) {
		return LineClass::Placeholder;
	}

	let Some(captures) = DECLARATION.captures(line) else {
		return LineClass::Plain;
	};

	if let Some(function) = captures.name("function") {
		return LineClass::Function(function.as_str());
	}

	let name = captures
		.name("type")
		.or_else(|| captures.name("keyword"))
		.map_or("", |m| m.as_str());

	LineClass::Declaration(name)
}

/// Strip a trailing `\n` or `\r\n` from a line produced by
/// [`str::split_inclusive`].
pub fn strip_terminator(line: &str) -> &str {
	let line = line.strip_suffix('\n').unwrap_or(line);
	line.strip_suffix('\r').unwrap_or(line)
}
