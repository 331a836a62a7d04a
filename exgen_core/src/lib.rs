//! `exgen_core` is the core library for the [exgen](https://github.com/exploring-cpp/exgen)
//! example tooling. It turns code listings and snippets extracted from a
//! C++ book into compilable translation units and keeps a CMake manifest of
//! them in sync, without ever clobbering a file someone edited by hand.
//!
//! ## Processing Pipeline
//!
//! ```text
//! *.cpp files
//!   → Rewriter (placeholder `...` lines become comments + #include of a fragment)
//! *.hh files
//!   → Rewriter (same, while recording namespace-scope declarations)
//!   → Synthesizer (writes the missing *.cpp wrapper from a fixed template)
//! snip*.cpp + list*.cpp
//!   → Manifest merger (regenerates CMakeLists.txt, keeping user exceptions)
//! ```
//!
//! Every file is created only when absent. The two files that are replaced,
//! a source with placeholder lines and the manifest, are first renamed to a
//! `~` backup.
//!
//! ## Modules
//!
//! - [`config`]: Optional `exgen.toml` overriding the naming conventions.
//! - [`rewriter`]: Placeholder line rewriting and fragment files.
//! - [`synthesizer`]: Compilable unit templates.
//! - [`manifest`]: Build manifest parsing and merging.
//! - [`test_runner`]: Runs a built example against its expected output.
//! - [`precompile`]: Precompiles standard headers into header units.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//!
//! use exgen_core::GenerateOptions;
//! use exgen_core::generate_project;
//!
//! let cancel = AtomicBool::new(false);
//! let report = generate_project(Path::new("."), GenerateOptions::default(), &cancel).unwrap();
//! for unit in &report.units {
//!     eprintln!("{}", unit.path.display());
//! }
//! ```

pub use artifact::*;
pub use config::ExgenConfig;
pub use error::*;
pub use fs_guard::FileAction;
pub use fs_guard::FileEvent;
pub use fs_guard::FileGuard;
pub use pipeline::*;

mod artifact;
pub mod classify;
pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod fs_guard;
pub mod manifest;
mod pipeline;
pub mod precompile;
pub mod rewriter;
pub mod synthesizer;
pub mod test_runner;
