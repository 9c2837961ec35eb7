//! # cg-config
//!
//! Project context, type-configuration discovery, analysis options, and the
//! entry-point string grammar. Consumed by `cg-engine`'s Project Loader and
//! Entry-Point Finder; the type-configuration file itself is kept opaque —
//! this crate only locates it and hands its path to the typed-AST provider.

pub mod discovery;
pub mod entry_point;
pub mod error;
pub mod project;

pub use discovery::{ConfigDiscovery, discover};
pub use entry_point::{EntryPointRef, MemberRef};
pub use error::{ConfigError, Result};
pub use project::{
    AnalysisOptions, CANONICAL_EXTENSIONS, CompiledGlobs, DEFAULT_EXCLUDED_DIRS, DEFAULT_TEST_DIRS,
    DEFAULT_TEST_SUFFIXES, ProjectContext, looks_like_dependency_path, looks_like_test_file,
};
