//! # cg-engine
//!
//! The analysis engine proper: Symbol Resolver, Entry-Point Finder,
//! Call-Graph Builder, Cache Manager, Parallel Driver, and Incremental
//! Driver, built on top of `cg-graph`'s data model and `cg-config`'s
//! project/entry-point types.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cg_config::{EntryPointRef, ProjectContext};
//! use cg_engine::analyze;
//!
//! # fn main() -> cg_engine::Result<()> {
//! let project = ProjectContext::new("./my-project");
//! let entry = EntryPointRef::parse("src/index.ts#main").map_err(cg_engine::Error::from)?;
//! let graph = analyze(&project, &entry, &Default::default())?;
//! println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
//! # Ok(()) }
//! ```

pub mod builder;
pub mod cache;
pub mod entry_point_finder;
pub mod incremental;
#[cfg(feature = "logging")]
pub mod logging;
pub mod parallel;
pub mod symbol_resolver;

use std::path::Path;

use cg_config::{AnalysisOptions, ConfigError, EntryPointRef, ProjectContext, looks_like_dependency_path, looks_like_test_file};
use cg_graph::{CallGraph, OxcTypeProvider};

pub use builder::{BuildError, CallGraphBuilder, CalleeFilter, node_id_for_declaration};
pub use cache::{CacheEntry, CacheManager, CacheStats};
pub use entry_point_finder::{EntryPointError, find_entry_point, resolve_source_file};
pub use incremental::{DEBOUNCE_WINDOW, FilesChanged, IncrementalError, watch};
pub use parallel::{FileResult, ParallelError, ParallelOptions, analyze_project, whole_project_file_result};
pub use symbol_resolver::{ResolverError, SymbolResolver};

/// Error types for cg-engine operations.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    /// The project context failed validation (missing root, malformed
    /// type-configuration file, bad glob pattern).
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// The entry-point string did not match the grammar, or parsing/lookup
    /// failed to locate a matching declaration.
    #[error(transparent)]
    #[diagnostic(transparent)]
    EntryPoint(#[from] EntryPointError),

    /// A hard failure from the traversal: extracting node fields bubbled up
    /// an error (e.g. the source file disappeared mid-analysis).
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A worker in the Parallel Driver failed and `continue_on_error` was
    /// not selected.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// A failure watching the project tree in the Incremental Driver.
    #[error(transparent)]
    Incremental(#[from] IncrementalError),

    /// I/O error reading a source file or writing a cache entry.
    #[error("I/O error: {0}")]
    #[diagnostic(code(cg::engine::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Maps every hard variant to the CLI contract's exit code (the only
    /// piece of that contract the core needs to expose).
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias for cg-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A filter combining the dependency/test-file policy from
/// [`AnalysisOptions`] with its `include_patterns`/`exclude_patterns` regex
/// lists: the whitelist applies only when non-empty, the blacklist always
/// applies, matching the Project Loader's filtering policy (§4.1).
struct ProjectFilter<'a> {
    options: &'a AnalysisOptions,
    include: Vec<regex::Regex>,
    exclude: Vec<regex::Regex>,
}

impl<'a> ProjectFilter<'a> {
    fn new(options: &'a AnalysisOptions) -> Self {
        let compile = |patterns: &[String]| {
            patterns.iter().filter_map(|p| regex::Regex::new(p).ok()).collect::<Vec<_>>()
        };
        Self { options, include: compile(&options.include_patterns), exclude: compile(&options.exclude_patterns) }
    }
}

impl CalleeFilter for ProjectFilter<'_> {
    fn is_filtered_out(&self, file: &Path) -> bool {
        if !self.options.include_dependencies && looks_like_dependency_path(file) {
            return true;
        }
        if !self.options.include_test_files && looks_like_test_file(file) {
            return true;
        }
        let path_str = file.to_string_lossy();
        if !self.include.is_empty() && !self.include.iter().any(|re| re.is_match(&path_str)) {
            return true;
        }
        if self.exclude.iter().any(|re| re.is_match(&path_str)) {
            return true;
        }
        false
    }
}

/// Runs a single-entry-point analysis: resolves the entry point, then drives
/// the Call-Graph Builder to completion. This is the sequential mode; use
/// [`analyze_project`] for whole-project, no-entry-point runs.
pub fn analyze(project: &ProjectContext, entry: &EntryPointRef, options: &AnalysisOptions) -> Result<CallGraph> {
    project.validate()?;
    let globs = project.compile_globs()?;

    let file = resolve_source_file(entry, |p| globs.is_in_scope(p) && p.is_file())?;

    let mut provider = OxcTypeProvider::new();
    let entry_declaration = find_entry_point(&mut provider, &file, entry)?;

    let resolver = SymbolResolver::new();
    let filter = ProjectFilter::new(options);
    let builder = CallGraphBuilder::new(&mut provider, &resolver, options, &filter);

    let graph = builder.build(
        entry_declaration,
        project.root_path.clone(),
        project.type_config_path.clone(),
        1,
        generated_at_now(),
    )?;
    Ok(graph)
}

/// Runs a whole-project analysis: every in-scope, non-filtered file
/// contributes every declaration it has as a node (reachability from a
/// single entry point is not required), and the Parallel Driver's worker
/// pool resolves and merges each file's call sites independently. Use
/// [`analyze`] instead when a single entry point is known.
pub fn analyze_whole_project(
    project: &ProjectContext,
    options: &AnalysisOptions,
    parallel_options: &ParallelOptions,
) -> Result<CallGraph> {
    project.validate()?;
    let filter = ProjectFilter::new(options);
    let files: Vec<_> =
        project.in_scope_files()?.into_iter().filter(|file| !filter.is_filtered_out(file)).collect();

    let analyze_callbacks = options.analyze_callbacks;
    let collect_metrics = options.collect_metrics;

    let graph = parallel::analyze_project(
        files,
        parallel_options,
        project.root_path.clone(),
        generated_at_now(),
        |file, provider| {
            parallel::whole_project_file_result(file, provider, &filter, analyze_callbacks, collect_metrics)
        },
    )?;
    Ok(graph)
}

/// Epoch-milliseconds timestamp for `CallGraph::metadata.generated_at`.
/// Kept dependency-free (no `chrono`) since this is the only place the
/// engine needs wall-clock time.
fn generated_at_now() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
