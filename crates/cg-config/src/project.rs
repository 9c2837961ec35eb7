//! `ProjectContext` and `AnalysisOptions` — the configuration bundle the
//! Project Loader opens a typed-AST provider against, and the options record
//! the Call-Graph Builder reads.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Directories excluded by default unless the caller opts into
/// `include_dependencies`.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "target", ".cache"];

/// Conventional test-file directory names, excluded by default unless the
/// caller opts into `include_test_files`.
pub const DEFAULT_TEST_DIRS: &[&str] = &["__tests__", "test", "tests"];

/// Conventional test-file suffixes, matched before the extension.
pub const DEFAULT_TEST_SUFFIXES: &[&str] = &[".test", ".spec"];

/// Canonical source extensions, in the order the Entry-Point Finder tries
/// them when a reference omits its extension.
pub const CANONICAL_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// The project root, optional type-configuration path, and include/exclude
/// globs the Project Loader opens a provider against.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root_path: PathBuf,
    pub type_config_path: Option<PathBuf>,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
}

impl ProjectContext {
    /// Builds a context for `root_path` with the default include/exclude
    /// globs (canonical source extensions; dependency directories and test
    /// files excluded).
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            type_config_path: None,
            include_globs: default_include_globs(),
            exclude_globs: default_exclude_globs(),
        }
    }

    pub fn with_type_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.type_config_path = Some(path.into());
        self
    }

    pub fn with_include_globs(mut self, globs: Vec<String>) -> Self {
        self.include_globs = globs;
        self
    }

    pub fn with_exclude_globs(mut self, globs: Vec<String>) -> Self {
        self.exclude_globs = globs;
        self
    }

    /// Validates the root path exists and, when present, that the
    /// type-configuration path exists too.
    pub fn validate(&self) -> Result<()> {
        if !self.root_path.is_dir() {
            return Err(ConfigError::RootNotFound { path: self.root_path.clone() });
        }
        if let Some(path) = &self.type_config_path {
            if !path.is_file() {
                return Err(ConfigError::TypeConfigNotFound { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Compiles the include/exclude glob lists into matchers.
    pub fn compile_globs(&self) -> Result<CompiledGlobs> {
        let include = build_glob_set(&self.include_globs)?;
        let exclude = build_glob_set(&self.exclude_globs)?;
        Ok(CompiledGlobs { include, exclude })
    }

    /// Walks `root_path` and returns every in-scope source file — the
    /// Project Loader's "iterable of in-scope files" output (§4.1), used by
    /// whole-project (no single entry point) analysis modes.
    pub fn in_scope_files(&self) -> Result<Vec<PathBuf>> {
        self.validate()?;
        let globs = self.compile_globs()?;
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !looks_like_dependency_path(e.path()))
        {
            let entry = entry.map_err(|e| ConfigError::Io {
                source: e.into_io_error().unwrap_or_else(|| std::io::Error::other("walk failed")),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if globs.is_in_scope(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }
}

fn default_include_globs() -> Vec<String> {
    vec![format!(
        "**/*.{{{}}}",
        CANONICAL_EXTENSIONS.join(",")
    )]
}

fn default_exclude_globs() -> Vec<String> {
    let mut globs: Vec<String> = DEFAULT_EXCLUDED_DIRS.iter().map(|dir| format!("**/{dir}/**")).collect();
    globs.extend(DEFAULT_TEST_DIRS.iter().map(|dir| format!("**/{dir}/**")));
    for suffix in DEFAULT_TEST_SUFFIXES {
        for ext in CANONICAL_EXTENSIONS {
            globs.push(format!("**/*{suffix}.{ext}"));
        }
    }
    globs
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidGlob { pattern: patterns.join(","), message: e.to_string() })
}

/// Compiled include/exclude matchers for a [`ProjectContext`].
pub struct CompiledGlobs {
    include: GlobSet,
    exclude: GlobSet,
}

impl CompiledGlobs {
    /// Applies the filtering policy from the Project Loader: the whitelist
    /// is checked first (when non-empty), then the blacklist always applies.
    pub fn is_in_scope(&self, path: &Path) -> bool {
        if !self.include.is_empty() && !self.include.is_match(path) {
            return false;
        }
        !self.exclude.is_match(path)
    }
}

/// Returns `true` if `path` looks like a test file by suffix or by
/// conventional directory name, independent of the configured glob lists
/// (used by callers that need the policy without compiling a `GlobSet`, e.g.
/// the Call-Graph Builder's per-callee filtering check).
pub fn looks_like_test_file(path: &Path) -> bool {
    if path.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        DEFAULT_TEST_DIRS.contains(&s.as_ref())
    }) {
        return true;
    }
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else { return false };
    DEFAULT_TEST_SUFFIXES.iter().any(|suffix| {
        CANONICAL_EXTENSIONS.iter().any(|ext| file_name.ends_with(&format!("{suffix}.{ext}")))
    })
}

/// Returns `true` if `path` falls under one of the default dependency
/// directories.
pub fn looks_like_dependency_path(path: &Path) -> bool {
    path.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        DEFAULT_EXCLUDED_DIRS.contains(&s.as_ref())
    })
}

/// Options controlling the Call-Graph Builder's traversal, unchanged from
/// the external-interfaces contract: every option is present and defaulted,
/// never merged from a partial bag at call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub max_depth: u32,
    pub include_dependencies: bool,
    pub include_test_files: bool,
    pub exclude_patterns: Vec<String>,
    pub include_patterns: Vec<String>,
    pub follow_imports: bool,
    pub analyze_callbacks: bool,
    pub collect_metrics: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            include_dependencies: false,
            include_test_files: false,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
            follow_imports: true,
            analyze_callbacks: true,
            collect_metrics: false,
        }
    }
}
