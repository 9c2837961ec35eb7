//! The Entry-Point Finder's lookup half: turns a parsed [`EntryPointRef`]
//! into a declaration node. Parsing the entry-point string itself is
//! `cg-config::entry_point`'s job.

use std::path::{Path, PathBuf};

use cg_config::{CANONICAL_EXTENSIONS, EntryPointRef, MemberRef};
use cg_graph::{Declaration, ProviderError, TypeProvider};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EntryPointError {
    #[error("source file not found for entry point: {0}")]
    #[diagnostic(code(cg::engine::entry_point::source_file_not_found))]
    SourceFileNotFound(PathBuf),
    #[error("no declaration in {file} matches `{member}`")]
    #[diagnostic(
        code(cg::engine::entry_point::not_found),
        help("check that `{member}` is spelled exactly as it appears in {file}")
    )]
    EntryPointNotFound { file: PathBuf, member: String },
    #[error(transparent)]
    #[diagnostic(code(cg::engine::entry_point::provider_error))]
    Provider(#[from] ProviderError),
}

/// Resolves `entry.file` against the canonical extension search order when
/// it has none, returning the first file that exists in the project view.
pub fn resolve_source_file(entry: &EntryPointRef, is_in_project: impl Fn(&Path) -> bool) -> Result<PathBuf, EntryPointError> {
    if entry.file.extension().is_some() {
        return if is_in_project(&entry.file) {
            Ok(entry.file.clone())
        } else {
            Err(EntryPointError::SourceFileNotFound(entry.file.clone()))
        };
    }
    for ext in CANONICAL_EXTENSIONS {
        let candidate = entry.file.with_extension(ext);
        if is_in_project(&candidate) {
            return Ok(candidate);
        }
    }
    Err(EntryPointError::SourceFileNotFound(entry.file.clone()))
}

/// Locates the declaration `entry` refers to, per §4.3's lookup-chain order:
/// top-level function, then exported declaration, then bound function
/// expression for a single segment; class → method → accessor → constructor
/// for two segments.
pub fn find_entry_point(
    provider: &mut dyn TypeProvider,
    file: &Path,
    entry: &EntryPointRef,
) -> Result<Declaration, EntryPointError> {
    match &entry.member {
        MemberRef::Function(name) => {
            if let Some(decl) = provider.find_top_level_function(file, name)? {
                return Ok(decl);
            }
            if let Some(decl) = provider.find_bound_function_expression(file, name)? {
                return Ok(decl);
            }
            Err(EntryPointError::EntryPointNotFound { file: file.to_path_buf(), member: name.clone() })
        }
        MemberRef::Member(class, member) => provider
            .find_class_member(file, class, member)?
            .ok_or_else(|| EntryPointError::EntryPointNotFound {
                file: file.to_path_buf(),
                member: format!("{class}.{member}"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_source_file_tries_canonical_extensions_in_order() {
        let entry = EntryPointRef::parse("src/main#run").unwrap();
        let resolved = resolve_source_file(&entry, |p| p == Path::new("src/main.tsx")).unwrap();
        assert_eq!(resolved, PathBuf::from("src/main.tsx"));
    }

    #[test]
    fn resolve_source_file_fails_when_nothing_matches() {
        let entry = EntryPointRef::parse("src/main#run").unwrap();
        let result = resolve_source_file(&entry, |_| false);
        assert!(matches!(result, Err(EntryPointError::SourceFileNotFound(_))));
    }
}
