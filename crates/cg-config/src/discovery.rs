//! Discovers a project's type-configuration file, falling back to the
//! default include-globs when none is present — the Project Loader's
//! "heuristic fallback" from the external-interfaces contract.

use std::path::{Path, PathBuf};

use crate::project::ProjectContext;

/// Conventional type-configuration file names, searched in order.
const CANDIDATE_TYPE_CONFIG_NAMES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// Locates a project's type-configuration file and builds the corresponding
/// [`ProjectContext`]. When none of the conventional names exists, the
/// context is returned with `type_config_path = None` and the default
/// include/exclude globs, matching the Project Loader's heuristic fallback.
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Searches the project root for a conventional type-configuration file.
    pub fn find(&self) -> Option<PathBuf> {
        CANDIDATE_TYPE_CONFIG_NAMES
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
    }

    /// Builds a [`ProjectContext`] for the root, with the discovered
    /// type-configuration path if any.
    pub fn discover(&self) -> ProjectContext {
        let context = ProjectContext::new(&self.root);
        match self.find() {
            Some(path) => context.with_type_config(path),
            None => context,
        }
    }
}

/// Discovers a project context rooted at the current directory.
pub fn discover() -> std::io::Result<ProjectContext> {
    let root = std::env::current_dir()?;
    Ok(ConfigDiscovery::new(root).discover())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_type_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn find_discovers_tsconfig() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tsconfig.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(ConfigDiscovery::new(dir.path()).find(), Some(path));
    }

    #[test]
    fn discover_falls_back_to_default_globs_when_absent() {
        let dir = TempDir::new().unwrap();
        let context = ConfigDiscovery::new(dir.path()).discover();
        assert!(context.type_config_path.is_none());
        assert!(!context.include_globs.is_empty());
    }
}
