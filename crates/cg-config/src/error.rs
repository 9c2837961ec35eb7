//! Error types for project discovery, the type-configuration file, and the
//! entry-point string grammar.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("project root not found: {}", path.display())]
    #[diagnostic(code(cg::config::root_not_found), help("check that the root path exists and is a directory"))]
    RootNotFound { path: PathBuf },

    #[error("type-configuration file not found: {}", path.display())]
    #[diagnostic(code(cg::config::type_config_not_found))]
    TypeConfigNotFound { path: PathBuf },

    #[error("type-configuration file is malformed: {}", path.display())]
    #[diagnostic(code(cg::config::type_config_malformed), help("{message}"))]
    TypeConfigMalformed { path: PathBuf, message: String },

    #[error("invalid glob pattern `{pattern}`: {message}")]
    #[diagnostic(code(cg::config::invalid_glob))]
    InvalidGlob { pattern: String, message: String },

    #[error("invalid entry-point format: `{input}`")]
    #[diagnostic(
        code(cg::config::invalid_entry_point_format),
        help("expected `path#identifier` or `path#Class.member`, with at most one dot after `#`")
    )]
    InvalidEntryPointFormat { input: String },

    #[error("I/O error: {source}")]
    #[diagnostic(code(cg::config::io_error))]
    Io {
        #[source]
        #[from]
        source: std::io::Error,
    },
}
