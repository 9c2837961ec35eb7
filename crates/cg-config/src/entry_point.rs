//! Parses the entry-point string grammar: `path#identifier` or
//! `path#Class.member` (the latter covering the literal `constructor`).
//! This is the parsing half of the Entry-Point Finder; the lookup half
//! (locating the matching declaration) lives in `cg-engine`.

use std::path::PathBuf;

use crate::error::ConfigError;

/// The member half of an entry-point reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRef {
    /// A bare top-level function name, or a locally bound function
    /// expression's binding name.
    Function(String),
    /// `Class.member` — `member` is resolved against methods, accessors, and
    /// (for the literal `constructor`) the class's constructor at lookup time.
    Member(String, String),
}

/// A parsed entry-point reference: the file to load and the member within it
/// to locate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointRef {
    pub file: PathBuf,
    pub member: MemberRef,
}

impl EntryPointRef {
    /// Parses `input` against the grammar `path-without-scheme "#" function-ref`,
    /// where `function-ref` is `identifier` or `identifier "." identifier`.
    /// Dots beyond one are a format error.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let (path_part, member_part) = input
            .split_once('#')
            .ok_or_else(|| ConfigError::InvalidEntryPointFormat { input: input.to_string() })?;

        if path_part.is_empty() || member_part.is_empty() {
            return Err(ConfigError::InvalidEntryPointFormat { input: input.to_string() });
        }

        let mut segments = member_part.split('.');
        let first = segments.next().unwrap();
        let second = segments.next();
        if segments.next().is_some() {
            return Err(ConfigError::InvalidEntryPointFormat { input: input.to_string() });
        }
        if first.is_empty() || second.is_some_and(str::is_empty) {
            return Err(ConfigError::InvalidEntryPointFormat { input: input.to_string() });
        }

        let member = match second {
            None => MemberRef::Function(first.to_string()),
            Some(member_name) => MemberRef::Member(first.to_string(), member_name.to_string()),
        };

        Ok(Self { file: PathBuf::from(path_part), member })
    }
}
