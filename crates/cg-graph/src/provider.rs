//! The narrow interface the engine consumes from a typed-AST provider.
//!
//! This trait stands in for the external component that parses project
//! sources, resolves types, and exposes symbol declarations. The engine is
//! not hard-wired to one parser; [`crate::oxc_provider::OxcTypeProvider`] is
//! the shipped default implementation.

use std::path::{Path, PathBuf};

use crate::graph::{NodeKind, Parameter};

/// A reference to a syntactic position inside a source file, used to identify
/// call sites and identifier expressions without requiring the caller to hold
/// provider-internal AST handles across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePos {
    pub byte_offset: u32,
    pub line: u32,
    pub column: u32,
}

/// A function-like declaration as reported by the provider, independent of
/// the underlying parser's own AST representation.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub file: PathBuf,
    pub name: String,
    pub kind: NodeKind,
    pub pos: SourcePos,
    pub is_async: bool,
    pub is_static: bool,
    pub owning_class: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
}

/// The kind of invocation a [`CallSite`] represents, before resolution
/// decides the final edge variant (resolution may additionally mark a call
/// as `constructor` when it appears under a `new` expression).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSiteKind {
    /// A plain call expression (`f()`), or a member call (`obj.f()`).
    Call,
    /// A call that is the operand of `new` (`new C()`).
    Construction,
}

/// A syntactic call site found while walking a declaration's body.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub kind: CallSiteKind,
    pub pos: SourcePos,
    /// `true` if this call is the operand of an `await` expression, or the
    /// callee resolves to a promise continuation method (`then`/`catch`/`finally`).
    pub is_awaited: bool,
    /// Byte offset of the callee expression (identifier or member access),
    /// used to look it up via [`TypeProvider::resolve_identifier`] /
    /// [`TypeProvider::resolve_member_access`].
    pub callee_pos: SourcePos,
    /// The callee's bare textual name, used as a fallback label when
    /// resolution fails (e.g. for the parallel driver's bare-name re-targeting).
    pub callee_name: String,
    /// `true` if the callee expression is a member access (`obj.prop(...)`)
    /// rather than a bare identifier.
    pub callee_is_member_access: bool,
    /// Statically inferred argument type strings, in argument order, when the
    /// provider was asked to collect them. Unresolvable entries are `"unknown"`.
    pub argument_types: Option<Vec<String>>,
}

/// A lambda (arrow function) or function-expression descendant found inside
/// a declaration's body, reported separately from [`CallSite`]s so the
/// builder can emit `callback` edges for them.
#[derive(Debug, Clone)]
pub struct CallbackSite {
    pub pos: SourcePos,
    pub declaration: Declaration,
}

/// Errors a [`TypeProvider`] implementation may raise. These map onto the
/// engine's own `io-error` / `configuration-error` taxonomy at the call site.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read source file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("file {0} is not part of the loaded project")]
    NotInProject(PathBuf),
}

/// The narrow, provider-agnostic interface the Symbol Resolver, Entry-Point
/// Finder, and Call-Graph Builder consume.
///
/// Implementations own their own parsed-AST state; the engine never shares
/// one instance across worker tasks (see the Concurrency & Resource Model).
pub trait TypeProvider {
    /// Loads (and caches internally) the given project-relative or absolute
    /// source file, making its declarations available to the other methods.
    fn load_file(&mut self, path: &Path) -> Result<(), ProviderError>;

    /// Returns every top-level function declaration, and every exported
    /// declaration, in the given file, by name.
    fn find_top_level_function(&mut self, file: &Path, name: &str) -> Result<Option<Declaration>, ProviderError>;

    /// Returns a local binding in `file` whose initializer is a function-like
    /// expression, by binding name (used by the Entry-Point Finder's third
    /// lookup step and the Symbol Resolver's identifier resolution).
    fn find_bound_function_expression(
        &mut self,
        file: &Path,
        name: &str,
    ) -> Result<Option<Declaration>, ProviderError>;

    /// Returns a named method, accessor, or (for `"constructor"`) the
    /// constructor of the given class in `file`.
    fn find_class_member(
        &mut self,
        file: &Path,
        class: &str,
        member: &str,
    ) -> Result<Option<Declaration>, ProviderError>;

    /// Resolves an identifier expression at `pos` in `file` to its declaration,
    /// per the Symbol Resolver's `resolve-identifier` contract: unwraps at
    /// most 8 import/alias hops, stops at namespace imports.
    fn resolve_identifier(&mut self, file: &Path, pos: SourcePos) -> Result<Option<Declaration>, ProviderError>;

    /// Resolves a member-access expression (`obj.prop`) at `pos` in `file` to
    /// the declaration of `prop` on the receiver's static type.
    fn resolve_member_access(&mut self, file: &Path, pos: SourcePos) -> Result<Option<Declaration>, ProviderError>;

    /// Enumerates call sites syntactically nested inside `declaration`'s body,
    /// in source order, via a single pre-order traversal.
    fn call_sites(&mut self, declaration: &Declaration) -> Result<Vec<CallSite>, ProviderError>;

    /// Enumerates lambda and function-expression descendants of
    /// `declaration`'s body, in source order (used for callback analysis).
    fn callback_sites(&mut self, declaration: &Declaration) -> Result<Vec<CallbackSite>, ProviderError>;

    /// Returns the fully-qualified name the node-id scheme would assign to
    /// `declaration` (delegated to [`crate::graph::NodeId`] constructors by
    /// callers; providers need not format it themselves).
    fn content_hash(&mut self, file: &Path) -> Result<[u8; 32], ProviderError>;

    /// Enumerates every function-like declaration in `file`: top-level
    /// functions, bound arrow/function expressions, and class
    /// methods/constructors/accessors. Used by the Parallel Driver's
    /// whole-project (no single entry point) mode, where every declaration in
    /// every in-scope file becomes a node regardless of reachability from one
    /// entry point.
    fn all_declarations(&mut self, file: &Path) -> Result<Vec<Declaration>, ProviderError>;
}
