//! The default [`TypeProvider`] implementation, backed by `oxc_parser` and
//! `oxc_semantic` — the same parser/semantic-analysis stack used elsewhere in
//! this workspace's module-graph tooling.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, CallExpression, ClassDeclaration, Expression, Function, FunctionBody,
    FunctionType, ImportDeclarationSpecifier, MethodDefinitionKind, ModuleDeclaration, ModuleExportName,
    Program, StaticMemberExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_semantic::{Semantic, SemanticBuilder, SymbolFlags};
use oxc_span::{GetSpan, SourceType};

use crate::graph::{NodeKind, Parameter};
use crate::provider::{CallSite, CallSiteKind, CallbackSite, Declaration, ProviderError, SourcePos, TypeProvider};

/// Canonical source extensions tried, in order, when resolving a relative
/// import specifier that omits its extension. Kept local to this module
/// (rather than depending on `cg-config`, a higher layer) since `cg-graph`
/// sits below it in the workspace.
const MODULE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// One parsed, semantically analyzed source file.
///
/// The allocator is leaked for the lifetime of the provider so the parsed
/// `Program` and its `Semantic` index can outlive the parse call without a
/// self-referential struct; this mirrors how long-lived Oxc-based tooling in
/// this codebase keeps an arena alive across repeated queries.
struct LoadedFile {
    source_text: String,
    program: &'static Program<'static>,
    semantic: Semantic<'static>,
}

/// The shipped, Oxc-backed [`TypeProvider`].
///
/// Not shared across worker tasks: the Parallel Driver gives each worker its
/// own instance (see the Concurrency & Resource Model).
#[derive(Default)]
pub struct OxcTypeProvider {
    files: HashMap<PathBuf, LoadedFile>,
}

impl OxcTypeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn file(&self, path: &Path) -> Result<&LoadedFile, ProviderError> {
        self.files.get(path).ok_or_else(|| ProviderError::NotInProject(path.to_path_buf()))
    }

    fn line_column(source_text: &str, byte_offset: u32) -> (u32, u32) {
        let offset = byte_offset as usize;
        let mut line = 1u32;
        let mut col = 0u32;
        for (i, b) in source_text.as_bytes().iter().enumerate() {
            if i >= offset {
                break;
            }
            if *b == b'\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    fn source_pos(source_text: &str, byte_offset: u32) -> SourcePos {
        let (line, column) = Self::line_column(source_text, byte_offset);
        SourcePos { byte_offset, line, column }
    }

    /// Locates the function body of the declaration whose first-token byte
    /// offset is `offset`, covering top-level functions, class members
    /// (routed through `visit_function` the same as any other function), and
    /// arrow functions.
    fn body_at<'ast>(program: &'ast Program<'ast>, offset: u32) -> Option<&'ast FunctionBody<'ast>> {
        let mut finder = BodyFinder { target: offset, body: None };
        finder.visit_program(program);
        finder.body
    }

    fn params_from_function(function: &Function, source_text: &str) -> Vec<Parameter> {
        function
            .params
            .items
            .iter()
            .map(|param| {
                let name = param.pattern.get_identifier_name().map(|n| n.to_string()).unwrap_or_default();
                let type_string = param
                    .pattern
                    .type_annotation
                    .as_ref()
                    .map(|ann| source_text[ann.type_annotation.span().start as usize..ann.type_annotation.span().end as usize].to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Parameter {
                    name,
                    type_string,
                    optional: param.pattern.optional,
                    default_value: None,
                }
            })
            .collect()
    }

    fn return_type_of(function: &Function, source_text: &str) -> String {
        function
            .return_type
            .as_ref()
            .map(|ann| source_text[ann.type_annotation.span().start as usize..ann.type_annotation.span().end as usize].to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Resolves a relative import specifier against `local_name`, returning
    /// the declaration the import ultimately names in its source module, if
    /// that module is itself a project-relative file this provider can load.
    fn resolve_import(&mut self, file: &Path, local_name: &str) -> Result<Option<Declaration>, ProviderError> {
        let loaded = self.file(file)?;
        let mut target: Option<(String, String)> = None;
        for stmt in &loaded.program.body {
            let Some(ModuleDeclaration::ImportDeclaration(import)) = stmt.as_module_declaration() else { continue };
            let Some(specifiers) = &import.specifiers else { continue };
            for specifier in specifiers.iter() {
                match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                        if spec.local.name == local_name {
                            let imported_name = match &spec.imported {
                                ModuleExportName::IdentifierName(id) => id.name.to_string(),
                                ModuleExportName::IdentifierReference(id) => id.name.to_string(),
                                ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
                            };
                            target = Some((import.source.value.to_string(), imported_name));
                        }
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
                        if spec.local.name == local_name {
                            target = Some((import.source.value.to_string(), "default".to_string()));
                        }
                    }
                    // A namespace import binds an object, not a callable — the
                    // Symbol Resolver contract stops here rather than unwrapping.
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => {}
                }
            }
        }
        let Some((module_specifier, imported_name)) = target else { return Ok(None) };
        if !module_specifier.starts_with('.') {
            // Package import — outside the project view by default.
            return Ok(None);
        }
        let Some(base_dir) = file.parent() else { return Ok(None) };
        let joined = base_dir.join(&module_specifier);
        for candidate in candidate_module_paths(&joined) {
            if candidate.is_file() {
                return self.find_top_level_function(&candidate, &imported_name);
            }
        }
        Ok(None)
    }
}

fn candidate_module_paths(base: &Path) -> Vec<PathBuf> {
    if base.extension().is_some() {
        return vec![base.to_path_buf()];
    }
    MODULE_EXTENSIONS.iter().map(|ext| base.with_extension(ext)).collect()
}

/// A function, variable, or class declaration at the top level of a module,
/// whether written bare or wrapped in `export` / `export default`. Oxc parses
/// each export form as its own `Statement` variant (`ExportNamedDeclaration`,
/// `ExportDefaultDeclaration`) around the same inner declaration, so every
/// scan of `program.body` needs to unwrap them before matching — mirrors the
/// export dispatch in this workspace's doc extractor.
enum TopLevelDecl<'a> {
    Function(&'a Function<'a>),
    Variable(&'a oxc_ast::ast::VariableDeclaration<'a>),
    Class(&'a ClassDeclaration<'a>),
}

fn as_top_level_decl<'a>(stmt: &'a oxc_ast::ast::Statement<'a>) -> Option<TopLevelDecl<'a>> {
    use oxc_ast::ast::{Declaration, ExportDefaultDeclarationKind, Statement};
    match stmt {
        Statement::FunctionDeclaration(func) => Some(TopLevelDecl::Function(func)),
        Statement::VariableDeclaration(decl) => Some(TopLevelDecl::Variable(decl)),
        Statement::ClassDeclaration(class) => Some(TopLevelDecl::Class(class)),
        Statement::ExportNamedDeclaration(export) => match export.declaration.as_ref()? {
            Declaration::FunctionDeclaration(func) => Some(TopLevelDecl::Function(func)),
            Declaration::VariableDeclaration(decl) => Some(TopLevelDecl::Variable(decl)),
            Declaration::ClassDeclaration(class) => Some(TopLevelDecl::Class(class)),
            _ => None,
        },
        Statement::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => Some(TopLevelDecl::Function(func)),
            ExportDefaultDeclarationKind::ClassDeclaration(class) => Some(TopLevelDecl::Class(class)),
            _ => None,
        },
        _ => None,
    }
}

impl TypeProvider for OxcTypeProvider {
    fn load_file(&mut self, path: &Path) -> Result<(), ProviderError> {
        if self.files.contains_key(path) {
            return Ok(());
        }
        let source_text = std::fs::read_to_string(path).map_err(|source| ProviderError::Io { path: path.to_path_buf(), source })?;
        let source_type = SourceType::from_path(path).unwrap_or_default();

        let allocator: &'static Allocator = Box::leak(Box::new(Allocator::default()));
        let leaked_source: &'static str = Box::leak(source_text.clone().into_boxed_str());
        let parsed = Parser::new(allocator, leaked_source, source_type).parse();
        if !parsed.errors.is_empty() {
            return Err(ProviderError::Parse {
                path: path.to_path_buf(),
                message: parsed.errors.first().map(|e| e.to_string()).unwrap_or_default(),
            });
        }
        let program: &'static Program<'static> = Box::leak(Box::new(parsed.program));
        let semantic_ret = SemanticBuilder::new().build(program);
        let semantic = semantic_ret.semantic;

        self.files.insert(path.to_path_buf(), LoadedFile { source_text, program, semantic });
        Ok(())
    }

    fn find_top_level_function(&mut self, file: &Path, name: &str) -> Result<Option<Declaration>, ProviderError> {
        self.load_file(file)?;
        let loaded = self.file(file)?;
        for stmt in &loaded.program.body {
            let Some(TopLevelDecl::Function(func)) = as_top_level_decl(stmt) else { continue };
            if func.id.as_ref().map(|id| id.name.as_str()) == Some(name) {
                return Ok(Some(Declaration {
                    file: file.to_path_buf(),
                    name: name.to_string(),
                    kind: NodeKind::Function,
                    pos: Self::source_pos(&loaded.source_text, func.span().start),
                    is_async: func.r#async,
                    is_static: false,
                    owning_class: None,
                    parameters: Self::params_from_function(func, &loaded.source_text),
                    return_type: Self::return_type_of(func, &loaded.source_text),
                }));
            }
        }
        Ok(None)
    }

    fn find_bound_function_expression(
        &mut self,
        file: &Path,
        name: &str,
    ) -> Result<Option<Declaration>, ProviderError> {
        self.load_file(file)?;
        let loaded = self.file(file)?;
        for stmt in &loaded.program.body {
            let Some(TopLevelDecl::Variable(decl)) = as_top_level_decl(stmt) else { continue };
            for declarator in &decl.declarations {
                if declarator.id.get_identifier_name().as_deref() != Some(name) {
                    continue;
                }
                let Some(init) = &declarator.init else { continue };
                match init {
                    Expression::ArrowFunctionExpression(arrow) => {
                        return Ok(Some(Declaration {
                            file: file.to_path_buf(),
                            name: name.to_string(),
                            kind: NodeKind::Arrow,
                            pos: Self::source_pos(&loaded.source_text, arrow.span().start),
                            is_async: arrow.r#async,
                            is_static: false,
                            owning_class: None,
                            parameters: arrow
                                .params
                                .items
                                .iter()
                                .map(|p| Parameter {
                                    name: p.pattern.get_identifier_name().map(|n| n.to_string()).unwrap_or_default(),
                                    type_string: "unknown".into(),
                                    optional: p.pattern.optional,
                                    default_value: None,
                                })
                                .collect(),
                            return_type: "unknown".into(),
                        }));
                    }
                    Expression::FunctionExpression(func) => {
                        return Ok(Some(Declaration {
                            file: file.to_path_buf(),
                            name: name.to_string(),
                            kind: NodeKind::FunctionExpression,
                            pos: Self::source_pos(&loaded.source_text, func.span().start),
                            is_async: func.r#async,
                            is_static: false,
                            owning_class: None,
                            parameters: Self::params_from_function(func, &loaded.source_text),
                            return_type: Self::return_type_of(func, &loaded.source_text),
                        }));
                    }
                    _ => {}
                }
            }
        }
        Ok(None)
    }

    fn find_class_member(
        &mut self,
        file: &Path,
        class: &str,
        member: &str,
    ) -> Result<Option<Declaration>, ProviderError> {
        self.load_file(file)?;
        let loaded = self.file(file)?;
        for stmt in &loaded.program.body {
            let Some(TopLevelDecl::Class(class_decl)) = as_top_level_decl(stmt) else { continue };
            if class_decl.id.as_ref().map(|id| id.name.as_str()) != Some(class) {
                continue;
            }
            for element in &class_decl.body.body {
                let oxc_ast::ast::ClassElement::MethodDefinition(method) = element else { continue };
                let method_name = method.key.static_name().map(|n| n.to_string()).unwrap_or_default();
                let is_constructor = method.kind == MethodDefinitionKind::Constructor;
                let matches = if member == "constructor" {
                    is_constructor
                } else {
                    method_name == member
                };
                if !matches {
                    continue;
                }
                let kind = if is_constructor {
                    NodeKind::Constructor
                } else {
                    match method.kind {
                        MethodDefinitionKind::Get => NodeKind::Getter,
                        MethodDefinitionKind::Set => NodeKind::Setter,
                        _ => NodeKind::Method,
                    }
                };
                return Ok(Some(Declaration {
                    file: file.to_path_buf(),
                    name: if is_constructor { "constructor".to_string() } else { method_name },
                    kind,
                    pos: Self::source_pos(&loaded.source_text, method.span().start),
                    is_async: method.value.r#async,
                    is_static: method.r#static,
                    owning_class: Some(class.to_string()),
                    parameters: Self::params_from_function(&method.value, &loaded.source_text),
                    return_type: Self::return_type_of(&method.value, &loaded.source_text),
                }));
            }
        }
        Ok(None)
    }

    fn resolve_identifier(&mut self, file: &Path, pos: SourcePos) -> Result<Option<Declaration>, ProviderError> {
        self.load_file(file)?;

        // Walk every resolved reference in the file's symbol table looking
        // for the one whose identifier sits at `pos` — the semantic index
        // (rather than a fresh syntax-only scan) is what lets this handle
        // forward references and shadowing correctly.
        let (name, is_import) = {
            let loaded = self.file(file)?;
            let scoping = loaded.semantic.scoping();
            let nodes = loaded.semantic.nodes();
            let mut matched = None;
            'outer: for symbol_id in scoping.symbol_ids() {
                for &reference_id in scoping.get_resolved_reference_ids(symbol_id) {
                    let reference = scoping.get_reference(reference_id);
                    let span = nodes.get_node(reference.node_id()).kind().span();
                    if span.start == pos.byte_offset {
                        let is_import = scoping.symbol_flags(symbol_id).contains(SymbolFlags::Import);
                        matched = Some((scoping.symbol_name(symbol_id).to_string(), is_import));
                        break 'outer;
                    }
                }
            }
            let Some(found) = matched else { return Ok(None) };
            found
        };

        if is_import {
            if let Some(decl) = self.resolve_import(file, &name)? {
                return Ok(Some(decl));
            }
            // Fall through: an import whose source isn't a project-relative
            // file (or isn't found) resolves to nothing, per the soft
            // resolution-failure policy.
        }
        if let Some(decl) = self.find_top_level_function(file, &name)? {
            return Ok(Some(decl));
        }
        if let Some(decl) = self.find_bound_function_expression(file, &name)? {
            return Ok(Some(decl));
        }
        // `new Widget()`'s callee is a bare identifier naming the class
        // itself, which resolves through the same reference table as a
        // function name — route it to the explicit constructor, if the
        // class declares one. A class with no explicit constructor has no
        // function-like declaration to point an edge at, so this correctly
        // falls through to a resolution miss.
        self.find_class_member(file, &name, "constructor")
    }

    fn resolve_member_access(&mut self, file: &Path, pos: SourcePos) -> Result<Option<Declaration>, ProviderError> {
        self.load_file(file)?;
        let program = self.file(file)?.program;
        let mut finder = MemberAccessFinder { target: pos.byte_offset, current_class: None, resolved: None };
        finder.visit_program(program);
        let Some((class, member)) = finder.resolved else {
            // Receiver types beyond `this` require whole-program points-to
            // information this narrow provider doesn't carry — an
            // expected resolution failure, not an error.
            return Ok(None);
        };
        self.find_class_member(file, &class, &member)
    }

    fn call_sites(&mut self, declaration: &Declaration) -> Result<Vec<CallSite>, ProviderError> {
        self.load_file(&declaration.file)?;
        let loaded = self.file(&declaration.file)?;
        let Some(body) = Self::body_at(loaded.program, declaration.pos.byte_offset) else {
            return Ok(Vec::new());
        };
        let mut visitor = CallSiteCollector {
            source_text: &loaded.source_text,
            sites: Vec::new(),
            await_depth: 0,
        };
        visitor.visit_function_body(body);
        Ok(visitor.sites)
    }

    fn callback_sites(&mut self, declaration: &Declaration) -> Result<Vec<CallbackSite>, ProviderError> {
        self.load_file(&declaration.file)?;
        let loaded = self.file(&declaration.file)?;
        let Some(body) = Self::body_at(loaded.program, declaration.pos.byte_offset) else {
            return Ok(Vec::new());
        };
        let mut visitor = CallbackCollector {
            source_text: &loaded.source_text,
            file: declaration.file.clone(),
            sites: Vec::new(),
        };
        visitor.visit_function_body(body);
        Ok(visitor.sites)
    }

    fn content_hash(&mut self, file: &Path) -> Result<[u8; 32], ProviderError> {
        self.load_file(file)?;
        let loaded = self.file(file)?;
        Ok(*blake3::hash(loaded.source_text.as_bytes()).as_bytes())
    }

    fn all_declarations(&mut self, file: &Path) -> Result<Vec<Declaration>, ProviderError> {
        self.load_file(file)?;
        let loaded = self.file(file)?;
        let mut collector = DeclarationCollector { file: file.to_path_buf(), source_text: &loaded.source_text, out: Vec::new() };
        collector.visit_program(loaded.program);
        Ok(collector.out)
    }
}

/// Locates the [`FunctionBody`] of the function-like node whose first-token
/// byte offset is `target`. A single pass covers top-level functions, class
/// methods/accessors/constructors (routed through `visit_function` the same
/// as a standalone declaration), and arrow/function expressions.
struct BodyFinder<'ast> {
    target: u32,
    body: Option<&'ast FunctionBody<'ast>>,
}

impl<'ast> Visit<'ast> for BodyFinder<'ast> {
    fn visit_function(&mut self, it: &Function<'ast>, flags: oxc_semantic::ScopeFlags) {
        if it.span().start == self.target {
            self.body = it.body.as_deref();
            return;
        }
        walk::walk_function(self, it, flags);
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'ast>) {
        if it.span().start == self.target {
            self.body = Some(it.body.as_ref());
            return;
        }
        walk::walk_arrow_function_expression(self, it);
    }
}

/// Collects every top-level function, bound arrow/function expression, and
/// class member across a program's top-level statements — the declaration
/// set `all_declarations` reports for whole-project mode. Deliberately
/// iterates `program.body` directly (mirroring `find_top_level_function` /
/// `find_bound_function_expression` / `find_class_member`) rather than a
/// generic recursive walk, so the declaration set stays exactly the kinds the
/// Entry-Point Finder can also look up by name.
struct DeclarationCollector<'s> {
    file: PathBuf,
    source_text: &'s str,
    out: Vec<Declaration>,
}

impl<'s> DeclarationCollector<'s> {
    fn visit_program(&mut self, program: &Program<'_>) {
        for stmt in &program.body {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &oxc_ast::ast::Statement<'_>) {
        let Some(decl) = as_top_level_decl(stmt) else { return };
        match decl {
            TopLevelDecl::Function(func) => {
                if let Some(id) = &func.id {
                    self.out.push(Declaration {
                        file: self.file.clone(),
                        name: id.name.to_string(),
                        kind: NodeKind::Function,
                        pos: OxcTypeProvider::source_pos(self.source_text, func.span().start),
                        is_async: func.r#async,
                        is_static: false,
                        owning_class: None,
                        parameters: OxcTypeProvider::params_from_function(func, self.source_text),
                        return_type: OxcTypeProvider::return_type_of(func, self.source_text),
                    });
                }
            }
            TopLevelDecl::Variable(decl) => {
                for declarator in &decl.declarations {
                    let Some(name) = declarator.id.get_identifier_name() else { continue };
                    let Some(init) = &declarator.init else { continue };
                    match init {
                        Expression::ArrowFunctionExpression(arrow) => {
                            self.out.push(Declaration {
                                file: self.file.clone(),
                                name: name.to_string(),
                                kind: NodeKind::Arrow,
                                pos: OxcTypeProvider::source_pos(self.source_text, arrow.span().start),
                                is_async: arrow.r#async,
                                is_static: false,
                                owning_class: None,
                                parameters: arrow
                                    .params
                                    .items
                                    .iter()
                                    .map(|p| Parameter {
                                        name: p.pattern.get_identifier_name().map(|n| n.to_string()).unwrap_or_default(),
                                        type_string: "unknown".into(),
                                        optional: p.pattern.optional,
                                        default_value: None,
                                    })
                                    .collect(),
                                return_type: "unknown".into(),
                            });
                        }
                        Expression::FunctionExpression(func) => {
                            self.out.push(Declaration {
                                file: self.file.clone(),
                                name: name.to_string(),
                                kind: NodeKind::FunctionExpression,
                                pos: OxcTypeProvider::source_pos(self.source_text, func.span().start),
                                is_async: func.r#async,
                                is_static: false,
                                owning_class: None,
                                parameters: OxcTypeProvider::params_from_function(func, self.source_text),
                                return_type: OxcTypeProvider::return_type_of(func, self.source_text),
                            });
                        }
                        _ => {}
                    }
                }
            }
            TopLevelDecl::Class(class_decl) => self.visit_class(class_decl),
        }
    }

    fn visit_class(&mut self, class_decl: &ClassDeclaration<'_>) {
        let Some(class_name) = class_decl.id.as_ref().map(|id| id.name.to_string()) else { return };
        for element in &class_decl.body.body {
            let oxc_ast::ast::ClassElement::MethodDefinition(method) = element else { continue };
            let method_name = method.key.static_name().map(|n| n.to_string()).unwrap_or_default();
            let is_constructor = method.kind == MethodDefinitionKind::Constructor;
            let kind = if is_constructor {
                NodeKind::Constructor
            } else {
                match method.kind {
                    MethodDefinitionKind::Get => NodeKind::Getter,
                    MethodDefinitionKind::Set => NodeKind::Setter,
                    _ => NodeKind::Method,
                }
            };
            self.out.push(Declaration {
                file: self.file.clone(),
                name: if is_constructor { "constructor".to_string() } else { method_name },
                kind,
                pos: OxcTypeProvider::source_pos(self.source_text, method.span().start),
                is_async: method.value.r#async,
                is_static: method.r#static,
                owning_class: Some(class_name.clone()),
                parameters: OxcTypeProvider::params_from_function(&method.value, self.source_text),
                return_type: OxcTypeProvider::return_type_of(&method.value, self.source_text),
            });
        }
    }
}

/// Finds the `(class, member)` pair a `this.member` access at a given byte
/// offset refers to, tracking the innermost enclosing class declaration
/// while walking.
struct MemberAccessFinder {
    target: u32,
    current_class: Option<String>,
    resolved: Option<(String, String)>,
}

impl<'ast> Visit<'ast> for MemberAccessFinder {
    fn visit_class_declaration(&mut self, it: &ClassDeclaration<'ast>) {
        let previous = self.current_class.clone();
        self.current_class = it.id.as_ref().map(|id| id.name.to_string());
        walk::walk_class_declaration(self, it);
        self.current_class = previous;
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'ast>) {
        if it.property.span().start == self.target && matches!(it.object, Expression::ThisExpression(_)) {
            if let Some(class) = &self.current_class {
                self.resolved = Some((class.clone(), it.property.name.to_string()));
            }
        }
        walk::walk_static_member_expression(self, it);
    }
}

/// Single pre-order pass collecting call expressions with await/new ancestor
/// context, per the "single traversal, not repeated descendant scans" design.
struct CallSiteCollector<'s> {
    source_text: &'s str,
    sites: Vec<CallSite>,
    await_depth: u32,
}

impl<'s> CallSiteCollector<'s> {
    fn pos(&self, byte_offset: u32) -> SourcePos {
        OxcTypeProvider::source_pos(self.source_text, byte_offset)
    }

    fn callee_parts(&self, callee: &Expression) -> (String, bool, SourcePos) {
        match callee {
            Expression::Identifier(ident) => (ident.name.to_string(), false, self.pos(ident.span().start)),
            Expression::StaticMemberExpression(member) => {
                (member.property.name.to_string(), true, self.pos(member.property.span().start))
            }
            other => ("<computed>".to_string(), true, self.pos(other.span().start)),
        }
    }
}

impl<'s, 'ast> Visit<'ast> for CallSiteCollector<'s> {
    fn visit_await_expression(&mut self, it: &oxc_ast::ast::AwaitExpression<'ast>) {
        self.await_depth += 1;
        walk::walk_await_expression(self, it);
        self.await_depth -= 1;
    }

    /// `new Foo(...)` is a distinct AST node from a call expression in Oxc,
    /// but the spec treats the construction itself as a call site (the
    /// `constructor` edge variant) — not merely a depth marker nested calls
    /// inherit. Nested calls in the argument list are ordinary calls.
    fn visit_new_expression(&mut self, it: &oxc_ast::ast::NewExpression<'ast>) {
        let (callee_name, callee_is_member_access, callee_pos) = self.callee_parts(&it.callee);
        self.sites.push(CallSite {
            kind: CallSiteKind::Construction,
            pos: self.pos(it.span().start),
            is_awaited: self.await_depth > 0,
            callee_pos,
            callee_name,
            callee_is_member_access,
            argument_types: Some(it.arguments.iter().map(|_| "unknown".to_string()).collect()),
        });
        walk::walk_new_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'ast>) {
        let (callee_name, callee_is_member_access, callee_pos) = self.callee_parts(&it.callee);
        let is_continuation = matches!(callee_name.as_str(), "then" | "catch" | "finally") && callee_is_member_access;
        self.sites.push(CallSite {
            kind: CallSiteKind::Call,
            pos: self.pos(it.span().start),
            is_awaited: self.await_depth > 0 || is_continuation,
            callee_pos,
            callee_name,
            callee_is_member_access,
            argument_types: Some(
                it.arguments
                    .iter()
                    .map(|_| "unknown".to_string())
                    .collect(),
            ),
        });
        walk::walk_call_expression(self, it);
    }
}

/// Single pre-order pass collecting lambda/function-expression descendants
/// for callback-edge emission.
struct CallbackCollector<'s> {
    source_text: &'s str,
    file: PathBuf,
    sites: Vec<CallbackSite>,
}

impl<'s, 'ast> Visit<'ast> for CallbackCollector<'s> {
    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'ast>) {
        let pos = OxcTypeProvider::source_pos(self.source_text, it.span().start);
        self.sites.push(CallbackSite {
            pos,
            declaration: Declaration {
                file: self.file.clone(),
                name: "<anonymous>".to_string(),
                kind: NodeKind::Arrow,
                pos,
                is_async: it.r#async,
                is_static: false,
                owning_class: None,
                parameters: it
                    .params
                    .items
                    .iter()
                    .map(|p| Parameter {
                        name: p.pattern.get_identifier_name().map(|n| n.to_string()).unwrap_or_default(),
                        type_string: "unknown".into(),
                        optional: p.pattern.optional,
                        default_value: None,
                    })
                    .collect(),
                return_type: "unknown".into(),
            },
        });
        walk::walk_arrow_function_expression(self, it);
    }

    fn visit_function(&mut self, it: &Function<'ast>, flags: oxc_semantic::ScopeFlags) {
        if it.r#type == FunctionType::FunctionExpression {
            let pos = OxcTypeProvider::source_pos(self.source_text, it.span().start);
            self.sites.push(CallbackSite {
                pos,
                declaration: Declaration {
                    file: self.file.clone(),
                    name: it.id.as_ref().map(|id| id.name.to_string()).unwrap_or_else(|| "<anonymous>".to_string()),
                    kind: NodeKind::FunctionExpression,
                    pos,
                    is_async: it.r#async,
                    is_static: false,
                    owning_class: None,
                    parameters: OxcTypeProvider::params_from_function(it, self.source_text),
                    return_type: OxcTypeProvider::return_type_of(it, self.source_text),
                },
            });
        }
        walk::walk_function(self, it, flags);
    }
}
