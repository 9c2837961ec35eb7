//! The Call-Graph Builder: depth-bounded traversal from an entry-point
//! declaration, producing the full [`CallGraph`].

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use cg_config::AnalysisOptions;
use cg_graph::{
    CallGraph, CallSiteKind, Declaration, Edge, EdgeKind, GraphMetadata, Node, NodeId, NodeKind, ProviderError,
    TypeProvider,
};

use crate::symbol_resolver::{ResolverError, SymbolResolver};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

/// Builds the node id the traversal assigns to `declaration`, uniformly
/// through the Symbol Resolver's `.`/`::` convention — the builder never
/// derives an id independently of this function (closing the spec's
/// node-id-scheme ambiguity).
pub fn node_id_for_declaration(declaration: &Declaration) -> NodeId {
    match (&declaration.owning_class, declaration.kind) {
        (Some(class), NodeKind::Getter) => {
            NodeId::for_accessor(&declaration.file, class, &declaration.name, false, declaration.is_static)
        }
        (Some(class), NodeKind::Setter) => {
            NodeId::for_accessor(&declaration.file, class, &declaration.name, true, declaration.is_static)
        }
        (Some(class), NodeKind::Constructor) => {
            NodeId::for_member(&declaration.file, class, &declaration.name, true)
        }
        (Some(class), _) => NodeId::for_member(&declaration.file, class, &declaration.name, declaration.is_static),
        (None, _) if declaration.name == "<anonymous>" => NodeId::for_anonymous(&declaration.file, declaration.pos.byte_offset),
        (None, _) => NodeId::for_function(&declaration.file, &declaration.name),
    }
}

pub(crate) fn node_from_declaration(id: NodeId, declaration: &Declaration) -> Node {
    Node {
        id,
        name: declaration.name.clone(),
        kind: declaration.kind,
        file_path: declaration.file.clone(),
        line: declaration.pos.line,
        column: declaration.pos.column,
        is_async: declaration.is_async,
        is_static: if declaration.kind.requires_owning_class() { Some(declaration.is_static) } else { None },
        visibility: None,
        owning_class: declaration.owning_class.clone(),
        parameters: declaration.parameters.clone(),
        return_type: declaration.return_type.clone(),
    }
}

/// Decides whether a callee declaration is filtered out by the project's
/// dependency/test-file policy (§4.1), applied at every call-graph edge.
pub trait CalleeFilter {
    fn is_filtered_out(&self, file: &Path) -> bool;
}

impl<F: Fn(&Path) -> bool> CalleeFilter for F {
    fn is_filtered_out(&self, file: &Path) -> bool {
        self(file)
    }
}

/// Drives the bounded, cycle-safe reachability traversal described in §4.4.
pub struct CallGraphBuilder<'a> {
    provider: &'a mut dyn TypeProvider,
    resolver: &'a SymbolResolver,
    options: &'a AnalysisOptions,
    filter: &'a dyn CalleeFilter,
    visited: rustc_hash::FxHashSet<NodeId>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    edge_counter: u64,
}

impl<'a> CallGraphBuilder<'a> {
    pub fn new(
        provider: &'a mut dyn TypeProvider,
        resolver: &'a SymbolResolver,
        options: &'a AnalysisOptions,
        filter: &'a dyn CalleeFilter,
    ) -> Self {
        Self {
            provider,
            resolver,
            options,
            filter,
            visited: rustc_hash::FxHashSet::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_counter: 0,
        }
    }

    /// Runs the traversal from `entry` and produces the finished, validated
    /// [`CallGraph`]. `project_root` and `type_config_path` are carried
    /// through only for the graph's metadata.
    pub fn build(
        mut self,
        entry: Declaration,
        project_root: std::path::PathBuf,
        type_config_path: Option<std::path::PathBuf>,
        total_files_seen: usize,
        generated_at: String,
    ) -> Result<CallGraph, BuildError> {
        let started = Instant::now();
        let entry_id = node_id_for_declaration(&entry);

        // A stack, not a queue: traversal visits depth-first in source order
        // (§5) so that, e.g., a three-node cycle is discovered along its
        // first edge before the builder backtracks to sibling call sites.
        let mut stack = vec![(entry, 0u32)];

        while let Some((declaration, depth)) = stack.pop() {
            let id = node_id_for_declaration(&declaration);
            if !self.visited.insert(id.clone()) {
                continue;
            }
            self.nodes.push(node_from_declaration(id.clone(), &declaration));

            // The entry point and every discovered node is always
            // materialized; the depth bound instead gates whether *this*
            // node's own call sites get enumerated. `depth` counts edges
            // already walked from the entry, so `max_depth = 0` stops at the
            // entry node and `max_depth = 1` walks exactly the entry's direct
            // call sites before stopping.
            if depth >= self.options.max_depth {
                continue;
            }

            // Callees discovered while processing this declaration are
            // pushed in reverse so the stack still pops them in source
            // order once it dives into the first one's own subtree.
            let mut discovered = Vec::new();

            let call_sites = self.provider.call_sites(&declaration)?;
            for call_site in call_sites {
                let file: Arc<Path> = Arc::from(declaration.file.as_path());
                let resolved = if call_site.callee_is_member_access {
                    self.resolver.resolve_member_access(self.provider, &file, call_site.callee_pos)?
                } else {
                    self.resolver.resolve_identifier(self.provider, &file, call_site.callee_pos)?
                };
                let Some(callee) = resolved else { continue };
                if self.filter.is_filtered_out(&callee.file) {
                    continue;
                }

                let kind = if call_site.is_awaited {
                    EdgeKind::Async
                } else if call_site.kind == CallSiteKind::Construction {
                    EdgeKind::Constructor
                } else {
                    EdgeKind::Sync
                };

                let target_id = node_id_for_declaration(&callee);
                let edge_id = format!("{id}->{target_id}#{}", self.edge_counter);
                self.edge_counter += 1;
                self.edges.push(Edge {
                    id: edge_id,
                    source: id.clone(),
                    target: target_id,
                    kind,
                    line: call_site.pos.line,
                    column: call_site.pos.column,
                    arguments: if self.options.collect_metrics { call_site.argument_types } else { None },
                });

                discovered.push((callee, depth + 1));
            }

            if self.options.analyze_callbacks {
                for callback in self.provider.callback_sites(&declaration)? {
                    if self.filter.is_filtered_out(&callback.declaration.file) {
                        continue;
                    }
                    let target_id = node_id_for_declaration(&callback.declaration);
                    let edge_id = format!("{id}->{target_id}#{}", self.edge_counter);
                    self.edge_counter += 1;
                    self.edges.push(Edge {
                        id: edge_id,
                        source: id.clone(),
                        target: target_id,
                        kind: EdgeKind::Callback,
                        line: callback.pos.line,
                        column: callback.pos.column,
                        arguments: None,
                    });
                    discovered.push((callback.declaration, depth + 1));
                }
            }

            stack.extend(discovered.into_iter().rev());
        }

        let graph = CallGraph {
            metadata: GraphMetadata {
                generated_at,
                entry_point: entry_id.to_string(),
                max_depth: self.options.max_depth,
                project_root,
                type_config_path,
                total_files_seen,
                analysis_duration_ms: started.elapsed().as_millis() as u64,
                approximate: false,
            },
            nodes: self.nodes,
            edges: self.edges,
            entry_point_id: entry_id,
        };
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_graph::SourcePos;
    use std::path::PathBuf;

    fn decl(name: &str, kind: NodeKind, owning_class: Option<&str>) -> Declaration {
        Declaration {
            file: PathBuf::from("a.ts"),
            name: name.to_string(),
            kind,
            pos: SourcePos { byte_offset: 0, line: 1, column: 0 },
            is_async: false,
            is_static: false,
            owning_class: owning_class.map(str::to_string),
            parameters: vec![],
            return_type: "void".into(),
        }
    }

    #[test]
    fn node_id_for_top_level_function_has_no_separator() {
        let id = node_id_for_declaration(&decl("main", NodeKind::Function, None));
        assert_eq!(id.as_str(), "a.ts#main");
    }

    #[test]
    fn node_id_for_instance_method_uses_double_colon() {
        let id = node_id_for_declaration(&decl("process", NodeKind::Method, Some("Svc")));
        assert_eq!(id.as_str(), "a.ts#Svc::process");
    }
}
