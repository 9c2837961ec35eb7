//! The Parallel Driver: a bounded worker pool over files, applied only in
//! whole-project mode (no single entry point), where the graph shape is not
//! known in advance and per-file analysis can proceed independently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cg_graph::{CallGraph, CallSiteKind, Edge, EdgeKind, GraphMetadata, Node, NodeId, OxcTypeProvider, TypeProvider};
use rayon::ThreadPoolBuilder;

use crate::builder::{CalleeFilter, node_from_declaration, node_id_for_declaration};
use crate::symbol_resolver::SymbolResolver;

#[derive(Debug, thiserror::Error)]
pub enum ParallelError {
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    #[error("worker failed on {file}: {message}")]
    Worker { file: PathBuf, message: String },
}

/// One file's local analysis result before cross-file merging: its own
/// nodes and edges, where edges whose callee could not be resolved
/// cross-file carry a bare textual target name instead of a real [`NodeId`].
pub struct FileResult {
    pub file: PathBuf,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Edge index → bare callee name, for edges the worker could not resolve
    /// to a [`NodeId`] because the callee lives in another file.
    pub unresolved_targets: HashMap<usize, String>,
}

/// Configuration for a parallel, whole-project run.
pub struct ParallelOptions {
    pub concurrency: usize,
    pub continue_on_error: bool,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            continue_on_error: true,
        }
    }
}

/// Produces one file's [`FileResult`] for whole-project mode: every
/// declaration `file` contains becomes a node regardless of reachability,
/// and every call site is resolved with a fresh, file-scoped
/// [`SymbolResolver`]. A call site that resolves to a declaration in a
/// filtered-out file (dependency/test policy) is dropped entirely; one that
/// fails to resolve at all keeps its bare textual callee name so the merge
/// step can attempt a cross-file, name-based join (§4.6).
pub fn whole_project_file_result(
    file: &Path,
    provider: &mut dyn TypeProvider,
    filter: &dyn CalleeFilter,
    analyze_callbacks: bool,
    collect_metrics: bool,
) -> Result<FileResult, String> {
    let declarations = provider.all_declarations(file).map_err(|e| e.to_string())?;
    let resolver = SymbolResolver::new();
    let file_arc: Arc<Path> = Arc::from(file);

    let mut nodes = Vec::with_capacity(declarations.len());
    let mut known_ids = rustc_hash::FxHashSet::default();
    for declaration in &declarations {
        let id = node_id_for_declaration(declaration);
        if known_ids.insert(id.clone()) {
            nodes.push(node_from_declaration(id, declaration));
        }
    }

    let mut edges = Vec::new();
    let mut unresolved_targets = HashMap::new();
    let mut edge_counter = 0u64;

    for declaration in &declarations {
        let source_id = node_id_for_declaration(declaration);

        let call_sites = provider.call_sites(declaration).map_err(|e| e.to_string())?;
        for call_site in call_sites {
            let resolved = if call_site.callee_is_member_access {
                resolver.resolve_member_access(provider, &file_arc, call_site.callee_pos)
            } else {
                resolver.resolve_identifier(provider, &file_arc, call_site.callee_pos)
            }
            .map_err(|e| e.to_string())?;

            let kind = if call_site.is_awaited {
                EdgeKind::Async
            } else if call_site.kind == CallSiteKind::Construction {
                EdgeKind::Constructor
            } else {
                EdgeKind::Sync
            };

            match resolved {
                Some(callee) if filter.is_filtered_out(&callee.file) => continue,
                Some(callee) => {
                    let target_id = node_id_for_declaration(&callee);
                    let edge_id = format!("{source_id}->{target_id}#{edge_counter}");
                    edge_counter += 1;
                    edges.push(Edge {
                        id: edge_id,
                        source: source_id.clone(),
                        target: target_id,
                        kind,
                        line: call_site.pos.line,
                        column: call_site.pos.column,
                        arguments: if collect_metrics { call_site.argument_types.clone() } else { None },
                    });
                }
                None => {
                    let target_id = NodeId::from_raw(call_site.callee_name.clone());
                    let edge_id = format!("{source_id}->{target_id}#{edge_counter}");
                    edge_counter += 1;
                    let edge_index = edges.len();
                    edges.push(Edge {
                        id: edge_id,
                        source: source_id.clone(),
                        target: target_id,
                        kind,
                        line: call_site.pos.line,
                        column: call_site.pos.column,
                        arguments: None,
                    });
                    unresolved_targets.insert(edge_index, call_site.callee_name.clone());
                }
            }
        }

        if analyze_callbacks {
            for callback in provider.callback_sites(declaration).map_err(|e| e.to_string())? {
                if filter.is_filtered_out(&callback.declaration.file) {
                    continue;
                }
                let target_id = node_id_for_declaration(&callback.declaration);
                if known_ids.insert(target_id.clone()) {
                    nodes.push(node_from_declaration(target_id.clone(), &callback.declaration));
                }
                let edge_id = format!("{source_id}->{target_id}#{edge_counter}");
                edge_counter += 1;
                edges.push(Edge {
                    id: edge_id,
                    source: source_id.clone(),
                    target: target_id,
                    kind: EdgeKind::Callback,
                    line: callback.pos.line,
                    column: callback.pos.column,
                    arguments: None,
                });
            }
        }
    }

    Ok(FileResult { file: file.to_path_buf(), nodes, edges, unresolved_targets })
}

/// Runs `analyze_file` across `files` on a bounded worker pool, each worker
/// owning its own [`OxcTypeProvider`] instance (shared-nothing except the
/// cache the caller threads through `analyze_file` itself), then merges the
/// per-file results into one [`CallGraph`].
pub fn analyze_project<F>(
    files: Vec<PathBuf>,
    options: &ParallelOptions,
    project_root: PathBuf,
    generated_at: String,
    analyze_file: F,
) -> Result<CallGraph, ParallelError>
where
    F: Fn(&Path, &mut dyn TypeProvider) -> Result<FileResult, String> + Sync,
{
    let pool = ThreadPoolBuilder::new().num_threads(options.concurrency).build()?;

    let results: Vec<Result<FileResult, ParallelError>> = pool.install(|| {
        use rayon::prelude::*;
        files
            .par_iter()
            .map(|file| {
                let mut provider = OxcTypeProvider::new();
                analyze_file(file, &mut provider).map_err(|message| ParallelError::Worker {
                    file: file.clone(),
                    message,
                })
            })
            .collect()
    });

    let mut file_results = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(file_result) => file_results.push(file_result),
            Err(err) if options.continue_on_error => {
                tracing::warn!(error = %err, "skipping file after worker error");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(merge(file_results, project_root, generated_at))
}

/// Unions per-file node/edge sets by id (later writes of the same id are
/// ignored — nodes are immutable), then re-targets bare-name edges by
/// searching the merged node map; edges that remain unresolvable are dropped
/// and the merged graph's `metadata.approximate` flag is set.
fn merge(file_results: Vec<FileResult>, project_root: PathBuf, generated_at: String) -> CallGraph {
    let mut nodes: Vec<Node> = Vec::new();
    let mut seen_ids = rustc_hash::FxHashSet::default();
    let mut by_name: HashMap<String, NodeId> = HashMap::new();

    for file_result in &file_results {
        for node in &file_result.nodes {
            if seen_ids.insert(node.id.clone()) {
                by_name.entry(node.name.clone()).or_insert_with(|| node.id.clone());
                nodes.push(node.clone());
            }
        }
    }

    let mut edges = Vec::new();
    let mut approximate = false;
    for file_result in file_results {
        for (index, mut edge) in file_result.edges.into_iter().enumerate() {
            if let Some(bare_name) = file_result.unresolved_targets.get(&index) {
                match by_name.get(bare_name) {
                    Some(real_id) => edge.target = real_id.clone(),
                    None => {
                        approximate = true;
                        continue;
                    }
                }
            }
            edges.push(edge);
        }
    }

    let total_files_seen = nodes.iter().map(|n| &n.file_path).collect::<std::collections::HashSet<_>>().len();
    let entry_point_id = nodes.first().map(|n| n.id.clone()).unwrap_or_else(|| NodeId::from_raw(""));

    CallGraph {
        metadata: GraphMetadata {
            generated_at,
            entry_point: String::new(),
            max_depth: 0,
            project_root,
            type_config_path: None,
            total_files_seen,
            analysis_duration_ms: 0,
            approximate,
        },
        nodes,
        edges,
        entry_point_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_graph::{EdgeKind, NodeKind};

    fn node(id: &str, name: &str) -> Node {
        Node {
            id: NodeId::from_raw(id),
            name: name.to_string(),
            kind: NodeKind::Function,
            file_path: PathBuf::from("a.ts"),
            line: 1,
            column: 0,
            is_async: false,
            is_static: None,
            visibility: None,
            owning_class: None,
            parameters: vec![],
            return_type: "void".into(),
        }
    }

    #[test]
    fn merge_retargets_bare_name_edges() {
        let mut unresolved = HashMap::new();
        unresolved.insert(0, "helper".to_string());
        let file_results = vec![
            FileResult {
                file: PathBuf::from("a.ts"),
                nodes: vec![node("a.ts#main", "main")],
                edges: vec![Edge {
                    id: "e0".into(),
                    source: NodeId::from_raw("a.ts#main"),
                    target: NodeId::from_raw("helper"),
                    kind: EdgeKind::Sync,
                    line: 1,
                    column: 0,
                    arguments: None,
                }],
                unresolved_targets: unresolved,
            },
            FileResult {
                file: PathBuf::from("b.ts"),
                nodes: vec![node("b.ts#helper", "helper")],
                edges: vec![],
                unresolved_targets: HashMap::new(),
            },
        ];
        let graph = merge(file_results, PathBuf::from("."), "now".into());
        assert!(!graph.metadata.approximate);
        assert_eq!(graph.edges[0].target, NodeId::from_raw("b.ts#helper"));
    }

    #[test]
    fn merge_drops_edge_and_marks_approximate_when_unresolvable() {
        let mut unresolved = HashMap::new();
        unresolved.insert(0, "missing".to_string());
        let file_results = vec![FileResult {
            file: PathBuf::from("a.ts"),
            nodes: vec![node("a.ts#main", "main")],
            edges: vec![Edge {
                id: "e0".into(),
                source: NodeId::from_raw("a.ts#main"),
                target: NodeId::from_raw("missing"),
                kind: EdgeKind::Sync,
                line: 1,
                column: 0,
                arguments: None,
            }],
            unresolved_targets: unresolved,
        }];
        let graph = merge(file_results, PathBuf::from("."), "now".into());
        assert!(graph.metadata.approximate);
        assert!(graph.edges.is_empty());
    }
}
