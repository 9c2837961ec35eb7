//! Property-based tests over the graph data model using proptest, mirroring
//! the teacher's `ModuleGraph` property suite but exercising the node-id
//! scheme and structural invariants instead of module dependency symmetry.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use proptest::prelude::*;

use crate::graph::{CallGraph, Edge, EdgeKind, GraphMetadata, Node, NodeId, NodeKind};

#[derive(Debug, Clone)]
enum DeclKind {
    TopLevelFunction,
    StaticMember,
    InstanceMember,
}

fn decl_strategy() -> impl Strategy<Value = (String, String, DeclKind)> {
    (
        "[a-z][a-zA-Z0-9]{0,12}",
        "[A-Z][a-zA-Z0-9]{0,12}",
        prop_oneof![
            Just(DeclKind::TopLevelFunction),
            Just(DeclKind::StaticMember),
            Just(DeclKind::InstanceMember),
        ],
    )
        .prop_map(|(name, class, kind)| (name, class, kind))
}

fn node_id_for(file: &Path, name: &str, class: &str, kind: &DeclKind) -> NodeId {
    match kind {
        DeclKind::TopLevelFunction => NodeId::for_function(file, name),
        DeclKind::StaticMember => NodeId::for_member(file, class, name, true),
        DeclKind::InstanceMember => NodeId::for_member(file, class, name, false),
    }
}

fn node(id: NodeId, name: &str) -> Node {
    Node {
        id,
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

fn metadata() -> GraphMetadata {
    GraphMetadata {
        generated_at: "0".into(),
        entry_point: "a.ts#main".into(),
        max_depth: 10,
        project_root: PathBuf::from("."),
        type_config_path: None,
        total_files_seen: 1,
        analysis_duration_ms: 0,
        approximate: false,
    }
}

proptest! {
    /// Node ids built from distinct `(name, class, kind)` triples under the
    /// same file never collide, regardless of how the randomly generated
    /// declaration set is shaped.
    #[test]
    fn node_ids_are_unique_for_distinct_declarations(
        decls in prop::collection::vec(decl_strategy(), 1..=40)
    ) {
        let file = Path::new("/proj/random.ts");
        let mut seen: HashSet<String> = HashSet::new();
        let mut distinct: HashSet<(String, String, u8)> = HashSet::new();

        for (name, class, kind) in &decls {
            let discriminant = match kind {
                DeclKind::TopLevelFunction => 0u8,
                DeclKind::StaticMember => 1u8,
                DeclKind::InstanceMember => 2u8,
            };
            // Only assert uniqueness for declarations that are themselves
            // distinct triples — two identical triples deliberately collide.
            if !distinct.insert((name.clone(), class.clone(), discriminant)) {
                continue;
            }
            let id = node_id_for(file, name, class, kind);
            prop_assert!(
                seen.insert(id.as_str().to_string()),
                "node id collision for declaration {:?} (id = {})",
                (name, class, discriminant),
                id
            );
        }
    }

    /// A freshly built graph whose edges only ever reference node ids present
    /// in `nodes` always passes validation, no matter how the random edge set
    /// is wired up (including self-loops and disconnected components).
    #[test]
    fn validated_graphs_never_have_dangling_edge_endpoints(
        node_names in prop::collection::vec("[a-z][a-zA-Z0-9]{0,10}", 1..=15),
        edge_indices in prop::collection::vec((any::<usize>(), any::<usize>()), 0..=30)
    ) {
        let file = Path::new("/proj/random.ts");
        let mut seen_names = HashSet::new();
        let nodes: Vec<Node> = node_names
            .iter()
            .filter(|name| seen_names.insert((*name).clone()))
            .map(|name| node(NodeId::for_function(file, name), name))
            .collect();

        if nodes.is_empty() {
            return Ok(());
        }

        let edges: Vec<Edge> = edge_indices
            .iter()
            .enumerate()
            .map(|(i, (from_idx, to_idx))| {
                let source = nodes[from_idx % nodes.len()].id.clone();
                let target = nodes[to_idx % nodes.len()].id.clone();
                Edge {
                    id: format!("e{i}"),
                    source,
                    target,
                    kind: EdgeKind::Sync,
                    line: 1,
                    column: 0,
                    arguments: None,
                }
            })
            .collect();

        let graph = CallGraph {
            metadata: metadata(),
            entry_point_id: nodes[0].id.clone(),
            nodes,
            edges,
        };

        prop_assert!(graph.validate().is_ok());
    }
}
