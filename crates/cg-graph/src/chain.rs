//! `CallChain` — a read-only BFS query over a finished [`CallGraph`], for
//! explaining why a node is reachable without re-running the builder.

use std::collections::{HashMap, VecDeque};

use crate::graph::{CallGraph, NodeId};

/// A single path of node ids from the entry to a target, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallChain(pub Vec<NodeId>);

impl CallChain {
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Finds the shortest call chain from the graph's entry point to `target`,
/// following edges in insertion order. Returns `None` if `target` is not
/// reachable (including if it is absent from the graph).
pub fn find_chain(graph: &CallGraph, target: &NodeId) -> Option<CallChain> {
    if graph.entry_point_id == *target {
        return Some(CallChain(vec![target.clone()]));
    }

    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in &graph.edges {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
    }

    let mut visited = std::collections::HashSet::new();
    let mut queue = VecDeque::new();
    let mut predecessor: HashMap<&NodeId, &NodeId> = HashMap::new();

    visited.insert(&graph.entry_point_id);
    queue.push_back(&graph.entry_point_id);

    while let Some(current) = queue.pop_front() {
        if current == target {
            let mut chain = vec![current.clone()];
            let mut cursor = current;
            while let Some(prev) = predecessor.get(cursor) {
                chain.push((*prev).clone());
                cursor = prev;
            }
            chain.reverse();
            return Some(CallChain(chain));
        }
        if let Some(next_nodes) = adjacency.get(current) {
            for next in next_nodes {
                if visited.insert(*next) {
                    predecessor.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
    }
    None
}

/// Finds every distinct call chain from the entry to `target`, up to
/// `max_chains`, mirroring the bounded chain-enumeration style used for
/// dependency-chain explanations elsewhere in this workspace.
pub fn find_chains(graph: &CallGraph, target: &NodeId, max_chains: usize) -> Vec<CallChain> {
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in &graph.edges {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
    }

    let mut results = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(vec![&graph.entry_point_id]);

    while let Some(path) = queue.pop_front() {
        if results.len() >= max_chains {
            break;
        }
        let current = *path.last().unwrap();
        if current == target {
            results.push(CallChain(path.iter().map(|n| (*n).clone()).collect()));
            continue;
        }
        if let Some(next_nodes) = adjacency.get(current) {
            for next in next_nodes {
                if !path.contains(next) {
                    let mut extended = path.clone();
                    extended.push(next);
                    queue.push_back(extended);
                }
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, EdgeKind, GraphMetadata, Node, NodeKind};
    use std::path::PathBuf;

    fn node(id: &str) -> Node {
        Node {
            id: NodeId::from_raw(id),
            name: id.to_string(),
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

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: NodeId::from_raw(source),
            target: NodeId::from_raw(target),
            kind: EdgeKind::Sync,
            line: 1,
            column: 0,
            arguments: None,
        }
    }

    fn metadata() -> GraphMetadata {
        GraphMetadata {
            generated_at: "now".into(),
            entry_point: "a.ts#a".into(),
            max_depth: 10,
            project_root: PathBuf::from("."),
            type_config_path: None,
            total_files_seen: 1,
            analysis_duration_ms: 0,
            approximate: false,
        }
    }

    #[test]
    fn finds_linear_chain() {
        let graph = CallGraph {
            metadata: metadata(),
            nodes: vec![node("a"), node("b"), node("c")],
            edges: vec![edge("a->b#0", "a", "b"), edge("b->c#1", "b", "c")],
            entry_point_id: NodeId::from_raw("a"),
        };
        let chain = find_chain(&graph, &NodeId::from_raw("c")).unwrap();
        assert_eq!(chain.0, vec![NodeId::from_raw("a"), NodeId::from_raw("b"), NodeId::from_raw("c")]);
    }

    #[test]
    fn returns_none_for_unreachable_target() {
        let graph = CallGraph {
            metadata: metadata(),
            nodes: vec![node("a")],
            edges: vec![],
            entry_point_id: NodeId::from_raw("a"),
        };
        assert!(find_chain(&graph, &NodeId::from_raw("missing")).is_none());
    }
}
