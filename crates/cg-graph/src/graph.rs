//! The neutral call-graph data model: `CallGraph`, `Node`, `Edge`, `Parameter`,
//! and the deterministic node-id scheme.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A deterministic, collision-free identifier for a node within one graph.
///
/// The scheme is `<absolute file path>#<disambiguating name>`:
/// - `ClassName.methodName` for static members and constructors
/// - `ClassName::methodName` for instance members
/// - `Class::get:prop` / `Class::set:prop` for instance accessors
///   (`Class.get:prop` / `Class.set:prop` for static accessors)
/// - bare `functionName` for top-level functions
/// - the binding name for initializer-bound arrow/function expressions
/// - `<file path>@<byte offset>` for truly anonymous declarations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Builds a node id for a top-level function or a bound arrow/function expression.
    pub fn for_function(file: &Path, name: &str) -> Self {
        Self(format!("{}#{name}", file.display()))
    }

    /// Builds a node id for a class member.
    ///
    /// `separator` is `.` for static members/constructors and `::` for instance members.
    pub fn for_member(file: &Path, class: &str, member: &str, is_static: bool) -> Self {
        let sep = if is_static { "." } else { "::" };
        Self(format!("{}#{class}{sep}{member}", file.display()))
    }

    /// Builds a node id for a class accessor (`get:`/`set:` prefix on the member name).
    pub fn for_accessor(file: &Path, class: &str, prop: &str, is_setter: bool, is_static: bool) -> Self {
        let sep = if is_static { "." } else { "::" };
        let kind = if is_setter { "set" } else { "get" };
        Self(format!("{}#{class}{sep}{kind}:{prop}", file.display()))
    }

    /// Builds a node id for an anonymous declaration, keyed by its first token's byte offset.
    pub fn for_anonymous(file: &Path, byte_offset: u32) -> Self {
        Self(format!("{}@{byte_offset}", file.display()))
    }

    /// Wraps an already-formatted id string (used when deserializing or re-parsing).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// A function-like declaration's variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Function,
    Method,
    Arrow,
    FunctionExpression,
    Constructor,
    Getter,
    Setter,
}

impl NodeKind {
    /// Methods, constructors and accessors must carry an owning class.
    pub fn requires_owning_class(self) -> bool {
        matches!(
            self,
            NodeKind::Method | NodeKind::Constructor | NodeKind::Getter | NodeKind::Setter
        )
    }
}

/// Visibility of a class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_string: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// A function-like declaration reachable from the entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub file_path: PathBuf,
    pub line: u32,
    pub column: u32,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owning_class: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
}

impl Node {
    /// Checks the invariant that kind, owning-class presence, and name suffix agree.
    pub fn is_self_consistent(&self) -> bool {
        self.kind.requires_owning_class() == self.owning_class.is_some()
    }
}

/// The kind of call a resolved edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Sync,
    Async,
    Callback,
    Constructor,
}

/// A resolved call site between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub line: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
}

/// Generation metadata carried alongside the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub generated_at: String,
    pub entry_point: String,
    pub max_depth: u32,
    pub project_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_config_path: Option<PathBuf>,
    pub total_files_seen: usize,
    pub analysis_duration_ms: u64,
    /// Set when the parallel driver could not re-target every bare-name edge
    /// (see the Open Question on whole-project mode's approximation).
    #[serde(default)]
    pub approximate: bool,
}

/// The neutral, in-memory call graph. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraph {
    pub metadata: GraphMetadata,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub entry_point_id: NodeId,
}

/// Errors raised by the graph model's own invariant checks and JSON projection.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("entry point id `{0}` does not match any node in the graph")]
    DanglingEntryPoint(NodeId),
    #[error("edge `{edge}` references unknown node id `{node}`")]
    DanglingEdgeEndpoint { edge: String, node: NodeId },
    #[error("node id `{0}` appears more than once in the graph")]
    DuplicateNodeId(NodeId),
    #[error("failed to serialize call graph: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse call graph: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl CallGraph {
    /// Validates the structural invariants from the data model: unique node ids,
    /// edges referencing known endpoints, and a present entry point.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut seen = rustc_hash::FxHashSet::default();
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
        }
        if !seen.contains(&self.entry_point_id) {
            return Err(GraphError::DanglingEntryPoint(self.entry_point_id.clone()));
        }
        for edge in &self.edges {
            if !seen.contains(&edge.source) {
                return Err(GraphError::DanglingEdgeEndpoint {
                    edge: edge.id.clone(),
                    node: edge.source.clone(),
                });
            }
            if !seen.contains(&edge.target) {
                return Err(GraphError::DanglingEdgeEndpoint {
                    edge: edge.id.clone(),
                    node: edge.target.clone(),
                });
            }
        }
        Ok(())
    }

    /// Projects the graph to the `serde_json::Value` shape documented in the
    /// external interfaces: top-level keys `metadata`, `nodes`, `edges`, `entryPointId`.
    pub fn to_json_value(&self) -> Result<serde_json::Value, GraphError> {
        serde_json::to_value(self).map_err(GraphError::Serialize)
    }

    /// Parses a graph back from its JSON projection. Unknown fields are ignored;
    /// every optional field defaults when absent.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, GraphError> {
        serde_json::from_value(value).map_err(GraphError::Deserialize)
    }
}
