//! Validates the exact external JSON contract (top-level keys `metadata`,
//! `nodes`, `edges`, `entryPointId`; required per-node/per-edge keys) on top
//! of the derive-based projection in [`crate::graph`], so a formatter that
//! hand-builds a JSON value (rather than going through `CallGraph`) can be
//! checked against the same contract.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("expected a JSON object at the top level")]
    NotAnObject,
    #[error("missing required top-level key `{0}`")]
    MissingKey(&'static str),
    #[error("`nodes` must be an array")]
    NodesNotArray,
    #[error("`edges` must be an array")]
    EdgesNotArray,
    #[error("node at index {index} is missing required key `{key}`")]
    NodeMissingKey { index: usize, key: &'static str },
    #[error("edge at index {index} is missing required key `{key}`")]
    EdgeMissingKey { index: usize, key: &'static str },
}

const REQUIRED_NODE_KEYS: [&str; 6] = ["id", "name", "type", "filePath", "line", "async"];
const REQUIRED_EDGE_KEYS: [&str; 5] = ["id", "source", "target", "type", "line"];

/// Checks that `value` satisfies the §6 graph-serialization contract:
/// top-level `metadata`/`nodes`/`edges`/`entryPointId`, and the required
/// fields on every node and edge. Does not check field *types* beyond
/// presence — a formatter consuming valid Rust-side data never violates those.
pub fn validate(value: &Value) -> Result<(), ValidationError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

    for key in ["metadata", "nodes", "edges", "entryPointId"] {
        if !obj.contains_key(key) {
            return Err(ValidationError::MissingKey(match key {
                "metadata" => "metadata",
                "nodes" => "nodes",
                "edges" => "edges",
                _ => "entryPointId",
            }));
        }
    }

    let nodes = obj["nodes"].as_array().ok_or(ValidationError::NodesNotArray)?;
    for (index, node) in nodes.iter().enumerate() {
        let node_obj = node.as_object();
        for key in REQUIRED_NODE_KEYS {
            let present = node_obj.map(|o| o.contains_key(key)).unwrap_or(false);
            if !present {
                return Err(ValidationError::NodeMissingKey { index, key });
            }
        }
    }

    let edges = obj["edges"].as_array().ok_or(ValidationError::EdgesNotArray)?;
    for (index, edge) in edges.iter().enumerate() {
        let edge_obj = edge.as_object();
        for key in REQUIRED_EDGE_KEYS {
            let present = edge_obj.map(|o| o.contains_key(key)).unwrap_or(false);
            if !present {
                return Err(ValidationError::EdgeMissingKey { index, key });
            }
        }
    }

    Ok(())
}
