//! The persisted flow document: the wire/storage shape owned by the flow
//! storage service, plus the bidirectional mapping to the live graph.

pub mod deserialize;
pub mod serialize;
pub mod validate;

#[cfg(test)]
mod document_test;

use crate::graph::Position;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use deserialize::deserialize_document;
pub use serialize::{serialize_graph, FlowMeta};
pub use validate::{validate_document, Severity, ValidationIssue};

/// Fallback flow name when the operator leaves it blank; saving never fails
/// over missing metadata.
pub const DEFAULT_FLOW_NAME: &str = "Untitled Flow";

/// A persisted flow, bit-compatible across save and load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    pub name: String,
    #[serde(default)]
    pub trigger_keyword: String,
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<DocumentEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NodeData {
    pub label: String,
    /// Variant-specific config. Kept as a raw value because older documents
    /// carry it string-encoded; the deserializer handles both.
    #[serde(default)]
    pub config: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_node_id: String,
    pub target_node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    pub target_handle: String,
}
