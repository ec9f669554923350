use crate::document::FlowDocument;
use crate::graph::{FlowEdge, FlowNode, GraphStore, NodeKind, INPUT_PORT};
use serde_json::{json, Value};
use tracing::warn;

/// Rebuild a live graph from a persisted document. Total: malformed pieces
/// degrade per node/edge instead of aborting the load.
///
/// Persisted ids are preserved verbatim (edges reference them) and the
/// store's id counter is bumped past them so fresh ids never collide.
pub fn deserialize_document(document: &FlowDocument) -> GraphStore {
    let mut store = GraphStore::empty();

    for node in &document.nodes {
        let config = parse_config(&node.data.config);
        let kind = NodeKind::from_wire(&node.node_type, &config);
        store.insert_node(FlowNode::new(node.id.clone(), kind, node.position));
    }

    for edge in &document.edges {
        // Endpoints resolve against the live nodes just created. A dangling
        // reference in a corrupted document keeps the raw persisted id: a
        // visibly broken edge beats a silently missing one.
        let source = match store.node(&edge.source_node_id) {
            Some(live) => live.id.clone(),
            None => {
                warn!(edge_id = %edge.id, source = %edge.source_node_id, "edge source not in document, keeping raw id");
                edge.source_node_id.clone()
            }
        };
        let target = match store.node(&edge.target_node_id) {
            Some(live) => live.id.clone(),
            None => {
                warn!(edge_id = %edge.id, target = %edge.target_node_id, "edge target not in document, keeping raw id");
                edge.target_node_id.clone()
            }
        };
        store.insert_edge(FlowEdge {
            id: edge.id.clone(),
            source,
            target,
            // Handles carry through unchanged so button routing survives
            // the reload.
            source_port: edge.source_handle.clone(),
            target_port: if edge.target_handle.is_empty() {
                INPUT_PORT.to_string()
            } else {
                edge.target_handle.clone()
            },
        });
    }

    store
}

/// Older documents stored `data.config` as a JSON string rather than an
/// object. Unparsable payloads fall back to an empty config for that node.
pub(crate) fn parse_config(raw: &Value) -> Value {
    match raw {
        Value::String(encoded) => serde_json::from_str(encoded).unwrap_or_else(|err| {
            warn!(%err, "unparsable string-encoded node config, using empty config");
            json!({})
        }),
        Value::Null => json!({}),
        other => other.clone(),
    }
}
