use crate::document::{DocumentEdge, DocumentNode, FlowDocument, NodeData, DEFAULT_FLOW_NAME};
use crate::graph::{compile_button_routing, GraphStore, NodeKind, INPUT_PORT};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Editor-level metadata persisted alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowMeta {
    pub name: String,
    pub trigger_keyword: String,
}

/// Build the persisted document for the current graph. Pure with respect to
/// the editor state: the document is assembled fully in memory and the store
/// is left untouched, so a failed save upload changes nothing.
pub fn serialize_graph(store: &GraphStore, meta: &FlowMeta) -> FlowDocument {
    let name = if meta.name.trim().is_empty() {
        DEFAULT_FLOW_NAME.to_string()
    } else {
        meta.name.clone()
    };

    let nodes = store
        .nodes()
        .iter()
        .map(|node| {
            let config = match &node.kind {
                // Template configs additionally carry the compiled button
                // routing so the runtime does not re-derive it.
                NodeKind::Template(cfg) => {
                    let mut compiled = cfg.clone();
                    compiled.button_to_next_map = compile_button_routing(&node.id, store.edges());
                    serde_json::to_value(&compiled).unwrap_or_else(|_| json!({}))
                }
                other => other.config_value(),
            };
            DocumentNode {
                id: node.id.clone(),
                node_type: node.kind.type_name().to_string(),
                position: node.position,
                data: NodeData {
                    label: node.kind.display_name().to_string(),
                    config,
                },
            }
        })
        .collect();

    let edges = store
        .edges()
        .iter()
        .map(|edge| {
            // Resolved through the current node map so a future internal id
            // renumbering cannot desync the persisted references.
            let source_node_id = store
                .node(&edge.source)
                .map(|n| n.id.clone())
                .unwrap_or_else(|| edge.source.clone());
            let target_node_id = store
                .node(&edge.target)
                .map(|n| n.id.clone())
                .unwrap_or_else(|| edge.target.clone());
            DocumentEdge {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                source_node_id,
                target_node_id,
                source_handle: edge.source_port.clone(),
                target_handle: if edge.target_port.is_empty() {
                    INPUT_PORT.to_string()
                } else {
                    edge.target_port.clone()
                },
            }
        })
        .collect();

    let document = FlowDocument {
        name,
        trigger_keyword: meta.trigger_keyword.clone(),
        nodes,
        edges,
    };
    debug!(
        nodes = document.nodes.len(),
        edges = document.edges.len(),
        name = %document.name,
        "serialized flow document"
    );
    document
}
