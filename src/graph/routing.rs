use crate::graph::edge::FlowEdge;
use std::collections::BTreeMap;

/// Derive, for one template block, which node each button leads to.
///
/// Scans every edge leaving `node_id` through a `button-<index>` port and
/// records `index -> target`. Total by construction: duplicate button ports
/// resolve last-wins in edge iteration order, and buttons with no edge are
/// simply absent from the map (the runtime ends the flow on that branch).
pub fn compile_button_routing(node_id: &str, edges: &[FlowEdge]) -> BTreeMap<u32, String> {
    let mut routing = BTreeMap::new();
    for edge in edges.iter().filter(|e| e.source == node_id) {
        if let Some(index) = edge.button_index() {
            routing.insert(index, edge.target.clone());
        }
    }
    routing
}
