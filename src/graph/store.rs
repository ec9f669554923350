use crate::graph::edge::FlowEdge;
use crate::graph::node::{FlowNode, NodeKind, Position, DEFAULT_START_POSITION};
use tracing::{debug, warn};

/// Outcome of a `delete_node` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Node and every touching edge are gone.
    Deleted,
    /// The node is the flow's entry point; nothing was mutated. The caller
    /// must resolve the pending state with `confirm_delete` or `cancel_delete`.
    ConfirmationRequired,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum PendingDelete {
    #[default]
    Idle,
    Pending(String),
}

/// Single source of truth for the graph under edit. Exclusively owned by the
/// editing session; every other component reads through it and writes through
/// its operations, so the invariants only need to hold here.
#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    next_id: u64,
    pending_delete: PendingDelete,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// A fresh canvas: empty except for the seeded start node.
    pub fn new() -> Self {
        let mut store = Self::empty();
        store.add_node(NodeKind::Start, DEFAULT_START_POSITION);
        store
    }

    /// Truly empty store, used by the deserializer which brings its own
    /// nodes (including the persisted start node).
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_id: 1,
            pending_delete: PendingDelete::Idle,
        }
    }

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn node(&self, node_id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Returns the node for opening the configuration editor.
    pub fn select(&self, node_id: &str) -> Option<&FlowNode> {
        self.node(node_id)
    }

    pub fn start_node(&self) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.is_start())
    }

    /// Drop a new block on the canvas. Ids are generated from a counter
    /// scoped to this store, so they never collide within a session; the
    /// deserializer bumps the counter past every loaded id.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> String {
        let id = self.fresh_id("node");
        debug!(node_id = %id, kind = kind.type_name(), "add node");
        self.nodes.push(FlowNode::new(id.clone(), kind, position));
        id
    }

    /// Wholesale config replacement, written by the configuration editor on
    /// explicit save. Unknown ids are a silent no-op.
    pub fn update_node_config(&mut self, node_id: &str, kind: NodeKind) {
        match self.nodes.iter_mut().find(|n| n.id == node_id) {
            Some(node) => node.kind = kind,
            None => warn!(node_id, "update_node_config on unknown node, ignoring"),
        }
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) {
            node.position = position;
        }
    }

    /// Wire `source` to `target`, optionally through a named output port
    /// (`button-<index>` on template blocks). Returns the new edge id, or
    /// `None` when either endpoint does not exist. Parallel edges and
    /// self-loops are not rejected here.
    pub fn connect(
        &mut self,
        source_id: &str,
        target_id: &str,
        source_port: Option<String>,
    ) -> Option<String> {
        if self.node(source_id).is_none() || self.node(target_id).is_none() {
            warn!(source_id, target_id, "connect with missing endpoint, ignoring");
            return None;
        }
        let id = self.fresh_id("edge");
        debug!(edge_id = %id, source_id, target_id, ?source_port, "connect");
        self.edges
            .push(FlowEdge::new(id.clone(), source_id, target_id, source_port));
        Some(id)
    }

    /// Remove exactly one edge by id; no-op when not found.
    pub fn disconnect(&mut self, edge_id: &str) {
        self.edges.retain(|e| e.id != edge_id);
    }

    /// Delete a block. The start node is the flow's unique entry point, so it
    /// is never removed silently: the first call parks the request and the
    /// caller has to `confirm_delete` before anything happens.
    pub fn delete_node(&mut self, node_id: &str) -> DeleteOutcome {
        let Some(node) = self.node(node_id) else {
            return DeleteOutcome::NotFound;
        };
        if node.is_start() {
            self.pending_delete = PendingDelete::Pending(node_id.to_string());
            return DeleteOutcome::ConfirmationRequired;
        }
        self.remove_node_cascading(node_id);
        DeleteOutcome::Deleted
    }

    /// Resolve a parked start-node deletion by actually performing it.
    pub fn confirm_delete(&mut self) {
        if let PendingDelete::Pending(node_id) = std::mem::take(&mut self.pending_delete) {
            self.remove_node_cascading(&node_id);
        }
    }

    /// Abandon a parked start-node deletion without touching the graph.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = PendingDelete::Idle;
    }

    /// Node id of a parked deletion, if one is waiting on the operator.
    pub fn pending_delete(&self) -> Option<&str> {
        match &self.pending_delete {
            PendingDelete::Pending(id) => Some(id),
            PendingDelete::Idle => None,
        }
    }

    /// Used by the deserializer: insert a node under its persisted id.
    pub(crate) fn insert_node(&mut self, node: FlowNode) {
        self.bump_past(&node.id);
        self.nodes.push(node);
    }

    /// Used by the deserializer: insert an edge under its persisted id.
    pub(crate) fn insert_edge(&mut self, edge: FlowEdge) {
        self.bump_past(&edge.id);
        self.edges.push(edge);
    }

    fn remove_node_cascading(&mut self, node_id: &str) {
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(node_id));
        self.nodes.retain(|n| n.id != node_id);
        debug!(
            node_id,
            removed_edges = before - self.edges.len(),
            "delete node"
        );
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Keep the counter ahead of any numeric suffix seen in loaded ids so a
    /// later `add_node`/`connect` can never collide with a persisted id.
    fn bump_past(&mut self, id: &str) {
        if let Some(n) = id.rsplit('-').next().and_then(|s| s.parse::<u64>().ok()) {
            if n >= self.next_id {
                self.next_id = n + 1;
            }
        }
    }
}
