use crate::graph::{button_port, FlowNode, NodeKind, Position};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One output attachment point on a block. Port ids are the edge
/// `source_port` values, so they must stay stable across re-renders: the
/// button-routing compiler keys off them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PortView {
    /// `None` is the generic output port; `Some("button-<i>")` on templates.
    pub id: Option<String>,
    pub label: String,
}

/// Presentation model for one block. Derived fresh from the store on every
/// render, carries no state of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockView {
    pub node_id: String,
    pub title: String,
    pub summary: String,
    pub position: Position,
    pub has_input: bool,
    pub output_ports: Vec<PortView>,
}

/// User intents a block emits; the editing session applies them to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockIntent {
    OpenEditor { node_id: String },
    Delete { node_id: String },
    Connect {
        source_id: String,
        target_id: String,
        source_port: Option<String>,
    },
    Disconnect { edge_id: String },
}

/// Build the view for one block. Template blocks get one labeled output port
/// per button of the currently selected template (zero before a template is
/// chosen); every other kind gets the single generic output.
pub fn render_block(node: &FlowNode) -> BlockView {
    let output_ports = match &node.kind {
        NodeKind::Template(cfg) => cfg
            .buttons
            .iter()
            .map(|b| PortView {
                id: Some(button_port(b.index)),
                label: b.text.clone(),
            })
            .collect(),
        _ => vec![PortView {
            id: None,
            label: "next".to_string(),
        }],
    };
    BlockView {
        node_id: node.id.clone(),
        title: node.kind.display_name().to_string(),
        summary: summarize(&node.kind),
        position: node.position,
        has_input: !node.is_start(),
        output_ports,
    }
}

/// Views for a whole graph, in store order.
pub fn render_all(nodes: &[FlowNode]) -> Vec<BlockView> {
    nodes.iter().map(render_block).collect()
}

fn summarize(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Start => "Incoming message".to_string(),
        NodeKind::Message(cfg) => preview(&cfg.body, 60),
        NodeKind::Template(cfg) => {
            if cfg.template_name.is_empty() {
                "No template selected".to_string()
            } else {
                format!("{} ({} buttons)", cfg.template_name, cfg.buttons.len())
            }
        }
        NodeKind::Wait(cfg) => format!("Wait {}s", cfg.seconds),
        NodeKind::Tag(cfg) => cfg.tags.join(", "),
    }
}

fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}
