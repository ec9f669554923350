use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Every node except `start` has exactly one input port, named this.
pub const INPUT_PORT: &str = "input";

const BUTTON_PORT_PREFIX: &str = "button-";

/// Output port name for button `index` of a template block.
pub fn button_port(index: u32) -> String {
    format!("{BUTTON_PORT_PREFIX}{index}")
}

/// Parse a `button-<index>` port name back into the button index.
/// Generic output ports (and anything else) yield `None`.
pub fn parse_button_port(port: &str) -> Option<u32> {
    port.strip_prefix(BUTTON_PORT_PREFIX)?.parse().ok()
}

/// A directed connection between two blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// `None` for the generic output; `button-<index>` on template blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<String>,
    pub target_port: String,
}

impl FlowEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        source_port: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_port,
            target_port: INPUT_PORT.to_string(),
        }
    }

    /// True if this edge leaves through a template button port.
    pub fn button_index(&self) -> Option<u32> {
        self.source_port.as_deref().and_then(parse_button_port)
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
