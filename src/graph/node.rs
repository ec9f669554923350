use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Canvas coordinate of a node. Layout only, no behavioural meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where the seeded start node lands on a fresh canvas.
pub const DEFAULT_START_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// One button of a WhatsApp template, in the order the template declares them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateButton {
    pub index: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MessageConfig {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    #[serde(default)]
    pub template_name: String,
    /// Resolved template body, cached at edit time for preview.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub buttons: Vec<TemplateButton>,
    /// Compiled at save time from the button edges; the runtime consumes
    /// this instead of re-deriving it.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub button_to_next_map: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WaitConfig {
    pub seconds: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self { seconds: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TagConfig {
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The closed set of block kinds the canvas knows, each with its own
/// strongly-typed config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "config", rename_all = "lowercase")]
pub enum NodeKind {
    Start,
    Message(MessageConfig),
    Template(TemplateConfig),
    Wait(WaitConfig),
    Tag(TagConfig),
}

impl NodeKind {
    /// The `type` string a persisted flow document carries for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Message(_) => "message",
            NodeKind::Template(_) => "template",
            NodeKind::Wait(_) => "wait",
            NodeKind::Tag(_) => "tag",
        }
    }

    /// Human label shown on the block and stored in `data.label`.
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Message(_) => "Message",
            NodeKind::Template(_) => "Template",
            NodeKind::Wait(_) => "Wait",
            NodeKind::Tag(_) => "Tag",
        }
    }

    /// Default/empty config for a freshly dropped block of `type_name`.
    /// Unknown type strings fall back to a message block so a corrupted
    /// document still loads.
    pub fn default_for(type_name: &str) -> Self {
        match type_name {
            "start" => NodeKind::Start,
            "template" => NodeKind::Template(TemplateConfig::default()),
            "wait" => NodeKind::Wait(WaitConfig::default()),
            "tag" => NodeKind::Tag(TagConfig::default()),
            _ => NodeKind::Message(MessageConfig::default()),
        }
    }

    /// The bare config object persisted under `data.config`.
    pub fn config_value(&self) -> Value {
        match self {
            NodeKind::Start => json!({}),
            NodeKind::Message(cfg) => serde_json::to_value(cfg).unwrap_or_else(|_| json!({})),
            NodeKind::Template(cfg) => serde_json::to_value(cfg).unwrap_or_else(|_| json!({})),
            NodeKind::Wait(cfg) => serde_json::to_value(cfg).unwrap_or_else(|_| json!({})),
            NodeKind::Tag(cfg) => serde_json::to_value(cfg).unwrap_or_else(|_| json!({})),
        }
    }

    /// Rebuild a kind from the persisted `type` string plus its config
    /// payload. An unparsable config degrades to the kind's default rather
    /// than failing the whole load.
    pub fn from_wire(type_name: &str, config: &Value) -> Self {
        match type_name {
            "start" => NodeKind::Start,
            "message" => NodeKind::Message(
                serde_json::from_value(config.clone()).unwrap_or_default(),
            ),
            "template" => NodeKind::Template(
                serde_json::from_value(config.clone()).unwrap_or_default(),
            ),
            "wait" => {
                let mut cfg: WaitConfig =
                    serde_json::from_value(config.clone()).unwrap_or_default();
                // older documents may carry 0; the model requires ≥ 1
                cfg.seconds = cfg.seconds.max(1);
                NodeKind::Wait(cfg)
            }
            "tag" => NodeKind::Tag(serde_json::from_value(config.clone()).unwrap_or_default()),
            other => {
                tracing::warn!("unknown node type `{}` in document, treating as message", other);
                NodeKind::Message(serde_json::from_value(config.clone()).unwrap_or_default())
            }
        }
    }

    /// Buttons of a template block; empty for every other kind.
    pub fn buttons(&self) -> &[TemplateButton] {
        match self {
            NodeKind::Template(cfg) => &cfg.buttons,
            _ => &[],
        }
    }
}

/// One block on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowNode {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub position: Position,
}

impl FlowNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, NodeKind::Start)
    }
}
