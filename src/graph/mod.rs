pub mod edge;
pub mod node;
pub mod routing;
pub mod store;


pub use edge::{button_port, parse_button_port, FlowEdge, INPUT_PORT};
pub use node::{
    FlowNode, MessageConfig, NodeKind, Position, TagConfig, TemplateButton, TemplateConfig,
    WaitConfig, DEFAULT_START_POSITION,
};
pub use routing::compile_button_routing;
pub use store::{DeleteOutcome, GraphStore};
