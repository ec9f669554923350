//! replyflow — the flow graph editor core behind the visual auto-reply
//! builder for WhatsApp business accounts.
//!
//! The operator drags typed blocks onto a canvas, wires them together and
//! saves the result as a flow document; a separate runtime executes that
//! document against inbound messages. This crate owns the live node/edge
//! graph, the edit operations that keep it consistent, the per-button
//! routing compiler for template blocks, and the bidirectional mapping
//! between the editable graph and its persisted shape.

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod graph;
pub mod logger;
pub mod notice;
pub mod render;
pub mod service;
pub mod session;

pub use document::{deserialize_document, serialize_graph, FlowDocument, FlowMeta};
pub use error::{ServiceError, SessionError};
pub use graph::{compile_button_routing, FlowEdge, FlowNode, GraphStore, NodeKind};
pub use notice::{Notice, NoticeLevel};
pub use session::EditorSession;
