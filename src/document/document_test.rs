use crate::document::{
    deserialize_document, serialize_graph, validate_document, DocumentEdge, DocumentNode,
    FlowDocument, FlowMeta, NodeData, Severity, DEFAULT_FLOW_NAME,
};
use crate::graph::{
    button_port, GraphStore, MessageConfig, NodeKind, Position, TemplateButton, TemplateConfig,
    WaitConfig,
};
use serde_json::{json, Value};

fn pos() -> Position {
    Position::new(10.0, 20.0)
}

fn sample_graph() -> (GraphStore, String, String, String) {
    let mut store = GraphStore::new();
    let start = store.start_node().unwrap().id.clone();
    let tpl = store.add_node(
        NodeKind::Template(TemplateConfig {
            template_name: "order_update".to_string(),
            body: "Your order shipped".to_string(),
            buttons: vec![
                TemplateButton { index: 0, text: "Track".to_string() },
                TemplateButton { index: 1, text: "Cancel".to_string() },
            ],
            ..Default::default()
        }),
        pos(),
    );
    let msg = store.add_node(
        NodeKind::Message(MessageConfig { body: "Here is your tracking link".to_string() }),
        pos(),
    );
    store.connect(&start, &tpl, None);
    store.connect(&tpl, &msg, Some(button_port(0)));
    (store, start, tpl, msg)
}

#[test]
fn serialize_emits_wire_shape_with_compiled_routing() {
    let (store, _start, tpl, msg) = sample_graph();
    let meta = FlowMeta { name: "Order flow".to_string(), trigger_keyword: "order".to_string() };
    let doc = serialize_graph(&store, &meta);

    assert_eq!(doc.name, "Order flow");
    assert_eq!(doc.trigger_keyword, "order");
    assert_eq!(doc.nodes.len(), 3);
    assert_eq!(doc.edges.len(), 2);

    let tpl_node = doc.nodes.iter().find(|n| n.id == tpl).unwrap();
    assert_eq!(tpl_node.node_type, "template");
    let map = tpl_node
        .data
        .config
        .get("buttonToNextMap")
        .expect("compiled routing present");
    assert_eq!(map.get("0"), Some(&Value::String(msg.clone())));
    assert!(map.get("1").is_none(), "unrouted button stays absent");

    let button_edge = doc.edges.iter().find(|e| e.source_handle.is_some()).unwrap();
    assert_eq!(button_edge.source_handle.as_deref(), Some("button-0"));
    assert_eq!(button_edge.target_handle, "input");
    assert_eq!(button_edge.source_node_id, tpl);
    assert_eq!(button_edge.target_node_id, msg);
}

#[test]
fn serialize_falls_back_on_blank_metadata() {
    let store = GraphStore::new();
    let doc = serialize_graph(&store, &FlowMeta { name: "  ".to_string(), trigger_keyword: String::new() });
    assert_eq!(doc.name, DEFAULT_FLOW_NAME);
    assert_eq!(doc.trigger_keyword, "");
}

#[test]
fn serialize_leaves_the_store_untouched() {
    let (store, ..) = sample_graph();
    let before = store.clone();
    let _ = serialize_graph(&store, &FlowMeta::default());
    assert_eq!(before.nodes(), store.nodes());
    assert_eq!(before.edges(), store.edges());
}

#[test]
fn round_trip_preserves_ids_kinds_configs_and_connectivity() {
    let (store, ..) = sample_graph();
    let meta = FlowMeta { name: "rt".to_string(), trigger_keyword: "go".to_string() };
    let doc = serialize_graph(&store, &meta);
    let reloaded = deserialize_document(&doc);

    assert_eq!(reloaded.nodes().len(), store.nodes().len());
    for original in store.nodes() {
        let live = reloaded.node(&original.id).expect("id preserved");
        assert_eq!(live.position, original.position);
        match (&original.kind, &live.kind) {
            // the routing map is derivable, everything else must match
            (NodeKind::Template(a), NodeKind::Template(b)) => {
                assert_eq!(a.template_name, b.template_name);
                assert_eq!(a.body, b.body);
                assert_eq!(a.buttons, b.buttons);
            }
            (a, b) => assert_eq!(a, b),
        }
    }

    assert_eq!(reloaded.edges().len(), store.edges().len());
    for original in store.edges() {
        let live = reloaded.edges().iter().find(|e| e.id == original.id).unwrap();
        assert_eq!(live.source, original.source);
        assert_eq!(live.target, original.target);
        assert_eq!(live.source_port, original.source_port);
        assert_eq!(live.target_port, original.target_port);
    }
}

#[test]
fn template_flow_survives_save_and_reload() {
    // seeded start at (100,100), template with two buttons, button-0 routed
    let (store, ..) = sample_graph();
    let doc = serialize_graph(&store, &FlowMeta::default());
    let reloaded = deserialize_document(&doc);

    assert_eq!(reloaded.nodes().len(), 3);
    assert_eq!(reloaded.edges().len(), 2);
    let button_edge = reloaded
        .edges()
        .iter()
        .find(|e| e.source_port.is_some())
        .unwrap();
    assert_eq!(button_edge.source_port.as_deref(), Some("button-0"));
}

#[test]
fn loaded_ids_never_collide_with_fresh_ones() {
    let (store, ..) = sample_graph();
    let doc = serialize_graph(&store, &FlowMeta::default());
    let mut reloaded = deserialize_document(&doc);

    let existing: Vec<String> = reloaded.nodes().iter().map(|n| n.id.clone()).collect();
    let fresh = reloaded.add_node(NodeKind::Wait(WaitConfig::default()), pos());
    assert!(!existing.contains(&fresh));
    let fresh_edge = reloaded.connect(&existing[0], &fresh, None).unwrap();
    assert!(reloaded.edges().iter().filter(|e| e.id == fresh_edge).count() == 1);
}

fn doc_node(id: &str, node_type: &str, config: Value) -> DocumentNode {
    DocumentNode {
        id: id.to_string(),
        node_type: node_type.to_string(),
        position: pos(),
        data: NodeData { label: node_type.to_string(), config },
    }
}

fn doc_edge(id: &str, source: &str, target: &str, handle: Option<&str>) -> DocumentEdge {
    DocumentEdge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
        source_node_id: source.to_string(),
        target_node_id: target.to_string(),
        source_handle: handle.map(str::to_string),
        target_handle: "input".to_string(),
    }
}

#[test]
fn string_encoded_config_is_parsed() {
    let doc = FlowDocument {
        name: "legacy".to_string(),
        trigger_keyword: String::new(),
        nodes: vec![doc_node(
            "node-1",
            "message",
            Value::String(r#"{"body":"hi there"}"#.to_string()),
        )],
        edges: vec![],
    };
    let store = deserialize_document(&doc);
    assert_eq!(
        store.node("node-1").unwrap().kind,
        NodeKind::Message(MessageConfig { body: "hi there".to_string() })
    );
}

#[test]
fn unparsable_config_degrades_to_default_not_abort() {
    let doc = FlowDocument {
        name: "corrupt".to_string(),
        trigger_keyword: String::new(),
        nodes: vec![
            doc_node("node-1", "start", json!({})),
            doc_node("node-2", "message", Value::String("{not json".to_string())),
        ],
        edges: vec![],
    };
    let store = deserialize_document(&doc);
    assert_eq!(store.nodes().len(), 2);
    assert_eq!(
        store.node("node-2").unwrap().kind,
        NodeKind::Message(MessageConfig::default())
    );
}

#[test]
fn wait_seconds_below_one_clamp_on_load() {
    let doc = FlowDocument {
        name: "legacy".to_string(),
        trigger_keyword: String::new(),
        nodes: vec![
            doc_node("node-1", "start", json!({})),
            doc_node("node-2", "wait", json!({"seconds": 0})),
        ],
        edges: vec![],
    };
    let store = deserialize_document(&doc);
    assert_eq!(
        store.node("node-2").unwrap().kind,
        NodeKind::Wait(WaitConfig { seconds: 1 })
    );

    // re-saving persists the clamped value, not the invalid one
    let resaved = serialize_graph(&store, &FlowMeta::default());
    let wait = resaved.nodes.iter().find(|n| n.id == "node-2").unwrap();
    assert_eq!(wait.data.config["seconds"], json!(1));
}

#[test]
fn validate_reads_string_encoded_wait_configs() {
    let doc = FlowDocument {
        name: "legacy".to_string(),
        trigger_keyword: String::new(),
        nodes: vec![
            doc_node("node-1", "start", json!({})),
            doc_node(
                "node-2",
                "wait",
                Value::String(r#"{"seconds":5}"#.to_string()),
            ),
        ],
        edges: vec![doc_edge("edge-1", "node-1", "node-2", None)],
    };
    assert!(validate_document(&doc).is_empty());
}

#[test]
fn dangling_edge_references_keep_the_raw_id() {
    let doc = FlowDocument {
        name: "broken".to_string(),
        trigger_keyword: String::new(),
        nodes: vec![doc_node("node-1", "start", json!({}))],
        edges: vec![doc_edge("edge-1", "node-1", "node-ghost", None)],
    };
    let store = deserialize_document(&doc);
    // visibly broken rather than silently dropped
    assert_eq!(store.edges().len(), 1);
    assert_eq!(store.edges()[0].target, "node-ghost");
}

#[test]
fn validate_flags_structural_problems() {
    let doc = FlowDocument {
        name: "bad".to_string(),
        trigger_keyword: String::new(),
        nodes: vec![
            doc_node("node-1", "start", json!({})),
            doc_node("node-1", "message", json!({"body": "dup id"})),
            doc_node("node-3", "wait", json!({"seconds": 0})),
        ],
        edges: vec![
            doc_edge("edge-1", "node-1", "node-404", None),
            doc_edge("edge-2", "node-1", "node-3", Some("button-0")),
            doc_edge("edge-2", "node-1", "node-3", Some("button-0")),
        ],
    };
    let issues = validate_document(&doc);
    let errors: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Error).collect();
    let warnings: Vec<_> = issues.iter().filter(|i| i.severity == Severity::Warning).collect();

    assert!(errors.iter().any(|i| i.message.contains("duplicate node id")));
    assert!(errors.iter().any(|i| i.message.contains("duplicate edge id")));
    assert!(errors.iter().any(|i| i.message.contains("missing node `node-404`")));
    assert!(errors.iter().any(|i| i.message.contains("at least 1 second")));
    assert!(warnings.iter().any(|i| i.message.contains("last one wins")));
}

#[test]
fn validate_warns_on_unreachable_nodes() {
    let (store, ..) = sample_graph();
    let mut doc = serialize_graph(&store, &FlowMeta::default());
    assert!(validate_document(&doc).is_empty());

    doc.nodes.push(doc_node("node-99", "message", json!({"body": "island"})));
    let issues = validate_document(&doc);
    assert!(issues
        .iter()
        .any(|i| i.severity == Severity::Warning && i.message.contains("node-99")));
}

#[test]
fn wire_field_names_are_camel_case() {
    let (store, ..) = sample_graph();
    let doc = serialize_graph(&store, &FlowMeta { name: "n".to_string(), trigger_keyword: "k".to_string() });
    let value = serde_json::to_value(&doc).unwrap();

    assert!(value.get("triggerKeyword").is_some());
    let edge = &value["edges"].as_array().unwrap()[0];
    assert!(edge.get("sourceNodeId").is_some());
    assert!(edge.get("targetNodeId").is_some());
    assert!(edge.get("targetHandle").is_some());
    let node = &value["nodes"].as_array().unwrap()[0];
    assert!(node.get("type").is_some());
    assert!(node["data"].get("label").is_some());
}
