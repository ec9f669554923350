use replyflow::document::{deserialize_document, serialize_graph, FlowDocument, FlowMeta};
use replyflow::error::{ServiceError, SessionError};
use replyflow::graph::{button_port, MessageConfig, NodeKind, Position, TemplateButton, TemplateConfig};
use replyflow::render::BlockIntent;
use replyflow::service::{
    FlowStorageType, FlowSummary, MemoryFlowStorage, MemoryTemplateCatalog, TemplateDetail,
};
use replyflow::session::EditorSession;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Storage whose calls never resolve, standing in for a hung service.
#[derive(Debug)]
struct StalledFlowStorage;

#[async_trait::async_trait]
impl FlowStorageType for StalledFlowStorage {
    async fn save(&self, _document: &FlowDocument) -> Result<String, ServiceError> {
        std::future::pending().await
    }

    async fn load_by_id(&self, _flow_id: &str) -> Result<FlowDocument, ServiceError> {
        std::future::pending().await
    }

    async fn list_by_business(&self, _business_id: &str) -> Result<Vec<FlowSummary>, ServiceError> {
        std::future::pending().await
    }

    async fn rename(&self, _flow_id: &str, _new_name: &str) -> Result<(), ServiceError> {
        std::future::pending().await
    }

    async fn remove(&self, _flow_id: &str) -> Result<(), ServiceError> {
        std::future::pending().await
    }
}

fn services() -> (
    std::sync::Arc<MemoryFlowStorage>,
    std::sync::Arc<MemoryTemplateCatalog>,
) {
    let storage = MemoryFlowStorage::new();
    let catalog = MemoryTemplateCatalog::with_templates(vec![TemplateDetail {
        name: "order_update".to_string(),
        body: "Your order shipped".to_string(),
        buttons: vec![
            TemplateButton { index: 0, text: "Track".to_string() },
            TemplateButton { index: 1, text: "Cancel".to_string() },
        ],
    }]);
    (storage, catalog)
}

fn template_kind() -> NodeKind {
    NodeKind::Template(TemplateConfig {
        template_name: "order_update".to_string(),
        body: "Your order shipped".to_string(),
        buttons: vec![
            TemplateButton { index: 0, text: "Track".to_string() },
            TemplateButton { index: 1, text: "Cancel".to_string() },
        ],
        ..Default::default()
    })
}

/// The end-to-end scenario: build on canvas, save, reload, edit again.
#[tokio::test]
async fn build_save_and_reload_a_flow() {
    let (storage, catalog) = services();
    let mut session = EditorSession::new(storage.clone(), catalog.clone(), "biz-1");
    session.set_name("Order updates");
    session.set_trigger_keyword("order");

    let start = session.store().start_node().unwrap().id.clone();
    let tpl = session
        .store_mut()
        .add_node(template_kind(), Position::new(300.0, 100.0));
    let msg = session.store_mut().add_node(
        NodeKind::Message(MessageConfig { body: "Tracking link: …".to_string() }),
        Position::new(500.0, 100.0),
    );

    session
        .apply(BlockIntent::Connect { source_id: start.clone(), target_id: tpl.clone(), source_port: None })
        .await;
    session
        .apply(BlockIntent::Connect {
            source_id: tpl.clone(),
            target_id: msg.clone(),
            source_port: Some(button_port(0)),
        })
        .await;

    let flow_id = session.save_flow().await.expect("save succeeds");

    // the persisted document carries the compiled routing
    let stored = storage.load_by_id(&flow_id).await.unwrap();
    let tpl_node = stored.nodes.iter().find(|n| n.id == tpl).unwrap();
    assert_eq!(
        tpl_node.data.config["buttonToNextMap"]["0"],
        Value::String(msg.clone())
    );

    // a fresh session reconstructs the same graph from storage
    let mut second = EditorSession::new(storage.clone(), catalog, "biz-1");
    second.load_flow(&flow_id).await.expect("load succeeds");
    assert_eq!(second.meta().name, "Order updates");
    assert_eq!(second.meta().trigger_keyword, "order");
    assert_eq!(second.store().nodes().len(), 3);
    assert_eq!(second.store().edges().len(), 2);
    let button_edge = second
        .store()
        .edges()
        .iter()
        .find(|e| e.source_port.is_some())
        .unwrap();
    assert_eq!(button_edge.source_port.as_deref(), Some("button-0"));

    // rendering the reloaded template still exposes both button ports
    let views = second.render();
    let tpl_view = views.iter().find(|v| v.node_id == tpl).unwrap();
    assert_eq!(tpl_view.output_ports.len(), 2);
}

#[tokio::test]
async fn failed_save_keeps_the_graph_and_surfaces_a_notice() {
    let (storage, catalog) = services();
    let mut session = EditorSession::new(storage.clone(), catalog, "biz-1");
    let before_nodes = session.store().nodes().to_vec();

    storage.fail_next_calls(ServiceError::Request("503".to_string()));
    let err = session.save_flow().await.expect_err("save fails");
    assert!(matches!(err, SessionError::Service(_)));

    assert_eq!(session.store().nodes(), before_nodes.as_slice());
    let notices = session.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].text.contains("Save failed"));

    // retrying the same action succeeds once the service recovers
    storage.succeed_again();
    session.save_flow().await.expect("retry succeeds");
}

/// Abandoning a hung save (the caller times out and drops the future) must
/// not leave the session refusing every later save and load.
#[tokio::test]
async fn abandoned_save_leaves_the_session_usable() {
    let (_, catalog) = services();
    let mut session = EditorSession::new(Arc::new(StalledFlowStorage), catalog, "biz-1");

    let hung = tokio::time::timeout(Duration::from_millis(20), session.save_flow()).await;
    assert!(hung.is_err(), "save against a hung service times out");

    // the retry reaches the service again instead of failing fast
    match tokio::time::timeout(Duration::from_millis(20), session.save_flow()).await {
        Err(_elapsed) => {}
        Ok(result) => panic!("expected the retry to reach the service, got {result:?}"),
    }
    match tokio::time::timeout(Duration::from_millis(20), session.load_flow("flow-1")).await {
        Err(_elapsed) => {}
        Ok(result) => panic!("expected the load to reach the service, got {result:?}"),
    }
}

#[tokio::test]
async fn failed_load_keeps_the_previous_graph() {
    let (storage, catalog) = services();
    let mut session = EditorSession::new(storage, catalog, "biz-1");
    session
        .store_mut()
        .add_node(NodeKind::Message(MessageConfig { body: "keep".to_string() }), Position::new(0.0, 0.0));

    let err = session.load_flow("flow-404").await.expect_err("load fails");
    assert!(matches!(
        err,
        SessionError::Service(ServiceError::NotFound(_))
    ));
    assert_eq!(session.store().nodes().len(), 2);
}

#[tokio::test]
async fn start_node_delete_via_intent_requires_confirmation() {
    let (storage, catalog) = services();
    let mut session = EditorSession::new(storage, catalog, "biz-1");
    let start = session.store().start_node().unwrap().id.clone();

    session.apply(BlockIntent::Delete { node_id: start.clone() }).await;
    assert!(session.store().node(&start).is_some());
    assert_eq!(session.store().pending_delete(), Some(start.as_str()));
    assert!(!session.take_notices().is_empty());

    session.store_mut().confirm_delete();
    assert!(session.store().node(&start).is_none());
}

/// Serialize → deserialize → serialize must be stable on the wire.
#[tokio::test]
async fn document_round_trip_is_bit_stable() {
    let (storage, catalog) = services();
    let mut session = EditorSession::new(storage, catalog, "biz-1");
    let start = session.store().start_node().unwrap().id.clone();
    let tpl = session
        .store_mut()
        .add_node(template_kind(), Position::new(300.0, 100.0));
    session.store_mut().connect(&start, &tpl, None);

    let meta = FlowMeta { name: "stable".to_string(), trigger_keyword: "hi".to_string() };
    let first = serialize_graph(session.store(), &meta);
    let second = serialize_graph(&deserialize_document(&first), &meta);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn session_wires_up_from_configuration() {
    let config: replyflow::config::ConfigStore = replyflow::config::MapConfig::new();
    let err = EditorSession::from_config(&config).await.expect_err("missing keys");
    assert!(err.to_string().contains("REPLYFLOW_STORAGE_URL"));

    config
        .set(replyflow::config::STORAGE_URL_KEY, "http://localhost:8080/api/")
        .await
        .unwrap();
    config
        .set(replyflow::config::CATALOG_URL_KEY, "http://localhost:8081/api/")
        .await
        .unwrap();
    config
        .set(replyflow::config::BUSINESS_ID_KEY, "biz-1")
        .await
        .unwrap();

    let session = EditorSession::from_config(&config).await.expect("configured");
    assert_eq!(session.store().nodes().len(), 1);
}
