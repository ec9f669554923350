use crate::config::{ConfigStore, BUSINESS_ID_KEY, CATALOG_URL_KEY, STORAGE_URL_KEY};
use crate::document::{deserialize_document, serialize_graph, FlowMeta};
use crate::editor::NodeConfigEditor;
use crate::error::SessionError;
use crate::graph::{DeleteOutcome, GraphStore};
use crate::notice::{Notice, NoticeLevel};
use crate::render::{render_all, BlockIntent, BlockView};
use crate::service::{FlowStorage, HttpFlowStorage, HttpTemplateCatalog, TemplateCatalog};
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

/// Clears the busy flag when dropped, including when the caller abandons an
/// in-flight save or load (e.g. a timeout drops the future mid-await).
struct BusyGuard<'a>(&'a mut bool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// One editing session: the single live graph, the editor-level metadata,
/// and the handles to the two external services. Created when the operator
/// opens the canvas, dropped when they leave it; nothing autosaves.
#[derive(Debug)]
pub struct EditorSession {
    store: GraphStore,
    meta: FlowMeta,
    editor: NodeConfigEditor,
    storage: FlowStorage,
    /// Serializes save and load; they replace/read the whole graph and must
    /// not interleave.
    busy: bool,
    notices: Vec<Notice>,
}

impl EditorSession {
    pub fn new(
        storage: FlowStorage,
        catalog: TemplateCatalog,
        business_id: impl Into<String>,
    ) -> Self {
        Self {
            store: GraphStore::new(),
            meta: FlowMeta::default(),
            editor: NodeConfigEditor::new(catalog, business_id),
            storage,
            busy: false,
            notices: Vec::new(),
        }
    }

    /// Wire a session against the HTTP services named in configuration.
    pub async fn from_config(config: &ConfigStore) -> anyhow::Result<Self> {
        let storage_url = config
            .get(STORAGE_URL_KEY)
            .await
            .with_context(|| format!("{STORAGE_URL_KEY} is not configured"))?;
        let catalog_url = config
            .get(CATALOG_URL_KEY)
            .await
            .with_context(|| format!("{CATALOG_URL_KEY} is not configured"))?;
        let business_id = config
            .get(BUSINESS_ID_KEY)
            .await
            .with_context(|| format!("{BUSINESS_ID_KEY} is not configured"))?;
        let storage = Arc::new(HttpFlowStorage::new(
            Url::parse(&storage_url).context("invalid flow storage url")?,
        ));
        let catalog = Arc::new(HttpTemplateCatalog::new(
            Url::parse(&catalog_url).context("invalid template catalog url")?,
        ));
        Ok(Self::new(storage, catalog, business_id))
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn editor(&self) -> &NodeConfigEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut NodeConfigEditor {
        &mut self.editor
    }

    pub fn meta(&self) -> &FlowMeta {
        &self.meta
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.meta.name = name.into();
    }

    pub fn set_trigger_keyword(&mut self, keyword: impl Into<String>) {
        self.meta.trigger_keyword = keyword.into();
    }

    /// Current canvas, one view per block.
    pub fn render(&self) -> Vec<BlockView> {
        render_all(self.store.nodes())
    }

    /// Apply a user intent coming out of a block renderer.
    pub async fn apply(&mut self, intent: BlockIntent) {
        match intent {
            BlockIntent::OpenEditor { node_id } => {
                if let Some(node) = self.store.select(&node_id).cloned() {
                    self.editor.open(&node).await;
                    self.notices.extend(self.editor.take_notices());
                }
            }
            BlockIntent::Delete { node_id } => {
                if self.store.delete_node(&node_id) == DeleteOutcome::ConfirmationRequired {
                    self.notices.push(Notice {
                        level: NoticeLevel::Warning,
                        text: "Deleting the start node removes the flow's entry point. Confirm to proceed.".to_string(),
                    });
                }
            }
            BlockIntent::Connect {
                source_id,
                target_id,
                source_port,
            } => {
                self.store.connect(&source_id, &target_id, source_port);
            }
            BlockIntent::Disconnect { edge_id } => {
                self.store.disconnect(&edge_id);
            }
        }
    }

    /// Serialize the live graph and upload it. The document is fully built
    /// in memory before the network call, and the graph is left untouched on
    /// failure, so a failed save is always retryable as-is.
    pub async fn save_flow(&mut self) -> Result<String, SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        self.busy = true;
        let document = serialize_graph(&self.store, &self.meta);
        let result = {
            let _busy = BusyGuard(&mut self.busy);
            self.storage.save(&document).await
        };
        match result {
            Ok(flow_id) => {
                info!(%flow_id, "flow saved");
                Ok(flow_id)
            }
            Err(err) => {
                error!(%err, "flow save failed, keeping the live graph");
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    text: format!("Save failed: {err}"),
                });
                Err(err.into())
            }
        }
    }

    /// Fetch a document and replace the whole live graph with it. On failure
    /// the previous graph stays in place.
    pub async fn load_flow(&mut self, flow_id: &str) -> Result<(), SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        self.busy = true;
        let result = {
            let _busy = BusyGuard(&mut self.busy);
            self.storage.load_by_id(flow_id).await
        };
        match result {
            Ok(document) => {
                self.meta = FlowMeta {
                    name: document.name.clone(),
                    trigger_keyword: document.trigger_keyword.clone(),
                };
                self.store = deserialize_document(&document);
                self.editor.close();
                info!(%flow_id, nodes = self.store.nodes().len(), "flow loaded");
                Ok(())
            }
            Err(err) => {
                error!(%err, %flow_id, "flow load failed, keeping the previous graph");
                self.notices.push(Notice {
                    level: NoticeLevel::Error,
                    text: format!("Load failed: {err}"),
                });
                Err(err.into())
            }
        }
    }

    /// Drain the transient notices accumulated since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        let mut drained = std::mem::take(&mut self.notices);
        drained.extend(self.editor.take_notices());
        drained
    }
}
