//! The per-node configuration editor: edits a draft copy of one block's
//! config and writes it back atomically on explicit save. Unsaved edits are
//! discarded whenever the editor is closed or reopened on another node.


use crate::error::ServiceError;
use crate::graph::{
    FlowNode, GraphStore, NodeKind, TemplateConfig,
};
use crate::notice::{Notice, NoticeLevel};
use crate::service::{TemplateCatalog, TemplateDetail, TemplateSummary};
use tracing::{info, warn};

/// Modal editor state. `open_node == None` means closed.
#[derive(Debug)]
pub struct NodeConfigEditor {
    catalog: TemplateCatalog,
    business_id: String,
    open_node: Option<String>,
    draft: Option<NodeKind>,
    templates: Vec<TemplateSummary>,
    notices: Vec<Notice>,
}

impl NodeConfigEditor {
    pub fn new(catalog: TemplateCatalog, business_id: impl Into<String>) -> Self {
        Self {
            catalog,
            business_id: business_id.into(),
            open_node: None,
            draft: None,
            templates: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn open_node(&self) -> Option<&str> {
        self.open_node.as_deref()
    }

    pub fn draft(&self) -> Option<&NodeKind> {
        self.draft.as_ref()
    }

    /// Templates available in the dropdown (template blocks only).
    pub fn templates(&self) -> &[TemplateSummary] {
        &self.templates
    }

    /// Drain the transient notices accumulated since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Open the editor on a node. Any unsaved draft for a previously open
    /// node is discarded, never merged. For template blocks this loads the
    /// catalog list and re-fetches the previously saved template so its
    /// buttons are available for port rendering again.
    pub async fn open(&mut self, node: &FlowNode) {
        self.open_node = Some(node.id.clone());
        self.draft = Some(node.kind.clone());
        self.templates.clear();

        if let NodeKind::Template(cfg) = &node.kind {
            match self.catalog.list_templates(&self.business_id).await {
                Ok(list) => self.templates = list,
                Err(err) => self.notice_fetch_failure("template list", err),
            }
            if !cfg.template_name.is_empty() {
                let name = cfg.template_name.clone();
                let node_id = node.id.clone();
                let fetched = self.catalog.template_detail(&self.business_id, &name).await;
                self.apply_template_detail(&node_id, &name, fetched);
            }
        }
    }

    /// Close without saving; the draft is discarded.
    pub fn close(&mut self) {
        self.open_node = None;
        self.draft = None;
        self.templates.clear();
    }

    /// Replace the whole draft (kind-specific field setters go through here).
    pub fn set_draft(&mut self, kind: NodeKind) {
        if self.open_node.is_some() {
            self.draft = Some(kind);
        }
    }

    pub fn set_message_body(&mut self, body: impl Into<String>) {
        if let Some(NodeKind::Message(cfg)) = self.draft.as_mut() {
            cfg.body = body.into();
        }
    }

    /// Durations below one second are clamped up; the model requires ≥ 1.
    pub fn set_wait_seconds(&mut self, seconds: u64) {
        if let Some(NodeKind::Wait(cfg)) = self.draft.as_mut() {
            cfg.seconds = seconds.max(1);
        }
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        if let Some(NodeKind::Tag(cfg)) = self.draft.as_mut() {
            cfg.tags = tags;
        }
    }

    /// Select a template in the dropdown: fetches its full definition and,
    /// if the fetch lands while this editor is still on the same node,
    /// applies body and buttons to the draft.
    pub async fn select_template(&mut self, name: &str) {
        let Some(node_id) = self.open_node.clone() else {
            return;
        };
        let fetched = self.catalog.template_detail(&self.business_id, name).await;
        self.apply_template_detail(&node_id, name, fetched);
    }

    /// Write the draft back through the store and close. The store treats an
    /// unknown id as a no-op, which covers the node having been deleted while
    /// the editor was open.
    pub fn save(&mut self, store: &mut GraphStore) {
        if let (Some(node_id), Some(draft)) = (self.open_node.take(), self.draft.take()) {
            info!(node_id = %node_id, kind = draft.type_name(), "saving node config");
            store.update_node_config(&node_id, draft);
        }
        self.templates.clear();
    }

    /// Stale-fetch guard lives here: a resolved detail is dropped unless the
    /// editor is still open on the node the fetch was issued for.
    fn apply_template_detail(
        &mut self,
        node_id: &str,
        name: &str,
        fetched: Result<TemplateDetail, ServiceError>,
    ) {
        if self.open_node.as_deref() != Some(node_id) {
            warn!(node_id, "template detail resolved for a closed editor, discarding");
            return;
        }
        match fetched {
            Ok(detail) => {
                if let Some(NodeKind::Template(cfg)) = self.draft.as_mut() {
                    cfg.template_name = detail.name;
                    cfg.body = detail.body;
                    cfg.buttons = detail.buttons;
                }
            }
            Err(err) => {
                // Keep the dropdown, clear the preview. The node's saved
                // config is untouched until the operator explicitly saves.
                if let Some(NodeKind::Template(cfg)) = self.draft.as_mut() {
                    *cfg = TemplateConfig {
                        template_name: cfg.template_name.clone(),
                        ..Default::default()
                    };
                }
                self.notice_fetch_failure(&format!("template `{name}`"), err);
            }
        }
    }

    fn notice_fetch_failure(&mut self, what: &str, err: ServiceError) {
        warn!(%err, what, "catalog fetch failed");
        self.notices.push(Notice {
            level: NoticeLevel::Warning,
            text: format!("Could not load {what}: {err}"),
        });
    }
}
