use crate::document::FlowDocument;
use crate::error::ServiceError;
use crate::service::{
    FlowStorageType, FlowSummary, TemplateCatalogType, TemplateDetail, TemplateSummary,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// DashMap-backed flow storage for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryFlowStorage {
    flows: DashMap<String, (FlowSummary, FlowDocument)>,
    next_id: AtomicU64,
    /// When set, every call fails with this error. Lets tests exercise the
    /// "save failed, graph untouched" paths.
    fail_with: DashMap<(), ServiceError>,
}

impl MemoryFlowStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_calls(&self, err: ServiceError) {
        self.fail_with.insert((), err);
    }

    pub fn succeed_again(&self) {
        self.fail_with.remove(&());
    }

    fn check_failure(&self) -> Result<(), ServiceError> {
        match self.fail_with.get(&()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FlowStorageType for MemoryFlowStorage {
    async fn save(&self, document: &FlowDocument) -> Result<String, ServiceError> {
        self.check_failure()?;
        let id = format!("flow-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let summary = FlowSummary {
            id: id.clone(),
            name: document.name.clone(),
            created_at: Utc::now(),
        };
        self.flows.insert(id.clone(), (summary, document.clone()));
        Ok(id)
    }

    async fn load_by_id(&self, flow_id: &str) -> Result<FlowDocument, ServiceError> {
        self.check_failure()?;
        self.flows
            .get(flow_id)
            .map(|entry| entry.1.clone())
            .ok_or_else(|| ServiceError::NotFound(flow_id.to_string()))
    }

    async fn list_by_business(&self, _business_id: &str) -> Result<Vec<FlowSummary>, ServiceError> {
        self.check_failure()?;
        Ok(self.flows.iter().map(|e| e.0.clone()).collect())
    }

    async fn rename(&self, flow_id: &str, new_name: &str) -> Result<(), ServiceError> {
        self.check_failure()?;
        match self.flows.get_mut(flow_id) {
            Some(mut entry) => {
                entry.0.name = new_name.to_string();
                entry.1.name = new_name.to_string();
                Ok(())
            }
            None => Err(ServiceError::NotFound(flow_id.to_string())),
        }
    }

    async fn remove(&self, flow_id: &str) -> Result<(), ServiceError> {
        self.check_failure()?;
        self.flows
            .remove(flow_id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(flow_id.to_string()))
    }
}

/// Fixed catalog of templates, keyed by name.
#[derive(Debug, Default)]
pub struct MemoryTemplateCatalog {
    templates: DashMap<String, TemplateDetail>,
    fail_with: DashMap<(), ServiceError>,
}

impl MemoryTemplateCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_templates(templates: Vec<TemplateDetail>) -> Arc<Self> {
        let catalog = Self::default();
        for t in templates {
            catalog.templates.insert(t.name.clone(), t);
        }
        Arc::new(catalog)
    }

    pub fn fail_next_calls(&self, err: ServiceError) {
        self.fail_with.insert((), err);
    }

    pub fn succeed_again(&self) {
        self.fail_with.remove(&());
    }

    fn check_failure(&self) -> Result<(), ServiceError> {
        match self.fail_with.get(&()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TemplateCatalogType for MemoryTemplateCatalog {
    async fn list_templates(&self, _business_id: &str) -> Result<Vec<TemplateSummary>, ServiceError> {
        self.check_failure()?;
        let mut list: Vec<TemplateSummary> = self
            .templates
            .iter()
            .map(|t| TemplateSummary {
                name: t.name.clone(),
                language: "en".to_string(),
                placeholder_count: 0,
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn template_detail(
        &self,
        _business_id: &str,
        name: &str,
    ) -> Result<TemplateDetail, ServiceError> {
        self.check_failure()?;
        self.templates
            .get(name)
            .map(|t| t.clone())
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }
}
