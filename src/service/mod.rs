//! External collaborators: the flow storage service that owns persisted
//! documents and the template catalog the editor reads template metadata
//! from. Both are seams: HTTP implementations for production, in-memory
//! ones for tests and local runs.

pub mod http;
pub mod memory;

use crate::document::FlowDocument;
use crate::error::ServiceError;
use crate::graph::TemplateButton;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

pub use http::{HttpFlowStorage, HttpTemplateCatalog};
pub use memory::{MemoryFlowStorage, MemoryTemplateCatalog};

pub type FlowStorage = Arc<dyn FlowStorageType>;
pub type TemplateCatalog = Arc<dyn TemplateCatalogType>;

/// One row in the operator's flow list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog listing entry, enough to fill the template dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub name: String,
    pub language: String,
    pub placeholder_count: u32,
}

/// Full template definition, fetched on selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateDetail {
    pub name: String,
    pub body: String,
    pub buttons: Vec<TemplateButton>,
}

/// Owns persisted flow documents.
#[async_trait]
pub trait FlowStorageType: Send + Sync + Debug {
    async fn save(&self, document: &FlowDocument) -> Result<String, ServiceError>;
    async fn load_by_id(&self, flow_id: &str) -> Result<FlowDocument, ServiceError>;
    async fn list_by_business(&self, business_id: &str) -> Result<Vec<FlowSummary>, ServiceError>;
    async fn rename(&self, flow_id: &str, new_name: &str) -> Result<(), ServiceError>;
    async fn remove(&self, flow_id: &str) -> Result<(), ServiceError>;
}

/// Read-only template metadata for one business.
#[async_trait]
pub trait TemplateCatalogType: Send + Sync + Debug {
    async fn list_templates(&self, business_id: &str) -> Result<Vec<TemplateSummary>, ServiceError>;
    async fn template_detail(
        &self,
        business_id: &str,
        name: &str,
    ) -> Result<TemplateDetail, ServiceError>;
}
