use crate::document::FlowDocument;
use crate::error::ServiceError;
use crate::service::{
    FlowStorageType, FlowSummary, TemplateCatalogType, TemplateDetail, TemplateSummary,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveResponse {
    flow_id: String,
}

/// JSON client for the flow storage service.
#[derive(Debug, Clone)]
pub struct HttpFlowStorage {
    client: Client,
    base: Url,
}

impl HttpFlowStorage {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::Request(format!("bad endpoint `{path}`: {e}")))
    }
}

#[async_trait]
impl FlowStorageType for HttpFlowStorage {
    #[tracing::instrument(name = "storage_save", skip(self, document), fields(name = %document.name))]
    async fn save(&self, document: &FlowDocument) -> Result<String, ServiceError> {
        let resp = self
            .client
            .post(self.endpoint("flows")?)
            .json(document)
            .send()
            .await?;
        let resp = check_status(resp, "flow").await?;
        let body: SaveResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        Ok(body.flow_id)
    }

    #[tracing::instrument(name = "storage_load", skip(self))]
    async fn load_by_id(&self, flow_id: &str) -> Result<FlowDocument, ServiceError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("flows/{flow_id}"))?)
            .send()
            .await?;
        let resp = check_status(resp, flow_id).await?;
        resp.json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    #[tracing::instrument(name = "storage_list", skip(self))]
    async fn list_by_business(&self, business_id: &str) -> Result<Vec<FlowSummary>, ServiceError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("businesses/{business_id}/flows"))?)
            .send()
            .await?;
        let resp = check_status(resp, business_id).await?;
        resp.json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    #[tracing::instrument(name = "storage_rename", skip(self))]
    async fn rename(&self, flow_id: &str, new_name: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .put(self.endpoint(&format!("flows/{flow_id}/name"))?)
            .json(&json!({ "name": new_name }))
            .send()
            .await?;
        check_status(resp, flow_id).await?;
        Ok(())
    }

    #[tracing::instrument(name = "storage_remove", skip(self))]
    async fn remove(&self, flow_id: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(self.endpoint(&format!("flows/{flow_id}"))?)
            .send()
            .await?;
        check_status(resp, flow_id).await?;
        Ok(())
    }
}

/// JSON client for the template catalog service.
#[derive(Debug, Clone)]
pub struct HttpTemplateCatalog {
    client: Client,
    base: Url,
}

impl HttpTemplateCatalog {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::Request(format!("bad endpoint `{path}`: {e}")))
    }
}

#[async_trait]
impl TemplateCatalogType for HttpTemplateCatalog {
    #[tracing::instrument(name = "catalog_list", skip(self))]
    async fn list_templates(&self, business_id: &str) -> Result<Vec<TemplateSummary>, ServiceError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("businesses/{business_id}/templates"))?)
            .send()
            .await?;
        let resp = check_status(resp, business_id).await?;
        resp.json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    #[tracing::instrument(name = "catalog_detail", skip(self))]
    async fn template_detail(
        &self,
        business_id: &str,
        name: &str,
    ) -> Result<TemplateDetail, ServiceError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("businesses/{business_id}/templates/{name}"))?)
            .send()
            .await?;
        let resp = check_status(resp, name).await?;
        resp.json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

async fn check_status(
    resp: reqwest::Response,
    subject: &str,
) -> Result<reqwest::Response, ServiceError> {
    match resp.status() {
        StatusCode::NOT_FOUND => Err(ServiceError::NotFound(subject.to_string())),
        status if status.is_success() => Ok(resp),
        status => {
            let body = resp.text().await.unwrap_or_default();
            Err(ServiceError::Request(format!("{status}: {body}")))
        }
    }
}
