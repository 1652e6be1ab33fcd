//! Control-plane API boundary and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::operation::Operation;
use crate::request::{
    AddDashboardsGroupRequest, AddNodeGroupRequest, CreateClusterRequest,
    DeleteDashboardsGroupRequest, DeleteNodeGroupRequest, UpdateClusterRequest,
    UpdateDashboardsGroupRequest, UpdateNodeGroupRequest,
};
use crate::types::{Cluster, HostPage};

/// Remote control-plane API for managed search clusters.
///
/// Every mutating call returns a long-running [`Operation`]; callers poll it
/// through [`ControlPlaneApi::get_operation`] until it reports `done`.
#[async_trait]
pub trait ControlPlaneApi: Send + Sync {
    /// Create a cluster.
    async fn create_cluster(&self, req: &CreateClusterRequest) -> ApiResult<Operation>;

    /// Update whole-cluster scalar attributes.
    async fn update_cluster(&self, req: &UpdateClusterRequest) -> ApiResult<Operation>;

    /// Delete a cluster.
    async fn delete_cluster(&self, cluster_id: &str) -> ApiResult<Operation>;

    /// Fetch a cluster by identifier.
    async fn get_cluster(&self, cluster_id: &str) -> ApiResult<Cluster>;

    /// List one page of cluster hosts. An empty `page_token` starts the
    /// listing; pagination ends when the returned token is empty or `"0"`.
    async fn list_hosts(&self, cluster_id: &str, page_token: &str) -> ApiResult<HostPage>;

    /// Add a search-tier node group.
    async fn add_node_group(&self, req: &AddNodeGroupRequest) -> ApiResult<Operation>;

    /// Update a search-tier node group.
    async fn update_node_group(&self, req: &UpdateNodeGroupRequest) -> ApiResult<Operation>;

    /// Delete a search-tier node group.
    async fn delete_node_group(&self, req: &DeleteNodeGroupRequest) -> ApiResult<Operation>;

    /// Add a dashboard-tier node group.
    async fn add_dashboards_group(&self, req: &AddDashboardsGroupRequest) -> ApiResult<Operation>;

    /// Update a dashboard-tier node group.
    async fn update_dashboards_group(
        &self,
        req: &UpdateDashboardsGroupRequest,
    ) -> ApiResult<Operation>;

    /// Delete a dashboard-tier node group.
    async fn delete_dashboards_group(
        &self,
        req: &DeleteDashboardsGroupRequest,
    ) -> ApiResult<Operation>;

    /// Fetch the current state of a long-running operation.
    async fn get_operation(&self, operation_id: &str) -> ApiResult<Operation>;
}

/// HTTP implementation of [`ControlPlaneApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a new client for the given endpoint.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Create a new client with a default 30 second timeout.
    pub fn with_url(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::new(base_url, Duration::from_secs(30))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, entity: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(ApiError::Http)?;
        decode(response, entity).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        entity: &str,
    ) -> ApiResult<Operation> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Http)?;
        decode(response, entity).await
    }

    async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        entity: &str,
    ) -> ApiResult<Operation> {
        let response = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ApiError::Http)?;
        decode(response, entity).await
    }

    async fn delete_json(&self, path: &str, entity: &str) -> ApiResult<Operation> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(ApiError::Http)?;
        decode(response, entity).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, entity: &str) -> ApiResult<T> {
    match response.status() {
        status if status.is_success() => response.json().await.map_err(ApiError::Http),
        StatusCode::NOT_FOUND => Err(ApiError::not_found(entity)),
        status => {
            let message = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                code: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ControlPlaneApi for HttpApi {
    async fn create_cluster(&self, req: &CreateClusterRequest) -> ApiResult<Operation> {
        self.post_json("/clusters", req, "cluster").await
    }

    async fn update_cluster(&self, req: &UpdateClusterRequest) -> ApiResult<Operation> {
        let path = format!("/clusters/{}", req.cluster_id);
        self.patch_json(&path, req, &format!("cluster {}", req.cluster_id))
            .await
    }

    async fn delete_cluster(&self, cluster_id: &str) -> ApiResult<Operation> {
        let path = format!("/clusters/{cluster_id}");
        self.delete_json(&path, &format!("cluster {cluster_id}"))
            .await
    }

    async fn get_cluster(&self, cluster_id: &str) -> ApiResult<Cluster> {
        let path = format!("/clusters/{cluster_id}");
        self.get_json(&path, &format!("cluster {cluster_id}")).await
    }

    async fn list_hosts(&self, cluster_id: &str, page_token: &str) -> ApiResult<HostPage> {
        let path = format!("/clusters/{cluster_id}/hosts?page_token={page_token}");
        self.get_json(&path, &format!("cluster {cluster_id}")).await
    }

    async fn add_node_group(&self, req: &AddNodeGroupRequest) -> ApiResult<Operation> {
        let path = format!("/clusters/{}/opensearch/node-groups", req.cluster_id);
        self.post_json(&path, req, &format!("cluster {}", req.cluster_id))
            .await
    }

    async fn update_node_group(&self, req: &UpdateNodeGroupRequest) -> ApiResult<Operation> {
        let path = format!(
            "/clusters/{}/opensearch/node-groups/{}",
            req.cluster_id, req.name
        );
        self.patch_json(&path, req, &format!("node group {}", req.name))
            .await
    }

    async fn delete_node_group(&self, req: &DeleteNodeGroupRequest) -> ApiResult<Operation> {
        let path = format!(
            "/clusters/{}/opensearch/node-groups/{}",
            req.cluster_id, req.name
        );
        self.delete_json(&path, &format!("node group {}", req.name))
            .await
    }

    async fn add_dashboards_group(&self, req: &AddDashboardsGroupRequest) -> ApiResult<Operation> {
        let path = format!("/clusters/{}/dashboards/node-groups", req.cluster_id);
        self.post_json(&path, req, &format!("cluster {}", req.cluster_id))
            .await
    }

    async fn update_dashboards_group(
        &self,
        req: &UpdateDashboardsGroupRequest,
    ) -> ApiResult<Operation> {
        let path = format!(
            "/clusters/{}/dashboards/node-groups/{}",
            req.cluster_id, req.name
        );
        self.patch_json(&path, req, &format!("node group {}", req.name))
            .await
    }

    async fn delete_dashboards_group(
        &self,
        req: &DeleteDashboardsGroupRequest,
    ) -> ApiResult<Operation> {
        let path = format!(
            "/clusters/{}/dashboards/node-groups/{}",
            req.cluster_id, req.name
        );
        self.delete_json(&path, &format!("node group {}", req.name))
            .await
    }

    async fn get_operation(&self, operation_id: &str) -> ApiResult<Operation> {
        let path = format!("/operations/{operation_id}");
        self.get_json(&path, &format!("operation {operation_id}"))
            .await
    }
}
