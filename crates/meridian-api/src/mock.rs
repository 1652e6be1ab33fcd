//! In-memory mock control plane for testing.
//!
//! [`MockApi`] applies every mutation to held cluster state immediately and
//! returns an already-finished operation, while recording the call sequence
//! so tests can assert ordering. Failures can be injected per call: either a
//! call-level [`ApiError`] or an operation that terminates with an error
//! payload.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crate::error::{ApiError, ApiResult};
use crate::operation::{Operation, OperationError, OperationMetadata};
use crate::request::{
    AddDashboardsGroupRequest, AddNodeGroupRequest, CreateClusterRequest,
    DeleteDashboardsGroupRequest, DeleteNodeGroupRequest, UpdateClusterRequest,
    UpdateDashboardsGroupRequest, UpdateNodeGroupRequest,
};
use crate::types::{
    Cluster, DashboardNodeGroup, DashboardsConfig, Host, HostPage, SearchNodeGroup,
};
use crate::client::ControlPlaneApi;

/// Failure to inject into the next mutating call.
#[derive(Debug)]
pub enum MockFailure {
    /// The call itself fails before an operation is created.
    Call(ApiError),
    /// The call succeeds but the operation terminates with an error payload.
    Operation,
}

#[derive(Debug, Default)]
struct MockState {
    clusters: HashMap<String, Cluster>,
    hosts: HashMap<String, Vec<Host>>,
    operations: HashMap<String, Operation>,
    calls: Vec<String>,
}

/// Mock implementation of [`ControlPlaneApi`].
#[derive(Debug)]
pub struct MockApi {
    state: RwLock<MockState>,
    failures: Mutex<VecDeque<MockFailure>>,
    page_size: usize,
    zero_sentinel: bool,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    /// Create a new empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MockState::default()),
            failures: Mutex::new(VecDeque::new()),
            page_size: 100,
            zero_sentinel: false,
        }
    }

    /// Set the host-listing page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Terminate host pagination with the `"0"` sentinel instead of an
    /// empty token.
    #[must_use]
    pub const fn with_zero_sentinel(mut self) -> Self {
        self.zero_sentinel = true;
        self
    }

    /// Seed the mock with an existing cluster.
    pub fn insert_cluster(&self, cluster: Cluster) {
        self.state
            .write()
            .clusters
            .insert(cluster.id.clone(), cluster);
    }

    /// Set the host list reported for a cluster.
    pub fn set_hosts(&self, cluster_id: &str, hosts: Vec<Host>) {
        self.state.write().hosts.insert(cluster_id.to_owned(), hosts);
    }

    /// Queue a failure for the next mutating call.
    pub fn fail_next(&self, failure: MockFailure) {
        self.failures.lock().push_back(failure);
    }

    /// The sequence of mutating and read calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state.read().calls.clone()
    }

    /// Get the current state of a cluster, if it exists.
    #[must_use]
    pub fn cluster(&self, cluster_id: &str) -> Option<Cluster> {
        self.state.read().clusters.get(cluster_id).cloned()
    }

    fn record(&self, call: String) {
        self.state.write().calls.push(call);
    }

    fn take_failure(&self) -> Option<MockFailure> {
        self.failures.lock().pop_front()
    }

    fn finish_operation(&self, description: &str, cluster_id: &str, failed: bool) -> Operation {
        let op = Operation {
            id: ulid::Ulid::new().to_string().to_lowercase(),
            description: description.to_owned(),
            created_at: Utc::now(),
            done: true,
            error: failed.then(|| OperationError {
                code: 13,
                message: "internal error".to_owned(),
            }),
            metadata: Some(OperationMetadata {
                cluster_id: cluster_id.to_owned(),
            }),
        };
        self.state
            .write()
            .operations
            .insert(op.id.clone(), op.clone());
        op
    }

    /// Run one mutation: record the call, apply any injected failure and,
    /// only when none fired, mutate state and finish the operation.
    fn mutate<F>(&self, call: String, cluster_id: &str, apply: F) -> ApiResult<Operation>
    where
        F: FnOnce(&mut MockState) -> ApiResult<()>,
    {
        let description = call.clone();
        self.record(call);

        match self.take_failure() {
            Some(MockFailure::Call(err)) => return Err(err),
            Some(MockFailure::Operation) => {
                return Ok(self.finish_operation(&description, cluster_id, true));
            }
            None => {}
        }

        apply(&mut self.state.write())?;
        Ok(self.finish_operation(&description, cluster_id, false))
    }
}

fn apply_search_mask(target: &mut SearchNodeGroup, src: &SearchNodeGroup, mask: &[String]) {
    for path in mask {
        match path.as_str() {
            "resources" => target.resources = src.resources.clone(),
            "hosts_count" => target.hosts_count = src.hosts_count,
            "zone_ids" => target.zone_ids = src.zone_ids.clone(),
            "subnet_ids" => target.subnet_ids = src.subnet_ids.clone(),
            "assign_public_ip" => target.assign_public_ip = src.assign_public_ip,
            "roles" => target.roles = src.roles.clone(),
            _ => {}
        }
    }
}

fn apply_dashboards_mask(
    target: &mut DashboardNodeGroup,
    src: &DashboardNodeGroup,
    mask: &[String],
) {
    for path in mask {
        match path.as_str() {
            "resources" => target.resources = src.resources.clone(),
            "hosts_count" => target.hosts_count = src.hosts_count,
            "zone_ids" => target.zone_ids = src.zone_ids.clone(),
            "subnet_ids" => target.subnet_ids = src.subnet_ids.clone(),
            "assign_public_ip" => target.assign_public_ip = src.assign_public_ip,
            _ => {}
        }
    }
}

fn cluster_mut<'a>(state: &'a mut MockState, cluster_id: &str) -> ApiResult<&'a mut Cluster> {
    state
        .clusters
        .get_mut(cluster_id)
        .ok_or_else(|| ApiError::not_found(format!("cluster {cluster_id}")))
}

#[async_trait]
impl ControlPlaneApi for MockApi {
    async fn create_cluster(&self, req: &CreateClusterRequest) -> ApiResult<Operation> {
        let cluster_id = ulid::Ulid::new().to_string().to_lowercase();
        let cluster = Cluster {
            id: cluster_id.clone(),
            folder_id: req.folder_id.clone(),
            created_at: Utc::now(),
            name: req.name.clone(),
            description: req.description.clone(),
            labels: req.labels.clone(),
            environment: req.environment,
            config: crate::types::ClusterConfig {
                admin_password: None,
                ..req.config.clone()
            },
            network_id: req.network_id.clone(),
            health: "ALIVE".to_owned(),
            status: "RUNNING".to_owned(),
            security_group_ids: req.security_group_ids.clone(),
            service_account_id: req.service_account_id.clone(),
            deletion_protection: req.deletion_protection,
            maintenance_window: req.maintenance_window,
        };

        self.mutate("CreateCluster".to_owned(), &cluster_id, move |state| {
            state.clusters.insert(cluster.id.clone(), cluster);
            Ok(())
        })
    }

    async fn update_cluster(&self, req: &UpdateClusterRequest) -> ApiResult<Operation> {
        let req = req.clone();
        self.mutate(
            "UpdateCluster".to_owned(),
            &req.cluster_id.clone(),
            move |state| {
                let cluster = cluster_mut(state, &req.cluster_id)?;
                for path in &req.update_mask {
                    match path.as_str() {
                        "name" => {
                            if let Some(name) = &req.name {
                                cluster.name = name.clone();
                            }
                        }
                        "description" => {
                            if let Some(description) = &req.description {
                                cluster.description = description.clone();
                            }
                        }
                        "labels" => {
                            if let Some(labels) = &req.labels {
                                cluster.labels = labels.clone();
                            }
                        }
                        "security_group_ids" => {
                            if let Some(ids) = &req.security_group_ids {
                                cluster.security_group_ids = ids.clone();
                            }
                        }
                        "service_account_id" => {
                            cluster.service_account_id = req.service_account_id.clone();
                        }
                        "deletion_protection" => {
                            if let Some(flag) = req.deletion_protection {
                                cluster.deletion_protection = flag;
                            }
                        }
                        "maintenance_window" => {
                            cluster.maintenance_window = req.maintenance_window;
                        }
                        "config.version" => {
                            if let Some(config) = &req.config {
                                if let Some(version) = &config.version {
                                    cluster.config.version = version.clone();
                                }
                            }
                        }
                        "config.search.plugins" => {
                            if let Some(config) = &req.config {
                                if let Some(plugins) = &config.plugins {
                                    cluster.config.search.plugins = plugins.clone();
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(())
            },
        )
    }

    async fn delete_cluster(&self, cluster_id: &str) -> ApiResult<Operation> {
        let id = cluster_id.to_owned();
        self.mutate("DeleteCluster".to_owned(), cluster_id, move |state| {
            state
                .clusters
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| ApiError::not_found(format!("cluster {id}")))
        })
    }

    async fn get_cluster(&self, cluster_id: &str) -> ApiResult<Cluster> {
        self.record("GetCluster".to_owned());
        self.cluster(cluster_id)
            .ok_or_else(|| ApiError::not_found(format!("cluster {cluster_id}")))
    }

    async fn list_hosts(&self, cluster_id: &str, page_token: &str) -> ApiResult<HostPage> {
        self.record("ListHosts".to_owned());

        let state = self.state.read();
        if !state.clusters.contains_key(cluster_id) {
            return Err(ApiError::not_found(format!("cluster {cluster_id}")));
        }

        let hosts = state.hosts.get(cluster_id).cloned().unwrap_or_default();
        let offset: usize = if page_token.is_empty() {
            0
        } else {
            page_token
                .parse()
                .map_err(|_| ApiError::internal(format!("bad page token: {page_token}")))?
        };

        let end = (offset + self.page_size).min(hosts.len());
        let next_page_token = if end < hosts.len() {
            end.to_string()
        } else if self.zero_sentinel {
            "0".to_owned()
        } else {
            String::new()
        };

        Ok(HostPage {
            hosts: hosts[offset..end].to_vec(),
            next_page_token,
        })
    }

    async fn add_node_group(&self, req: &AddNodeGroupRequest) -> ApiResult<Operation> {
        let req = req.clone();
        self.mutate(
            format!("AddNodeGroup({})", req.node_group.name),
            &req.cluster_id.clone(),
            move |state| {
                let cluster = cluster_mut(state, &req.cluster_id)?;
                cluster.config.search.node_groups.push(req.node_group);
                Ok(())
            },
        )
    }

    async fn update_node_group(&self, req: &UpdateNodeGroupRequest) -> ApiResult<Operation> {
        let req = req.clone();
        self.mutate(
            format!("UpdateNodeGroup({})", req.name),
            &req.cluster_id.clone(),
            move |state| {
                let cluster = cluster_mut(state, &req.cluster_id)?;
                let group = cluster
                    .config
                    .search
                    .node_groups
                    .iter_mut()
                    .find(|g| g.name == req.name)
                    .ok_or_else(|| ApiError::not_found(format!("node group {}", req.name)))?;
                apply_search_mask(group, &req.node_group, &req.update_mask);
                Ok(())
            },
        )
    }

    async fn delete_node_group(&self, req: &DeleteNodeGroupRequest) -> ApiResult<Operation> {
        let req = req.clone();
        self.mutate(
            format!("DeleteNodeGroup({})", req.name),
            &req.cluster_id.clone(),
            move |state| {
                let cluster = cluster_mut(state, &req.cluster_id)?;
                let groups = &mut cluster.config.search.node_groups;
                let before = groups.len();
                groups.retain(|g| g.name != req.name);
                if groups.len() == before {
                    return Err(ApiError::not_found(format!("node group {}", req.name)));
                }
                Ok(())
            },
        )
    }

    async fn add_dashboards_group(&self, req: &AddDashboardsGroupRequest) -> ApiResult<Operation> {
        let req = req.clone();
        self.mutate(
            format!("AddDashboardsGroup({})", req.node_group.name),
            &req.cluster_id.clone(),
            move |state| {
                let cluster = cluster_mut(state, &req.cluster_id)?;
                cluster
                    .config
                    .dashboards
                    .get_or_insert_with(|| DashboardsConfig {
                        node_groups: Vec::new(),
                    })
                    .node_groups
                    .push(req.node_group);
                Ok(())
            },
        )
    }

    async fn update_dashboards_group(
        &self,
        req: &UpdateDashboardsGroupRequest,
    ) -> ApiResult<Operation> {
        let req = req.clone();
        self.mutate(
            format!("UpdateDashboardsGroup({})", req.name),
            &req.cluster_id.clone(),
            move |state| {
                let cluster = cluster_mut(state, &req.cluster_id)?;
                let group = cluster
                    .config
                    .dashboards
                    .as_mut()
                    .and_then(|d| d.node_groups.iter_mut().find(|g| g.name == req.name))
                    .ok_or_else(|| ApiError::not_found(format!("node group {}", req.name)))?;
                apply_dashboards_mask(group, &req.node_group, &req.update_mask);
                Ok(())
            },
        )
    }

    async fn delete_dashboards_group(
        &self,
        req: &DeleteDashboardsGroupRequest,
    ) -> ApiResult<Operation> {
        let req = req.clone();
        self.mutate(
            format!("DeleteDashboardsGroup({})", req.name),
            &req.cluster_id.clone(),
            move |state| {
                let cluster = cluster_mut(state, &req.cluster_id)?;
                let dashboards = cluster
                    .config
                    .dashboards
                    .as_mut()
                    .ok_or_else(|| ApiError::not_found(format!("node group {}", req.name)))?;
                let before = dashboards.node_groups.len();
                dashboards.node_groups.retain(|g| g.name != req.name);
                if dashboards.node_groups.len() == before {
                    return Err(ApiError::not_found(format!("node group {}", req.name)));
                }
                Ok(())
            },
        )
    }

    async fn get_operation(&self, operation_id: &str) -> ApiResult<Operation> {
        self.state
            .read()
            .operations
            .get(operation_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("operation {operation_id}")))
    }
}
