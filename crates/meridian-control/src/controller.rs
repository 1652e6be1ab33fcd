//! Cluster lifecycle reconciliation.
//!
//! [`ClusterController`] owns the four lifecycle passes: create, read,
//! update and delete. Each pass validates the desired-state document, turns
//! the difference against the last-applied document into a plan, and drives
//! the plan through the control plane one operation at a time under a single
//! wall-clock deadline.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use meridian_api::request::{
    AddDashboardsGroupRequest, AddNodeGroupRequest, ConfigUpdate, CreateClusterRequest,
    DeleteDashboardsGroupRequest, DeleteNodeGroupRequest, UpdateClusterRequest,
    UpdateDashboardsGroupRequest, UpdateNodeGroupRequest,
};
use meridian_api::types::{ClusterConfig, DashboardsConfig, Host, SearchConfig};
use meridian_api::ControlPlaneApi;

use crate::config::ControllerConfig;
use crate::error::{ControlError, ControlResult};
use crate::executor::OperationRunner;
use crate::plan::{mask_paths, plan_dashboard_tier, plan_search_tier, GroupOp};
use crate::spec::{ClusterId, ClusterSpec, ObservedCluster};

/// Reconciles managed search clusters against desired-state documents.
pub struct ClusterController {
    api: Arc<dyn ControlPlaneApi>,
    config: ControllerConfig,
}

impl ClusterController {
    /// Create a controller over the given API boundary.
    #[must_use]
    pub fn new(api: Arc<dyn ControlPlaneApi>, config: ControllerConfig) -> Self {
        Self { api, config }
    }

    fn runner(&self) -> OperationRunner<'_> {
        OperationRunner::new(self.api.as_ref(), &self.config.retry)
    }

    /// Create a cluster from a desired-state document.
    ///
    /// Returns the identifier the control plane assigned. Creation is a
    /// single remote operation covering both tiers; it is waited on but
    /// never retried, since a failed create may have left the cluster
    /// half-provisioned under a fresh id.
    pub async fn create(&self, spec: &ClusterSpec) -> ControlResult<ClusterId> {
        let environment = spec.environment()?;
        let maintenance_window = spec.maintenance_window()?;
        let search = spec.search_snapshot()?;
        if search.is_empty() {
            return Err(ControlError::validation(
                "the search tier needs at least one node group",
            ));
        }
        // Validates host counts and name uniqueness for the dashboard tier.
        spec.dashboard_snapshot()?;

        let req = CreateClusterRequest {
            name: spec.name.clone(),
            description: spec.description.clone(),
            labels: spec.labels.clone(),
            folder_id: spec.folder_id.clone(),
            environment,
            network_id: spec.network_id.clone(),
            config: ClusterConfig {
                version: spec.config.version.clone(),
                admin_password: Some(spec.config.admin_password.clone()),
                search: SearchConfig {
                    node_groups: spec.config.search.node_groups.clone(),
                    plugins: spec.config.search.plugins.clone(),
                },
                dashboards: spec.config.dashboards.as_ref().map(|tier| DashboardsConfig {
                    node_groups: tier.node_groups.clone(),
                }),
            },
            security_group_ids: spec.security_group_ids.clone(),
            service_account_id: spec.service_account_id.clone(),
            deletion_protection: spec.deletion_protection,
            maintenance_window,
        };

        let deadline = Instant::now() + self.config.timeouts.create();
        let op = self
            .api
            .create_cluster(&req)
            .await
            .map_err(|e| ControlError::operation("Cluster Create", &spec.name, e))?;

        let cluster_id = op
            .metadata
            .as_ref()
            .map(|m| ClusterId::new(&m.cluster_id))
            .ok_or_else(|| {
                ControlError::internal("cluster create operation carries no cluster id")
            })?;

        self.runner()
            .wait("Cluster Create", cluster_id.as_str(), op, deadline)
            .await?;

        info!(cluster_id = %cluster_id, name = %spec.name, "cluster created");
        Ok(cluster_id)
    }

    /// Fetch the observed state of a cluster, including its full host list.
    ///
    /// Returns `Ok(None)` when the cluster does not exist, so callers can
    /// distinguish deletion from a failed read.
    pub async fn read(&self, id: &ClusterId) -> ControlResult<Option<ObservedCluster>> {
        let cluster = match self.api.get_cluster(id.as_str()).await {
            Ok(cluster) => cluster,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(ControlError::operation("Cluster Get", id.as_str(), err)),
        };

        let hosts = self.list_all_hosts(id).await?;
        debug!(cluster_id = %id, hosts = hosts.len(), "cluster observed");
        Ok(Some(ObservedCluster { cluster, hosts }))
    }

    async fn list_all_hosts(&self, id: &ClusterId) -> ControlResult<Vec<Host>> {
        let mut hosts = Vec::new();
        let mut page_token = String::new();
        loop {
            let page = self
                .api
                .list_hosts(id.as_str(), &page_token)
                .await
                .map_err(|e| ControlError::operation("List Hosts", id.as_str(), e))?;
            let is_last = page.is_last();
            hosts.extend(page.hosts);
            if is_last {
                return Ok(hosts);
            }
            page_token = page.next_page_token;
        }
    }

    /// Reconcile a cluster from its last-applied document to a new one.
    ///
    /// The whole pass runs under one deadline: scalar attributes first, then
    /// the search tier in quorum-safe order, then the dashboard tier.
    pub async fn update(
        &self,
        id: &ClusterId,
        old: &ClusterSpec,
        new: &ClusterSpec,
    ) -> ControlResult<()> {
        let new_search = new.search_snapshot()?;
        if new_search.is_empty() {
            return Err(ControlError::validation(
                "the search tier needs at least one node group",
            ));
        }
        let old_search = old.search_snapshot()?;
        let old_dashboards = old.dashboard_snapshot()?;
        let new_dashboards = new.dashboard_snapshot()?;

        let deadline = Instant::now() + self.config.timeouts.update();
        let runner = self.runner();

        let req = cluster_update_request(id, old, new)?;
        if !req.is_empty() {
            debug!(cluster_id = %id, mask = ?req.update_mask, "updating cluster attributes");
            runner
                .run("Cluster Update", id.as_str(), deadline, || {
                    self.api.update_cluster(&req)
                })
                .await?;
        }

        let plan = plan_search_tier(&old_search, &new_search);
        if !plan.is_empty() {
            info!(cluster_id = %id, operations = plan.len(), "reconciling search tier");
        }
        for op in plan {
            match op {
                GroupOp::Create(group) => {
                    let req = AddNodeGroupRequest {
                        cluster_id: id.to_string(),
                        node_group: group,
                    };
                    runner
                        .run("Add NodeGroup", id.as_str(), deadline, || {
                            self.api.add_node_group(&req)
                        })
                        .await?;
                }
                GroupOp::Update(update) => {
                    let req = UpdateNodeGroupRequest {
                        cluster_id: id.to_string(),
                        name: update.new.name.clone(),
                        update_mask: mask_paths(&update.changed),
                        node_group: update.new,
                    };
                    runner
                        .run("Update NodeGroup", id.as_str(), deadline, || {
                            self.api.update_node_group(&req)
                        })
                        .await?;
                }
                GroupOp::Delete(group) => {
                    let req = DeleteNodeGroupRequest {
                        cluster_id: id.to_string(),
                        name: group.name,
                    };
                    runner
                        .run("Delete NodeGroup", id.as_str(), deadline, || {
                            self.api.delete_node_group(&req)
                        })
                        .await?;
                }
            }
        }

        let plan = plan_dashboard_tier(&old_dashboards, &new_dashboards);
        if !plan.is_empty() {
            info!(cluster_id = %id, operations = plan.len(), "reconciling dashboard tier");
        }
        for op in plan {
            match op {
                GroupOp::Create(group) => {
                    let req = AddDashboardsGroupRequest {
                        cluster_id: id.to_string(),
                        node_group: group,
                    };
                    runner
                        .run("Add Dashboards NodeGroup", id.as_str(), deadline, || {
                            self.api.add_dashboards_group(&req)
                        })
                        .await?;
                }
                GroupOp::Update(update) => {
                    let req = UpdateDashboardsGroupRequest {
                        cluster_id: id.to_string(),
                        name: update.new.name.clone(),
                        update_mask: mask_paths(&update.changed),
                        node_group: update.new,
                    };
                    runner
                        .run("Update Dashboards NodeGroup", id.as_str(), deadline, || {
                            self.api.update_dashboards_group(&req)
                        })
                        .await?;
                }
                GroupOp::Delete(group) => {
                    let req = DeleteDashboardsGroupRequest {
                        cluster_id: id.to_string(),
                        name: group.name,
                    };
                    runner
                        .run("Delete Dashboards NodeGroup", id.as_str(), deadline, || {
                            self.api.delete_dashboards_group(&req)
                        })
                        .await?;
                }
            }
        }

        info!(cluster_id = %id, "cluster reconciled");
        Ok(())
    }

    /// Delete a cluster.
    pub async fn delete(&self, id: &ClusterId) -> ControlResult<()> {
        let deadline = Instant::now() + self.config.timeouts.delete();
        self.runner()
            .run("Cluster Delete", id.as_str(), deadline, || {
                self.api.delete_cluster(id.as_str())
            })
            .await?;
        info!(cluster_id = %id, "cluster deleted");
        Ok(())
    }
}

/// Build the scalar-attribute update for a cluster, masked to the fields
/// that actually differ between the two documents.
fn cluster_update_request(
    id: &ClusterId,
    old: &ClusterSpec,
    new: &ClusterSpec,
) -> ControlResult<UpdateClusterRequest> {
    let mut req = UpdateClusterRequest::new(id.as_str());

    if old.name != new.name {
        req.update_mask.push("name".to_owned());
        req.name = Some(new.name.clone());
    }
    if old.description != new.description {
        req.update_mask.push("description".to_owned());
        req.description = Some(new.description.clone());
    }
    if old.labels != new.labels {
        req.update_mask.push("labels".to_owned());
        req.labels = Some(new.labels.clone());
    }
    if old.security_group_ids != new.security_group_ids {
        req.update_mask.push("security_group_ids".to_owned());
        req.security_group_ids = Some(new.security_group_ids.clone());
    }
    if old.service_account_id != new.service_account_id {
        req.update_mask.push("service_account_id".to_owned());
        req.service_account_id = new.service_account_id.clone();
    }
    if old.deletion_protection != new.deletion_protection {
        req.update_mask.push("deletion_protection".to_owned());
        req.deletion_protection = Some(new.deletion_protection);
    }
    if old.maintenance_window != new.maintenance_window {
        req.update_mask.push("maintenance_window".to_owned());
        req.maintenance_window = new.maintenance_window()?;
    }

    let mut config = ConfigUpdate::default();
    let mut config_changed = false;
    if old.config.version != new.config.version {
        req.update_mask.push("config.version".to_owned());
        config.version = Some(new.config.version.clone());
        config_changed = true;
    }
    if old.config.admin_password != new.config.admin_password {
        req.update_mask.push("config.admin_password".to_owned());
        config.admin_password = Some(new.config.admin_password.clone());
        config_changed = true;
    }
    if old.config.search.plugins != new.config.search.plugins {
        req.update_mask.push("config.search.plugins".to_owned());
        config.plugins = Some(new.config.search.plugins.clone());
        config_changed = true;
    }
    if config_changed {
        req.config = Some(config);
    }

    Ok(req)
}
