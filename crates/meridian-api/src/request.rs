//! Mutation request types.
//!
//! Update requests carry an explicit `update_mask`: the list of field paths
//! the control plane is allowed to touch. A request whose mask is empty is a
//! no-op and must not be sent.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{
    ClusterConfig, DashboardNodeGroup, Environment, MaintenanceWindow, SearchNodeGroup,
};

/// Request to create a whole cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClusterRequest {
    /// Cluster name, unique within the folder.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// User labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Folder to create the cluster in.
    pub folder_id: String,
    /// Deployment environment.
    pub environment: Environment,
    /// Network to attach the cluster to.
    pub network_id: String,
    /// Initial cluster configuration, including both tiers.
    pub config: ClusterConfig,
    /// User security groups.
    #[serde(default)]
    pub security_group_ids: BTreeSet<String>,
    /// Service account for the cluster.
    #[serde(default)]
    pub service_account_id: Option<String>,
    /// Whether to protect the cluster from deletion.
    #[serde(default)]
    pub deletion_protection: bool,
    /// Maintenance window.
    #[serde(default)]
    pub maintenance_window: Option<MaintenanceWindow>,
}

/// Scalar-field portion of a cluster configuration update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// New search engine version, when `config.version` is masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// New admin password, when `config.admin_password` is masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    /// New plugin set, when `config.search.plugins` is masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<BTreeSet<String>>,
}

/// Request to update whole-cluster scalar attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClusterRequest {
    /// Cluster to update.
    pub cluster_id: String,
    /// Field paths the control plane may touch.
    pub update_mask: Vec<String>,
    /// New name, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New labels, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    /// Scalar configuration changes, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigUpdate>,
    /// New security groups, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<BTreeSet<String>>,
    /// New service account, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<String>,
    /// New deletion-protection flag, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_protection: Option<bool>,
    /// New maintenance window, when masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_window: Option<MaintenanceWindow>,
}

impl UpdateClusterRequest {
    /// Create an empty update for the given cluster.
    #[must_use]
    pub fn new(cluster_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            update_mask: Vec::new(),
            name: None,
            description: None,
            labels: None,
            config: None,
            security_group_ids: None,
            service_account_id: None,
            deletion_protection: None,
            maintenance_window: None,
        }
    }

    /// Returns true if the request would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.update_mask.is_empty()
    }
}

/// Request to add a search-tier node group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNodeGroupRequest {
    /// Cluster to add the group to.
    pub cluster_id: String,
    /// Specification of the new group.
    pub node_group: SearchNodeGroup,
}

/// Request to update a search-tier node group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNodeGroupRequest {
    /// Cluster the group belongs to.
    pub cluster_id: String,
    /// Name of the group to update.
    pub name: String,
    /// Field paths the control plane may touch.
    pub update_mask: Vec<String>,
    /// Desired state of the group.
    pub node_group: SearchNodeGroup,
}

impl UpdateNodeGroupRequest {
    /// Returns true if the request would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.update_mask.is_empty()
    }
}

/// Request to delete a search-tier node group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteNodeGroupRequest {
    /// Cluster the group belongs to.
    pub cluster_id: String,
    /// Name of the group to delete.
    pub name: String,
}

/// Request to add a dashboard-tier node group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDashboardsGroupRequest {
    /// Cluster to add the group to.
    pub cluster_id: String,
    /// Specification of the new group.
    pub node_group: DashboardNodeGroup,
}

/// Request to update a dashboard-tier node group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDashboardsGroupRequest {
    /// Cluster the group belongs to.
    pub cluster_id: String,
    /// Name of the group to update.
    pub name: String,
    /// Field paths the control plane may touch.
    pub update_mask: Vec<String>,
    /// Desired state of the group.
    pub node_group: DashboardNodeGroup,
}

impl UpdateDashboardsGroupRequest {
    /// Returns true if the request would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.update_mask.is_empty()
    }
}

/// Request to delete a dashboard-tier node group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDashboardsGroupRequest {
    /// Cluster the group belongs to.
    pub cluster_id: String,
    /// Name of the group to delete.
    pub name: String,
}
