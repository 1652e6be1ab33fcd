//! The desired-state document describing a cluster.
//!
//! A [`ClusterSpec`] is what an operator writes: cluster identity, scalar
//! attributes, and the node-group topology of both tiers. Raw string fields
//! (environment, maintenance weekday) are validated here, before anything is
//! sent to the control plane.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use meridian_api::{
    Cluster, DashboardNodeGroup, Environment, Host, MaintenanceWindow, SearchNodeGroup, WeekDay,
};

use crate::error::{ControlError, ControlResult};
use crate::snapshot::GroupSnapshot;

/// Unique identifier for a cluster, assigned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(String);

impl ClusterId {
    /// Create a cluster ID from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ClusterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A cluster as observed from the control plane: its attributes plus the
/// live host list, refreshed on every read.
#[derive(Debug, Clone)]
pub struct ObservedCluster {
    /// Cluster attributes and configuration.
    pub cluster: Cluster,
    /// All hosts currently in the cluster.
    pub hosts: Vec<Host>,
}

/// Desired state of a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster name, unique within the folder.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// User labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Deployment environment, e.g. `PRODUCTION`.
    pub environment: String,
    /// Folder to place the cluster in.
    pub folder_id: String,
    /// Network the cluster attaches to.
    pub network_id: String,
    /// User security groups.
    #[serde(default)]
    pub security_group_ids: BTreeSet<String>,
    /// Service account for the cluster.
    #[serde(default)]
    pub service_account_id: Option<String>,
    /// Whether the cluster is protected from deletion.
    #[serde(default)]
    pub deletion_protection: bool,
    /// Maintenance window.
    #[serde(default)]
    pub maintenance_window: Option<MaintenanceWindowSpec>,
    /// Tier configuration.
    pub config: ConfigSpec,
}

/// Configuration section of the desired-state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSpec {
    /// Search engine version.
    #[serde(default)]
    pub version: String,
    /// Admin password.
    pub admin_password: String,
    /// Search-tier topology.
    pub search: SearchTierSpec,
    /// Dashboard-tier topology, if the tier is wanted.
    #[serde(default)]
    pub dashboards: Option<DashboardTierSpec>,
}

/// Search-tier section of the desired-state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTierSpec {
    /// Node groups of the search tier, in document order.
    pub node_groups: Vec<SearchNodeGroup>,
    /// Plugins to enable.
    #[serde(default)]
    pub plugins: BTreeSet<String>,
}

/// Dashboard-tier section of the desired-state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardTierSpec {
    /// Node groups of the dashboard tier, in document order.
    pub node_groups: Vec<DashboardNodeGroup>,
}

/// Raw maintenance-window section, validated by [`MaintenanceWindowSpec::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceWindowSpec {
    /// Window type: `ANYTIME` or `WEEKLY`.
    #[serde(rename = "type")]
    pub window_type: String,
    /// Day of week for weekly windows, `MON`..`SUN`.
    #[serde(default)]
    pub day: Option<String>,
    /// Hour of day for weekly windows, 1-24.
    #[serde(default)]
    pub hour: Option<u8>,
}

impl MaintenanceWindowSpec {
    /// Validate the raw section into a wire-level window.
    pub fn resolve(&self) -> ControlResult<MaintenanceWindow> {
        match self.window_type.as_str() {
            "ANYTIME" => Ok(MaintenanceWindow::Anytime),
            "WEEKLY" => {
                let day = self
                    .day
                    .as_deref()
                    .ok_or_else(|| ControlError::validation("weekly maintenance window needs a day"))?
                    .parse::<WeekDay>()
                    .map_err(ControlError::Validation)?;
                let hour = self.hour.ok_or_else(|| {
                    ControlError::validation("weekly maintenance window needs an hour")
                })?;
                if !(1..=24).contains(&hour) {
                    return Err(ControlError::validation(format!(
                        "maintenance window hour must be within 1..24, got {hour}"
                    )));
                }
                Ok(MaintenanceWindow::Weekly { day, hour })
            }
            other => Err(ControlError::validation(format!(
                "unknown maintenance window type: {other}"
            ))),
        }
    }
}

impl ClusterSpec {
    /// Parse and validate the environment field.
    pub fn environment(&self) -> ControlResult<Environment> {
        self.environment
            .parse::<Environment>()
            .map_err(ControlError::Validation)
    }

    /// Validate the maintenance window, if present.
    pub fn maintenance_window(&self) -> ControlResult<Option<MaintenanceWindow>> {
        self.maintenance_window
            .as_ref()
            .map(MaintenanceWindowSpec::resolve)
            .transpose()
    }

    /// Build the search-tier snapshot from this document.
    pub fn search_snapshot(&self) -> ControlResult<GroupSnapshot<SearchNodeGroup>> {
        GroupSnapshot::from_groups(self.config.search.node_groups.clone())
    }

    /// Build the dashboard-tier snapshot from this document.
    ///
    /// An absent dashboards section yields an empty snapshot, which the
    /// planner turns into deletion of any remaining dashboard groups.
    pub fn dashboard_snapshot(&self) -> ControlResult<GroupSnapshot<DashboardNodeGroup>> {
        match &self.config.dashboards {
            Some(tier) => GroupSnapshot::from_groups(tier.node_groups.clone()),
            None => Ok(GroupSnapshot::default()),
        }
    }
}

/// Returns true if the node-group topology differs between two documents.
///
/// Used by the surrounding shell to know the observed host list must be
/// refreshed after an update pass.
#[must_use]
pub fn topology_changed(old: &ClusterSpec, new: &ClusterSpec) -> bool {
    if old.config.search.node_groups != new.config.search.node_groups {
        return true;
    }
    let old_dashboards = old.config.dashboards.as_ref().map(|d| &d.node_groups);
    let new_dashboards = new.config.dashboards.as_ref().map(|d| &d.node_groups);
    old_dashboards != new_dashboards
}
