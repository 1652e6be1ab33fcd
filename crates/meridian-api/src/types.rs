//! Wire types for the managed search-cluster control plane.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role a search-tier host can carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeRole {
    /// Stores and serves index data.
    Data,
    /// Participates in cluster coordination; quorum among manager hosts
    /// must be maintained for the cluster to stay available.
    Manager,
}

impl NodeRole {
    /// Get the role name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Manager => "MANAGER",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DATA" => Ok(Self::Data),
            "MANAGER" => Ok(Self::Manager),
            _ => Err(format!("unknown node role: {s}")),
        }
    }
}

/// Hardware shape shared by every host in a node group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceShape {
    /// Identifier of the compute preset (CPU/memory class).
    pub resource_preset_id: String,
    /// Disk size in bytes.
    pub disk_size: u64,
    /// Disk type identifier.
    pub disk_type_id: String,
}

/// A named, independently scaled group of search-tier hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchNodeGroup {
    /// Group name, unique within the cluster.
    pub name: String,
    /// Hardware shape for every host in the group.
    pub resources: ResourceShape,
    /// Number of hosts in the group.
    pub hosts_count: u32,
    /// Availability zones the hosts are spread across.
    pub zone_ids: BTreeSet<String>,
    /// Subnets the hosts are attached to.
    #[serde(default)]
    pub subnet_ids: BTreeSet<String>,
    /// Whether hosts get a public address.
    #[serde(default)]
    pub assign_public_ip: bool,
    /// Roles carried by every host in the group.
    #[serde(default)]
    pub roles: BTreeSet<NodeRole>,
}

impl SearchNodeGroup {
    /// Returns true if this group's role set is exactly `{MANAGER}`.
    ///
    /// Dedicated manager groups carry no data and exist purely to hold
    /// coordination quorum.
    #[must_use]
    pub fn is_dedicated_manager(&self) -> bool {
        self.roles.len() == 1 && self.roles.contains(&NodeRole::Manager)
    }

    /// Returns true if the manager role is present, regardless of any
    /// other roles the group carries.
    #[must_use]
    pub fn has_manager_role(&self) -> bool {
        self.roles.contains(&NodeRole::Manager)
    }
}

/// A named group of dashboard-tier hosts.
///
/// Dashboard groups have no role concept; they never participate in
/// cluster coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardNodeGroup {
    /// Group name, unique within the cluster.
    pub name: String,
    /// Hardware shape for every host in the group.
    pub resources: ResourceShape,
    /// Number of hosts in the group.
    pub hosts_count: u32,
    /// Availability zones the hosts are spread across.
    pub zone_ids: BTreeSet<String>,
    /// Subnets the hosts are attached to.
    #[serde(default)]
    pub subnet_ids: BTreeSet<String>,
    /// Whether hosts get a public address.
    #[serde(default)]
    pub assign_public_ip: bool,
}

/// Deployment environment of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    /// Stable production environment.
    Production,
    /// Pre-release environment with earlier maintenance rollout.
    Prestable,
}

impl Environment {
    /// Get the environment name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "PRODUCTION",
            Self::Prestable => "PRESTABLE",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRODUCTION" => Ok(Self::Production),
            "PRESTABLE" => Ok(Self::Prestable),
            _ => Err(format!("unknown environment: {s}")),
        }
    }
}

/// Day of week for a weekly maintenance window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekDay {
    /// Get the weekday name as used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mon => "MON",
            Self::Tue => "TUE",
            Self::Wed => "WED",
            Self::Thu => "THU",
            Self::Fri => "FRI",
            Self::Sat => "SAT",
            Self::Sun => "SUN",
        }
    }
}

impl std::str::FromStr for WeekDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MON" => Ok(Self::Mon),
            "TUE" => Ok(Self::Tue),
            "WED" => Ok(Self::Wed),
            "THU" => Ok(Self::Thu),
            "FRI" => Ok(Self::Fri),
            "SAT" => Ok(Self::Sat),
            "SUN" => Ok(Self::Sun),
            _ => Err(format!("unknown week day: {s}")),
        }
    }
}

/// Maintenance window for planned cluster operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceWindow {
    /// Maintenance may run at any time.
    Anytime,
    /// Maintenance runs within a fixed weekly slot.
    Weekly {
        /// Day of the week.
        day: WeekDay,
        /// Hour of the day, 1-24.
        hour: u8,
    },
}

/// Search-tier configuration of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Node groups of the search tier.
    pub node_groups: Vec<SearchNodeGroup>,
    /// Plugins enabled on the cluster.
    #[serde(default)]
    pub plugins: BTreeSet<String>,
}

/// Dashboard-tier configuration of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardsConfig {
    /// Node groups of the dashboard tier.
    pub node_groups: Vec<DashboardNodeGroup>,
}

/// Full cluster configuration as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Search engine version.
    #[serde(default)]
    pub version: String,
    /// Admin password; write-only, never returned by the control plane.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    /// Search-tier configuration.
    pub search: SearchConfig,
    /// Dashboard-tier configuration, if the tier exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboards: Option<DashboardsConfig>,
}

/// A cluster as observed from the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Unique cluster identifier.
    pub id: String,
    /// Folder the cluster belongs to.
    pub folder_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Cluster name, unique within the folder.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// User labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Deployment environment.
    pub environment: Environment,
    /// Cluster configuration.
    pub config: ClusterConfig,
    /// Network the cluster is attached to.
    pub network_id: String,
    /// Aggregated cluster health.
    #[serde(default)]
    pub health: String,
    /// Current cluster status.
    #[serde(default)]
    pub status: String,
    /// User security groups.
    #[serde(default)]
    pub security_group_ids: BTreeSet<String>,
    /// Service account used by the cluster.
    #[serde(default)]
    pub service_account_id: Option<String>,
    /// Whether the cluster is protected from deletion.
    #[serde(default)]
    pub deletion_protection: bool,
    /// Maintenance window, if configured.
    #[serde(default)]
    pub maintenance_window: Option<MaintenanceWindow>,
}

/// A single cluster host as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Fully qualified domain name.
    pub fqdn: String,
    /// Availability zone the host runs in.
    pub zone_id: String,
    /// Host tier, e.g. `OPENSEARCH` or `DASHBOARDS`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Roles assigned to the host.
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Whether the host has a public address.
    #[serde(default)]
    pub assign_public_ip: bool,
    /// Subnet the host is attached to.
    #[serde(default)]
    pub subnet_id: String,
}

/// One page of the host listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostPage {
    /// Hosts on this page.
    pub hosts: Vec<Host>,
    /// Cursor for the next page; empty or `"0"` when exhausted.
    #[serde(default)]
    pub next_page_token: String,
}

impl HostPage {
    /// Returns true if this is the last page of the listing.
    ///
    /// The control plane signals the end of the cursor with either an
    /// empty token or the `"0"` sentinel.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_empty() || self.next_page_token == "0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with_roles(roles: &[NodeRole]) -> SearchNodeGroup {
        SearchNodeGroup {
            name: "group".to_owned(),
            resources: ResourceShape {
                resource_preset_id: "s2.small".to_owned(),
                disk_size: 10_737_418_240,
                disk_type_id: "network-ssd".to_owned(),
            },
            hosts_count: 3,
            zone_ids: BTreeSet::from(["zone-a".to_owned()]),
            subnet_ids: BTreeSet::new(),
            assign_public_ip: false,
            roles: roles.iter().copied().collect(),
        }
    }

    #[test]
    fn dedicated_manager_requires_exactly_the_manager_role() {
        // All four subsets of {DATA, MANAGER}.
        assert!(!group_with_roles(&[]).is_dedicated_manager());
        assert!(!group_with_roles(&[NodeRole::Data]).is_dedicated_manager());
        assert!(group_with_roles(&[NodeRole::Manager]).is_dedicated_manager());
        assert!(!group_with_roles(&[NodeRole::Data, NodeRole::Manager]).is_dedicated_manager());
    }

    #[test]
    fn has_manager_role_ignores_other_roles() {
        assert!(!group_with_roles(&[]).has_manager_role());
        assert!(!group_with_roles(&[NodeRole::Data]).has_manager_role());
        assert!(group_with_roles(&[NodeRole::Manager]).has_manager_role());
        assert!(group_with_roles(&[NodeRole::Data, NodeRole::Manager]).has_manager_role());
    }

    #[test]
    fn node_role_round_trips_through_wire_names() {
        for role in [NodeRole::Data, NodeRole::Manager] {
            assert_eq!(role.as_str().parse::<NodeRole>().unwrap(), role);
        }
        assert!("COORDINATOR".parse::<NodeRole>().is_err());
    }

    #[test]
    fn environment_parsing_rejects_unknown_values() {
        assert_eq!(
            "PRODUCTION".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "PRESTABLE".parse::<Environment>().unwrap(),
            Environment::Prestable
        );
        assert!("STAGING".parse::<Environment>().is_err());
    }

    #[test]
    fn host_page_sentinel_tokens_end_pagination() {
        let page = |token: &str| HostPage {
            hosts: Vec::new(),
            next_page_token: token.to_owned(),
        };
        assert!(page("").is_last());
        assert!(page("0").is_last());
        assert!(!page("42").is_last());
    }

    #[test]
    fn maintenance_window_serialises_with_tagged_type() {
        let weekly = MaintenanceWindow::Weekly {
            day: WeekDay::Tue,
            hour: 4,
        };
        let json = serde_json::to_value(weekly).unwrap();
        assert_eq!(json["type"], "WEEKLY");
        assert_eq!(json["day"], "TUE");
        assert_eq!(json["hour"], 4);
    }
}
