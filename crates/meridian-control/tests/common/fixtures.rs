//! Test fixtures for controller integration tests.

use std::collections::{BTreeMap, BTreeSet};

use meridian_api::types::{DashboardNodeGroup, Host, NodeRole, ResourceShape, SearchNodeGroup};
use meridian_control::spec::{ConfigSpec, DashboardTierSpec, SearchTierSpec};
use meridian_control::ClusterSpec;

/// Hardware shape shared by every fixture group.
pub fn resource_shape() -> ResourceShape {
    ResourceShape {
        resource_preset_id: "s2.small".to_string(),
        disk_size: 10_737_418_240,
        disk_type_id: "network-ssd".to_string(),
    }
}

/// Builder for search-tier node groups.
pub struct GroupBuilder {
    name: String,
    hosts_count: u32,
    zone_ids: BTreeSet<String>,
    roles: BTreeSet<NodeRole>,
    assign_public_ip: bool,
}

impl GroupBuilder {
    /// Creates a data-role group builder with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hosts_count: 3,
            zone_ids: BTreeSet::from(["zone-a".to_string()]),
            roles: BTreeSet::from([NodeRole::Data]),
            assign_public_ip: false,
        }
    }

    /// Sets the host count.
    pub fn with_hosts(mut self, hosts_count: u32) -> Self {
        self.hosts_count = hosts_count;
        self
    }

    /// Replaces the role set.
    pub fn with_roles(mut self, roles: &[NodeRole]) -> Self {
        self.roles = roles.iter().copied().collect();
        self
    }

    /// Makes this a dedicated manager group.
    pub fn dedicated_manager(self) -> Self {
        self.with_roles(&[NodeRole::Manager])
    }

    /// Adds an availability zone.
    pub fn with_zone(mut self, zone: &str) -> Self {
        self.zone_ids.insert(zone.to_string());
        self
    }

    pub fn build(self) -> SearchNodeGroup {
        SearchNodeGroup {
            name: self.name,
            resources: resource_shape(),
            hosts_count: self.hosts_count,
            zone_ids: self.zone_ids,
            subnet_ids: BTreeSet::new(),
            assign_public_ip: self.assign_public_ip,
            roles: self.roles,
        }
    }
}

/// Creates a dashboard-tier node group.
pub fn dashboard_group(name: &str, hosts_count: u32) -> DashboardNodeGroup {
    DashboardNodeGroup {
        name: name.to_string(),
        resources: resource_shape(),
        hosts_count,
        zone_ids: BTreeSet::from(["zone-a".to_string()]),
        subnet_ids: BTreeSet::new(),
        assign_public_ip: false,
    }
}

/// Creates a numbered search-tier host for listing fixtures.
pub fn host(n: u32) -> Host {
    Host {
        fqdn: format!("host-{n}.db.local"),
        zone_id: "zone-a".to_string(),
        kind: "OPENSEARCH".to_string(),
        roles: BTreeSet::from(["DATA".to_string()]),
        assign_public_ip: false,
        subnet_id: "subnet-a".to_string(),
    }
}

/// Builder for desired-state documents.
pub struct SpecBuilder {
    name: String,
    description: String,
    deletion_protection: bool,
    version: String,
    plugins: BTreeSet<String>,
    groups: Vec<SearchNodeGroup>,
    dashboards: Option<Vec<DashboardNodeGroup>>,
}

impl SpecBuilder {
    /// Creates a builder for a cluster with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            deletion_protection: false,
            version: "2.8".to_string(),
            plugins: BTreeSet::new(),
            groups: Vec::new(),
            dashboards: None,
        }
    }

    /// Adds a search-tier node group.
    pub fn with_group(mut self, group: SearchNodeGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Adds a dashboard-tier node group.
    pub fn with_dashboard_group(mut self, group: DashboardNodeGroup) -> Self {
        self.dashboards.get_or_insert_with(Vec::new).push(group);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Sets the engine version.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Enables a plugin.
    pub fn with_plugin(mut self, plugin: &str) -> Self {
        self.plugins.insert(plugin.to_string());
        self
    }

    pub fn build(self) -> ClusterSpec {
        ClusterSpec {
            name: self.name,
            description: self.description,
            labels: BTreeMap::new(),
            environment: "PRODUCTION".to_string(),
            folder_id: "folder-1".to_string(),
            network_id: "net-1".to_string(),
            security_group_ids: BTreeSet::new(),
            service_account_id: None,
            deletion_protection: self.deletion_protection,
            maintenance_window: None,
            config: ConfigSpec {
                version: self.version,
                admin_password: "secret".to_string(),
                search: SearchTierSpec {
                    node_groups: self.groups,
                    plugins: self.plugins,
                },
                dashboards: self
                    .dashboards
                    .map(|node_groups| DashboardTierSpec { node_groups }),
            },
        }
    }
}
