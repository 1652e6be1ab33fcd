//! Node-group reconciliation planning.
//!
//! Given an old and a new snapshot of one tier, the planner computes the
//! ordered sequence of remote operations that transforms the former into the
//! latter. The search tier is the interesting case: manager-role capacity
//! must never drop below quorum mid-transition, so the plan grows dedicated
//! manager groups before any manager presence shrinks anywhere, and shrinks
//! dedicated manager groups only after every other change has applied.
//!
//! The planners are pure: they never talk to the control plane and hold no
//! state. [`crate::controller::ClusterController`] executes their output one
//! operation at a time.

use meridian_api::{DashboardNodeGroup, SearchNodeGroup};

use crate::snapshot::GroupSnapshot;

/// A mutable node-group field, as named in update masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    /// Hardware shape.
    Resources,
    /// Host count.
    HostsCount,
    /// Availability zones.
    ZoneIds,
    /// Subnets.
    SubnetIds,
    /// Public address flag.
    AssignPublicIp,
    /// Role set (search tier only).
    Roles,
}

impl GroupField {
    /// Field path as used in an update mask.
    #[must_use]
    pub const fn mask_path(&self) -> &'static str {
        match self {
            Self::Resources => "resources",
            Self::HostsCount => "hosts_count",
            Self::ZoneIds => "zone_ids",
            Self::SubnetIds => "subnet_ids",
            Self::AssignPublicIp => "assign_public_ip",
            Self::Roles => "roles",
        }
    }
}

/// Build update-mask paths from a change list.
#[must_use]
pub fn mask_paths(changed: &[GroupField]) -> Vec<String> {
    changed.iter().map(|f| f.mask_path().to_owned()).collect()
}

/// An in-place change of one node group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupUpdate<G> {
    /// Last-applied state of the group.
    pub old: G,
    /// Desired state of the group.
    pub new: G,
    /// Fields that differ, in declaration order.
    pub changed: Vec<GroupField>,
}

/// One operation of a reconciliation plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOp<G> {
    /// Create a group that exists only in the new snapshot.
    Create(G),
    /// Update a group present in both snapshots.
    Update(GroupUpdate<G>),
    /// Delete a group that exists only in the old snapshot.
    Delete(G),
}

impl<G: crate::snapshot::NamedGroup> GroupOp<G> {
    /// Name of the group this operation touches.
    #[must_use]
    pub fn group_name(&self) -> &str {
        match self {
            Self::Create(g) | Self::Delete(g) => g.name(),
            Self::Update(u) => u.new.name(),
        }
    }
}

/// Compute the changed fields between two search-tier specs of the same name.
#[must_use]
pub fn search_group_changes(old: &SearchNodeGroup, new: &SearchNodeGroup) -> Vec<GroupField> {
    let mut changed = Vec::new();
    if old.resources != new.resources {
        changed.push(GroupField::Resources);
    }
    if old.hosts_count != new.hosts_count {
        changed.push(GroupField::HostsCount);
    }
    if old.zone_ids != new.zone_ids {
        changed.push(GroupField::ZoneIds);
    }
    if old.subnet_ids != new.subnet_ids {
        changed.push(GroupField::SubnetIds);
    }
    if old.assign_public_ip != new.assign_public_ip {
        changed.push(GroupField::AssignPublicIp);
    }
    if old.roles != new.roles {
        changed.push(GroupField::Roles);
    }
    changed
}

/// Compute the changed fields between two dashboard-tier specs of the same name.
#[must_use]
pub fn dashboard_group_changes(
    old: &DashboardNodeGroup,
    new: &DashboardNodeGroup,
) -> Vec<GroupField> {
    let mut changed = Vec::new();
    if old.resources != new.resources {
        changed.push(GroupField::Resources);
    }
    if old.hosts_count != new.hosts_count {
        changed.push(GroupField::HostsCount);
    }
    if old.zone_ids != new.zone_ids {
        changed.push(GroupField::ZoneIds);
    }
    if old.subnet_ids != new.subnet_ids {
        changed.push(GroupField::SubnetIds);
    }
    if old.assign_public_ip != new.assign_public_ip {
        changed.push(GroupField::AssignPublicIp);
    }
    changed
}

/// Execution phase a search-tier update is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateBucket {
    /// Dedicated manager group growing; runs before anything else shrinks.
    ManagersToIncrease,
    /// Mixed-role group losing manager capacity (fewer hosts, or the
    /// manager role itself); runs right after manager growth.
    DataManagersToDecrease,
    /// Everything without quorum impact.
    OtherGroups,
    /// Dedicated manager group shrinking; runs last.
    ManagersToDecrease,
}

/// Route one update candidate into its execution phase.
///
/// Routing follows the *new* spec's classification. A non-dedicated group
/// that carried the manager role before but no longer does is a decrease
/// even when its host count is unchanged or growing: losing a manager is
/// itself a quorum event.
#[must_use]
pub fn route_update(old: &SearchNodeGroup, new: &SearchNodeGroup) -> UpdateBucket {
    if new.is_dedicated_manager() {
        if new.hosts_count > old.hosts_count {
            UpdateBucket::ManagersToIncrease
        } else if new.hosts_count < old.hosts_count {
            UpdateBucket::ManagersToDecrease
        } else {
            UpdateBucket::OtherGroups
        }
    } else if (new.has_manager_role() && new.hosts_count < old.hosts_count)
        || (old.has_manager_role() && !new.has_manager_role())
    {
        UpdateBucket::DataManagersToDecrease
    } else {
        UpdateBucket::OtherGroups
    }
}

/// Compute the ordered search-tier plan.
///
/// The emitted order is fixed:
///
/// 1. creations, dedicated manager groups first
/// 2. dedicated manager groups growing
/// 3. mixed data/manager groups losing manager capacity
/// 4. all other updates
/// 5. deletions
/// 6. dedicated manager groups shrinking
#[must_use]
pub fn plan_search_tier(
    old: &GroupSnapshot<SearchNodeGroup>,
    new: &GroupSnapshot<SearchNodeGroup>,
) -> Vec<GroupOp<SearchNodeGroup>> {
    let mut creates: Vec<SearchNodeGroup> = Vec::new();
    for group in new {
        if !old.contains(&group.name) {
            if group.is_dedicated_manager() {
                // New manager capacity must exist before anything depends on it.
                creates.insert(0, group.clone());
            } else {
                creates.push(group.clone());
            }
        }
    }

    let mut managers_to_increase = Vec::new();
    let mut data_managers_to_decrease = Vec::new();
    let mut other_groups = Vec::new();
    let mut managers_to_decrease = Vec::new();

    for new_group in new {
        let Some(old_group) = old.get(&new_group.name) else {
            continue;
        };
        let changed = search_group_changes(old_group, new_group);
        if changed.is_empty() {
            continue;
        }
        let update = GroupUpdate {
            old: old_group.clone(),
            new: new_group.clone(),
            changed,
        };
        match route_update(old_group, new_group) {
            UpdateBucket::ManagersToIncrease => managers_to_increase.push(update),
            UpdateBucket::DataManagersToDecrease => data_managers_to_decrease.push(update),
            UpdateBucket::OtherGroups => other_groups.push(update),
            UpdateBucket::ManagersToDecrease => managers_to_decrease.push(update),
        }
    }

    let deletes = old
        .iter()
        .filter(|g| !new.contains(&g.name))
        .cloned()
        .collect::<Vec<_>>();

    let mut plan = Vec::new();
    plan.extend(creates.into_iter().map(GroupOp::Create));
    plan.extend(managers_to_increase.into_iter().map(GroupOp::Update));
    plan.extend(data_managers_to_decrease.into_iter().map(GroupOp::Update));
    plan.extend(other_groups.into_iter().map(GroupOp::Update));
    plan.extend(deletes.into_iter().map(GroupOp::Delete));
    plan.extend(managers_to_decrease.into_iter().map(GroupOp::Update));
    plan
}

/// Compute the ordered dashboard-tier plan.
///
/// Dashboard groups carry no manager role, so no quorum ordering applies:
/// creations, then updates, then deletions, each in snapshot order.
#[must_use]
pub fn plan_dashboard_tier(
    old: &GroupSnapshot<DashboardNodeGroup>,
    new: &GroupSnapshot<DashboardNodeGroup>,
) -> Vec<GroupOp<DashboardNodeGroup>> {
    let mut plan = Vec::new();

    for group in new {
        if !old.contains(&group.name) {
            plan.push(GroupOp::Create(group.clone()));
        }
    }

    for new_group in new {
        let Some(old_group) = old.get(&new_group.name) else {
            continue;
        };
        let changed = dashboard_group_changes(old_group, new_group);
        if changed.is_empty() {
            continue;
        }
        plan.push(GroupOp::Update(GroupUpdate {
            old: old_group.clone(),
            new: new_group.clone(),
            changed,
        }));
    }

    for group in old {
        if !new.contains(&group.name) {
            plan.push(GroupOp::Delete(group.clone()));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use meridian_api::{NodeRole, ResourceShape};

    use super::*;

    fn shape() -> ResourceShape {
        ResourceShape {
            resource_preset_id: "s2.small".to_owned(),
            disk_size: 10_737_418_240,
            disk_type_id: "network-ssd".to_owned(),
        }
    }

    fn group(name: &str, hosts: u32, roles: &[NodeRole]) -> SearchNodeGroup {
        SearchNodeGroup {
            name: name.to_owned(),
            resources: shape(),
            hosts_count: hosts,
            zone_ids: BTreeSet::from(["zone-a".to_owned()]),
            subnet_ids: BTreeSet::new(),
            assign_public_ip: false,
            roles: roles.iter().copied().collect(),
        }
    }

    fn snapshot(groups: Vec<SearchNodeGroup>) -> GroupSnapshot<SearchNodeGroup> {
        GroupSnapshot::from_groups(groups).unwrap()
    }

    fn dashboard(name: &str, hosts: u32) -> DashboardNodeGroup {
        DashboardNodeGroup {
            name: name.to_owned(),
            resources: shape(),
            hosts_count: hosts,
            zone_ids: BTreeSet::from(["zone-a".to_owned()]),
            subnet_ids: BTreeSet::new(),
            assign_public_ip: false,
        }
    }

    /// Apply a plan to the old snapshot as a state-transition function.
    fn apply(
        old: &GroupSnapshot<SearchNodeGroup>,
        plan: &[GroupOp<SearchNodeGroup>],
    ) -> HashMap<String, SearchNodeGroup> {
        let mut state: HashMap<String, SearchNodeGroup> =
            old.iter().map(|g| (g.name.clone(), g.clone())).collect();
        for op in plan {
            match op {
                GroupOp::Create(g) => {
                    assert!(state.insert(g.name.clone(), g.clone()).is_none());
                }
                GroupOp::Update(u) => {
                    assert!(state.insert(u.new.name.clone(), u.new.clone()).is_some());
                }
                GroupOp::Delete(g) => {
                    assert!(state.remove(&g.name).is_some());
                }
            }
        }
        state
    }

    #[test]
    fn identical_snapshots_yield_empty_plan() {
        let old = snapshot(vec![
            group("managers", 3, &[NodeRole::Manager]),
            group("data", 4, &[NodeRole::Data]),
        ]);
        let new = snapshot(vec![
            group("managers", 3, &[NodeRole::Manager]),
            group("data", 4, &[NodeRole::Data]),
        ]);
        assert!(plan_search_tier(&old, &new).is_empty());
    }

    #[test]
    fn resize_emits_single_update_with_hosts_count_change() {
        // Scenario: dedicated manager group grows from 3 to 5 hosts.
        let old = snapshot(vec![group("managers", 3, &[NodeRole::Manager])]);
        let new = snapshot(vec![group("managers", 5, &[NodeRole::Manager])]);

        let plan = plan_search_tier(&old, &new);
        assert_eq!(plan.len(), 1);
        match &plan[0] {
            GroupOp::Update(u) => {
                assert_eq!(u.changed, vec![GroupField::HostsCount]);
                assert_eq!(u.old.hosts_count, 3);
                assert_eq!(u.new.hosts_count, 5);
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert_eq!(
            route_update(old.get("managers").unwrap(), new.get("managers").unwrap()),
            UpdateBucket::ManagersToIncrease
        );
    }

    #[test]
    fn dedicated_manager_shrink_runs_after_everything_else() {
        // Scenario: managers shrink 5 -> 3 while a data group changes zones.
        let mut resized_data = group("data", 2, &[NodeRole::Data]);
        resized_data.zone_ids.insert("zone-b".to_owned());

        let old = snapshot(vec![
            group("managers", 5, &[NodeRole::Manager]),
            group("data", 2, &[NodeRole::Data]),
        ]);
        let new = snapshot(vec![
            group("managers", 3, &[NodeRole::Manager]),
            resized_data,
        ]);

        let plan = plan_search_tier(&old, &new);
        let names: Vec<_> = plan.iter().map(GroupOp::group_name).collect();
        assert_eq!(names, vec!["data", "managers"]);
        assert_eq!(
            route_update(old.get("managers").unwrap(), new.get("managers").unwrap()),
            UpdateBucket::ManagersToDecrease
        );
    }

    #[test]
    fn manager_role_removed_routes_to_decrease_bucket() {
        // Losing the manager role is a quorum event even with the host
        // count unchanged.
        let old_group = group("mixed", 3, &[NodeRole::Data, NodeRole::Manager]);
        let new_group = group("mixed", 3, &[NodeRole::Data]);
        assert_eq!(
            route_update(&old_group, &new_group),
            UpdateBucket::DataManagersToDecrease
        );

        // Same when the group is growing at the same time.
        let growing = group("mixed", 5, &[NodeRole::Data]);
        assert_eq!(
            route_update(&old_group, &growing),
            UpdateBucket::DataManagersToDecrease
        );

        let plan = plan_search_tier(
            &snapshot(vec![old_group]),
            &snapshot(vec![new_group.clone()]),
        );
        assert_eq!(plan.len(), 1);
        match &plan[0] {
            GroupOp::Update(u) => assert_eq!(u.changed, vec![GroupField::Roles]),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn mixed_group_shrinking_with_manager_role_is_a_decrease() {
        let old_group = group("mixed", 4, &[NodeRole::Data, NodeRole::Manager]);
        let new_group = group("mixed", 3, &[NodeRole::Data, NodeRole::Manager]);
        assert_eq!(
            route_update(&old_group, &new_group),
            UpdateBucket::DataManagersToDecrease
        );
    }

    #[test]
    fn routing_follows_the_new_classification() {
        // Dedicated manager becoming mixed, same host count: no quorum
        // impact under the new classification.
        let old_group = group("flex", 3, &[NodeRole::Manager]);
        let new_group = group("flex", 3, &[NodeRole::Data, NodeRole::Manager]);
        assert_eq!(route_update(&old_group, &new_group), UpdateBucket::OtherGroups);

        // Mixed becoming dedicated manager, same host count.
        let old_group = group("flex", 3, &[NodeRole::Data, NodeRole::Manager]);
        let new_group = group("flex", 3, &[NodeRole::Manager]);
        assert_eq!(route_update(&old_group, &new_group), UpdateBucket::OtherGroups);
    }

    #[test]
    fn growing_mixed_manager_group_is_not_a_decrease() {
        let old_group = group("mixed", 3, &[NodeRole::Data, NodeRole::Manager]);
        let new_group = group("mixed", 5, &[NodeRole::Data, NodeRole::Manager]);
        assert_eq!(route_update(&old_group, &new_group), UpdateBucket::OtherGroups);
    }

    #[test]
    fn creation_puts_dedicated_managers_first() {
        // Scenario: empty cluster gains a manager group listed second.
        let old = GroupSnapshot::default();
        let new = snapshot(vec![
            group("data", 2, &[NodeRole::Data]),
            group("managers", 3, &[NodeRole::Manager]),
        ]);

        let plan = plan_search_tier(&old, &new);
        let names: Vec<_> = plan.iter().map(GroupOp::group_name).collect();
        assert_eq!(names, vec!["managers", "data"]);
        assert!(matches!(plan[0], GroupOp::Create(_)));
        assert!(matches!(plan[1], GroupOp::Create(_)));
    }

    #[test]
    fn full_plan_follows_the_fixed_phase_order() {
        // Old topology, listed in an order unrelated to the phase order.
        let old = snapshot(vec![
            group("obsolete", 2, &[NodeRole::Data]),
            group("managers", 3, &[NodeRole::Manager]),
            group("mixed", 4, &[NodeRole::Data, NodeRole::Manager]),
            group("data", 4, &[NodeRole::Data]),
            group("shrinking-managers", 5, &[NodeRole::Manager]),
        ]);
        // New topology: grow "managers", shrink "mixed", change zones on
        // "data", delete "obsolete", shrink "shrinking-managers", create
        // "fresh".
        let mut rezoned_data = group("data", 4, &[NodeRole::Data]);
        rezoned_data.zone_ids.insert("zone-b".to_owned());
        let new = snapshot(vec![
            group("fresh", 1, &[NodeRole::Data]),
            group("shrinking-managers", 3, &[NodeRole::Manager]),
            rezoned_data,
            group("mixed", 2, &[NodeRole::Data, NodeRole::Manager]),
            group("managers", 5, &[NodeRole::Manager]),
        ]);

        let plan = plan_search_tier(&old, &new);
        let names: Vec<_> = plan.iter().map(GroupOp::group_name).collect();
        assert_eq!(
            names,
            vec![
                "fresh",              // create
                "managers",           // dedicated managers growing
                "mixed",              // mixed manager capacity shrinking
                "data",               // neutral update
                "obsolete",           // delete
                "shrinking-managers", // dedicated managers shrinking, last
            ]
        );

        // Applying the plan in order converges on the new snapshot.
        let state = apply(&old, &plan);
        assert_eq!(state.len(), new.len());
        for g in &new {
            assert_eq!(state.get(&g.name), Some(g));
        }
    }

    #[test]
    fn plan_converges_for_disjoint_snapshots() {
        let old = snapshot(vec![group("a", 2, &[NodeRole::Data])]);
        let new = snapshot(vec![group("b", 3, &[NodeRole::Data, NodeRole::Manager])]);

        let plan = plan_search_tier(&old, &new);
        let state = apply(&old, &plan);
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("b"), new.get("b"));
    }

    #[test]
    fn dashboard_plan_keeps_snapshot_order() {
        let old = GroupSnapshot::from_groups(vec![dashboard("ui-a", 1), dashboard("ui-b", 2)])
            .unwrap();
        let new = GroupSnapshot::from_groups(vec![dashboard("ui-c", 1), dashboard("ui-b", 3)])
            .unwrap();

        let plan = plan_dashboard_tier(&old, &new);
        let names: Vec<_> = plan.iter().map(GroupOp::group_name).collect();
        assert_eq!(names, vec!["ui-c", "ui-b", "ui-a"]);
        assert!(matches!(plan[0], GroupOp::Create(_)));
        assert!(matches!(plan[1], GroupOp::Update(_)));
        assert!(matches!(plan[2], GroupOp::Delete(_)));
    }

    #[test]
    fn dashboard_no_op_update_is_skipped() {
        let old = GroupSnapshot::from_groups(vec![dashboard("ui", 2)]).unwrap();
        let new = GroupSnapshot::from_groups(vec![dashboard("ui", 2)]).unwrap();
        assert!(plan_dashboard_tier(&old, &new).is_empty());
    }
}
