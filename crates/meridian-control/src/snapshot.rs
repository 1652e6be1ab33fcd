//! Desired-state snapshots of node-group collections.
//!
//! A [`GroupSnapshot`] is one tier's node groups in document order, plus a
//! name index for constant-time lookup. Reconciliation always works on a
//! pair of snapshots: *old* (last applied) and *new* (desired).

use std::collections::HashMap;

use meridian_api::{DashboardNodeGroup, SearchNodeGroup};

use crate::error::{ControlError, ControlResult};

/// A node-group specification keyed by name.
pub trait NamedGroup {
    /// Unique name of the group within its tier.
    fn name(&self) -> &str;

    /// Number of hosts in the group.
    fn hosts_count(&self) -> u32;
}

impl NamedGroup for SearchNodeGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn hosts_count(&self) -> u32 {
        self.hosts_count
    }
}

impl NamedGroup for DashboardNodeGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn hosts_count(&self) -> u32 {
        self.hosts_count
    }
}

/// An ordered collection of node-group specifications with a name index.
///
/// Construction enforces the snapshot invariants: names are unique and no
/// group is empty (a group with zero hosts does not exist; it is expressed
/// as absence, which the planner turns into a deletion).
#[derive(Debug, Clone)]
pub struct GroupSnapshot<G> {
    groups: Vec<G>,
    index: HashMap<String, usize>,
}

impl<G> Default for GroupSnapshot<G> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<G: NamedGroup> GroupSnapshot<G> {
    /// Build a snapshot from groups in document order.
    pub fn from_groups(groups: Vec<G>) -> ControlResult<Self> {
        let mut index = HashMap::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            if group.hosts_count() == 0 {
                return Err(ControlError::validation(format!(
                    "node group {:?} has zero hosts; remove the group instead",
                    group.name()
                )));
            }
            if index.insert(group.name().to_owned(), i).is_some() {
                return Err(ControlError::validation(format!(
                    "duplicate node group name: {:?}",
                    group.name()
                )));
            }
        }
        Ok(Self { groups, index })
    }

    /// Look up a group by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&G> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    /// Returns true if a group with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate over groups in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, G> {
        self.groups.iter()
    }

    /// Number of groups in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if the snapshot holds no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'a, G> IntoIterator for &'a GroupSnapshot<G> {
    type Item = &'a G;
    type IntoIter = std::slice::Iter<'a, G>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
