//! Reconciliation engine for Meridian managed search clusters.
//!
//! The crate turns a desired-state document ([`ClusterSpec`]) into ordered
//! control-plane operations and drives them to completion:
//!
//! - [`spec`] — the desired-state document and its validation
//! - [`snapshot`] — ordered, name-indexed views of a tier's node groups
//! - [`plan`] — pure planning: diff two snapshots into an ordered operation
//!   list that keeps manager quorum safe throughout
//! - [`executor`] — call-and-wait cycles with retry under a deadline
//! - [`controller`] — the create/read/update/delete lifecycle passes
//!
//! Planning is deliberately separated from execution: the planner is a pure
//! function over two snapshots and is tested exhaustively without any I/O,
//! while the executor only knows how to drive one operation at a time.

#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod plan;
pub mod snapshot;
pub mod spec;

pub use config::{ApiConfig, ControllerConfig, OperationTimeouts, RetryConfig};
pub use controller::ClusterController;
pub use error::{ControlError, ControlResult};
pub use executor::OperationRunner;
pub use plan::{
    plan_dashboard_tier, plan_search_tier, route_update, GroupField, GroupOp, GroupUpdate,
    UpdateBucket,
};
pub use snapshot::{GroupSnapshot, NamedGroup};
pub use spec::{topology_changed, ClusterId, ClusterSpec, ObservedCluster};
