//! Control-plane wire model and client for Meridian managed search clusters.
//!
//! This crate defines the data model spoken by the managed search-cluster
//! control plane — clusters, node groups for both tiers, hosts, long-running
//! operations — together with the [`ControlPlaneApi`] boundary, its HTTP
//! implementation [`HttpApi`], and an in-memory [`MockApi`] for tests.
//!
//! The controller in `meridian-control` drives this API; nothing in this
//! crate decides *what* to mutate, only *how* to speak to the remote side.

#![forbid(unsafe_code)]

pub mod client;
pub mod error;
pub mod mock;
pub mod operation;
pub mod request;
pub mod types;

// Re-export commonly used types at the crate root
pub use client::{ControlPlaneApi, HttpApi};
pub use error::{ApiError, ApiResult};
pub use mock::{MockApi, MockFailure};
pub use operation::{Operation, OperationError, OperationMetadata};
pub use request::{
    AddDashboardsGroupRequest, AddNodeGroupRequest, ConfigUpdate, CreateClusterRequest,
    DeleteDashboardsGroupRequest, DeleteNodeGroupRequest, UpdateClusterRequest,
    UpdateDashboardsGroupRequest, UpdateNodeGroupRequest,
};
pub use types::{
    Cluster, ClusterConfig, DashboardNodeGroup, DashboardsConfig, Environment, Host, HostPage,
    MaintenanceWindow, NodeRole, ResourceShape, SearchConfig, SearchNodeGroup, WeekDay,
};
