//! Common test utilities for controller integration tests.

pub mod fixtures;

use std::sync::Arc;

use meridian_api::mock::MockApi;
use meridian_control::{ClusterController, ClusterId, ClusterSpec, ControllerConfig};

/// Complete test setup: a mock control plane with a controller wired to it.
pub struct TestControlPlane {
    pub api: Arc<MockApi>,
    pub controller: ClusterController,
}

impl TestControlPlane {
    /// Creates a test setup with default configuration.
    pub fn new() -> Self {
        Self::with_api(MockApi::new())
    }

    /// Creates a test setup over a pre-configured mock.
    pub fn with_api(api: MockApi) -> Self {
        let api = Arc::new(api);
        let controller = ClusterController::new(api.clone(), ControllerConfig::default());
        Self { api, controller }
    }

    /// Creates a cluster from the given document, panicking on failure.
    pub async fn create_cluster(&self, spec: &ClusterSpec) -> ClusterId {
        self.controller
            .create(spec)
            .await
            .expect("cluster creation should succeed")
    }

    /// Calls recorded by the mock after the initial cluster creation.
    pub fn calls_after_create(&self) -> Vec<String> {
        self.api.calls().into_iter().skip(1).collect()
    }
}

impl Default for TestControlPlane {
    fn default() -> Self {
        Self::new()
    }
}
