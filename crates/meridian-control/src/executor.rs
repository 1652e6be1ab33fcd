//! Long-running operation execution.
//!
//! Every mutation against the control plane is a call-and-wait cycle: issue
//! the call, then poll the returned [`Operation`] until it reports done.
//! [`OperationRunner`] drives that cycle under a wall-clock deadline and
//! retries it when the failure class is transient. An error from the initial
//! call itself is never retried; by that point nothing has been accepted
//! remotely and the caller decides what happens next.

use std::future::Future;

use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use meridian_api::{ApiResult, ControlPlaneApi, Operation};

use crate::config::RetryConfig;
use crate::error::{ControlError, ControlResult};

/// Drives call-and-wait cycles against the control plane.
pub struct OperationRunner<'a> {
    api: &'a dyn ControlPlaneApi,
    retry: &'a RetryConfig,
}

impl<'a> OperationRunner<'a> {
    /// Create a runner over the given API boundary.
    #[must_use]
    pub fn new(api: &'a dyn ControlPlaneApi, retry: &'a RetryConfig) -> Self {
        Self { api, retry }
    }

    /// Run one mutation to completion.
    ///
    /// `call` is issued, its operation awaited, and the whole cycle repeated
    /// on transient failure up to the configured attempt budget. Pauses
    /// between attempts and between polls never cross `deadline`; once it
    /// fires the cycle stops with the most recent error.
    pub async fn run<F, Fut>(
        &self,
        operation: &'static str,
        cluster_id: &str,
        deadline: Instant,
        call: F,
    ) -> ControlResult<()>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResult<Operation>>,
    {
        let mut attempt = 1;
        loop {
            debug!(cluster_id = %cluster_id, operation, attempt, "issuing operation");
            let op = call()
                .await
                .map_err(|e| ControlError::operation(operation, cluster_id, e))?;

            match self.wait(operation, cluster_id, op, deadline).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(
                        cluster_id = %cluster_id,
                        operation,
                        attempt,
                        error = %err,
                        "operation failed, retrying"
                    );
                    let resume = Instant::now() + self.retry.interval();
                    sleep_until(resume.min(deadline)).await;
                    if Instant::now() >= deadline {
                        return Err(err);
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Poll an operation until it terminates or the deadline fires.
    pub async fn wait(
        &self,
        operation: &'static str,
        cluster_id: &str,
        mut op: Operation,
        deadline: Instant,
    ) -> ControlResult<()> {
        loop {
            if op.done {
                return match op.error {
                    Some(error) => Err(ControlError::operation_failed(
                        operation,
                        cluster_id,
                        error.message,
                    )),
                    None => Ok(()),
                };
            }

            let next_poll = Instant::now() + self.retry.poll_interval();
            sleep_until(next_poll.min(deadline)).await;
            if Instant::now() >= deadline {
                return Err(ControlError::timeout(operation, cluster_id));
            }

            op = self
                .api
                .get_operation(&op.id)
                .await
                .map_err(|e| ControlError::operation(operation, cluster_id, e))?;
        }
    }
}
