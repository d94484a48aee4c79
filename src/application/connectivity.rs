//! Service reachability probe

use std::time::Duration;

use crate::domain::config::DEFAULT_HEALTH_TIMEOUT_SECS;
use crate::domain::connectivity::ConnectivityState;

use super::ports::HealthProbe;

/// Probes the service health endpoint and records the result in the
/// shared [`ConnectivityState`]. Never fails: an unreachable service
/// only closes the session guard.
pub struct ConnectivityMonitor<P: HealthProbe> {
    probe: P,
    state: ConnectivityState,
    timeout: Duration,
}

impl<P: HealthProbe> ConnectivityMonitor<P> {
    pub fn new(probe: P, state: ConnectivityState) -> Self {
        Self {
            probe,
            state,
            timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
        }
    }

    /// Override the probe time bound
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shared state updated by each probe
    pub fn state(&self) -> &ConnectivityState {
        &self.state
    }

    /// Check reachability once and publish the result
    pub async fn probe(&self) -> bool {
        let online = match self.probe.check_health(self.timeout).await {
            Ok(()) => {
                tracing::debug!("service health check passed");
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    code = ?e.code,
                    status = ?e.response.as_ref().map(|r| r.status),
                    "service health check failed"
                );
                false
            }
        };
        self.state.set_online(online);
        online
    }
}
