//! Background expiry of idle sessions

use crate::session::SessionRegistry;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use trigon_domain::session::unix_now;

/// Periodically drops sessions that have been idle longer than the TTL
///
/// Expired sessions are discarded without being saved to history.
pub struct SessionSweeper {
    registry: Arc<SessionRegistry>,
    ttl: Duration,
    interval: Duration,
}

impl SessionSweeper {
    /// Create a sweeper over the given registry
    pub fn new(registry: Arc<SessionRegistry>, ttl: Duration, interval: Duration) -> Self {
        Self {
            registry,
            ttl,
            interval,
        }
    }

    /// Run one pass as of `now`; returns the number of sessions expired
    pub async fn sweep_once(&self, now: u64) -> usize {
        let expired = self.registry.expire_idle(self.ttl.as_secs(), now).await;
        for session_id in &expired {
            tracing::warn!(%session_id, "Session expired after inactivity");
        }
        expired.len()
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    pub async fn run(self) {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Session sweeper started (interval: {:?}, ttl: {:?})",
            self.interval,
            self.ttl
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let expired = self.sweep_once(unix_now()).await;
                    tracing::debug!(expired, "Sweep cycle finished");
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping sweeper");
                    break;
                }
            }
        }
    }

    /// Run a fixed number of ticks (useful for testing)
    pub async fn run_cycles(&self, cycles: usize) -> usize {
        let mut ticker = interval(self.interval);
        let mut total = 0;

        for _ in 0..cycles {
            ticker.tick().await;
            total += self.sweep_once(unix_now()).await;
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LiveSession;
    use trigon_domain::{SessionState, TheoremWeights};

    async fn registry_with(sessions: &[(&str, u64)]) -> Arc<SessionRegistry> {
        let registry = Arc::new(SessionRegistry::new());
        for (id, last_activity) in sessions {
            let mut state = SessionState::new(TheoremWeights::default());
            state.last_activity = *last_activity;
            registry
                .insert(id.to_string(), LiveSession::new(id, state))
                .await;
        }
        registry
    }

    #[tokio::test]
    async fn test_sweep_once_expires_idle_sessions() {
        let registry = registry_with(&[("a", 0), ("b", 50), ("c", 95)]).await;
        let sweeper = SessionSweeper::new(
            Arc::clone(&registry),
            Duration::from_secs(10),
            Duration::from_secs(1),
        );

        assert_eq!(sweeper.sweep_once(100).await, 2);
        assert_eq!(registry.len().await, 1);
        assert_eq!(sweeper.sweep_once(100).await, 0);
    }

    #[tokio::test]
    async fn test_run_cycles_keeps_active_sessions() {
        let now = unix_now();
        let registry = registry_with(&[("recent", now), ("ancient", 0)]).await;
        let sweeper = SessionSweeper::new(
            Arc::clone(&registry),
            Duration::from_secs(3600),
            Duration::from_millis(10),
        );

        assert_eq!(sweeper.run_cycles(3).await, 1);
        assert!(registry.get("recent").await.is_ok());
    }
}
