use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{CheckOutcome, PollingOrchestrator};
use crate::core::HealthChecker;

/// Fixed-interval batch trigger. A run-in-progress flag guards against
/// back-to-back invocation when a batch outlasts the interval.
#[derive(Clone)]
pub struct PriceCheckScheduler {
    orchestrator: Arc<PollingOrchestrator>,
    health: Arc<HealthChecker>,
    interval_hours: u64,
    running: Arc<AtomicBool>,
}

impl PriceCheckScheduler {
    pub fn new(
        orchestrator: Arc<PollingOrchestrator>,
        health: Arc<HealthChecker>,
        interval_hours: u64,
    ) -> Self {
        Self {
            orchestrator,
            health,
            interval_hours,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(&self) {
        let scheduler = self.clone();
        let interval_secs = self.interval_hours * 3600;

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));
            // The first tick completes immediately; skip it so the initial
            // batch runs one full interval after startup.
            interval.tick().await;

            loop {
                interval.tick().await;
                scheduler.run_guarded().await;
            }
        });

        tracing::info!(
            "⏰ Price check scheduler started (every {}h)",
            self.interval_hours
        );
    }

    /// Runs one batch unless another is still in flight, in which case the
    /// trigger is skipped. Returns None when skipped.
    pub async fn run_guarded(&self) -> Option<Vec<CheckOutcome>> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("⚠️  Previous price check still running, skipping this trigger");
            return None;
        }

        let outcomes = self.orchestrator.run_batch().await;

        if !outcomes.is_empty() {
            let any_scored = outcomes
                .iter()
                .any(|o| matches!(o, CheckOutcome::Success { .. }));
            self.health
                .update_component("marketplace_api", any_scored)
                .await;
        }

        self.running.store(false, Ordering::SeqCst);
        Some(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketplaceGateway;
    use crate::catalog::store::testing::MemoryStore;
    use crate::catalog::{Catalog, CatalogStore};

    fn scheduler_with_empty_catalog() -> PriceCheckScheduler {
        let gateway = MockMarketplaceGateway::new();
        let catalog = Arc::new(CatalogStore::new(Box::new(MemoryStore::new(
            Catalog::default(),
        ))));
        let orchestrator = Arc::new(PollingOrchestrator::new(Arc::new(gateway), catalog, 10));

        PriceCheckScheduler::new(orchestrator, Arc::new(HealthChecker::new()), 24)
    }

    #[tokio::test]
    async fn test_trigger_skipped_while_batch_in_flight() {
        let scheduler = scheduler_with_empty_catalog();

        scheduler.running.store(true, Ordering::SeqCst);
        assert!(scheduler.run_guarded().await.is_none());

        scheduler.running.store(false, Ordering::SeqCst);
        assert!(scheduler.run_guarded().await.is_some());
    }

    #[tokio::test]
    async fn test_guard_clears_after_a_run() {
        let scheduler = scheduler_with_empty_catalog();

        assert!(scheduler.run_guarded().await.is_some());
        assert!(scheduler.run_guarded().await.is_some());
    }
}
