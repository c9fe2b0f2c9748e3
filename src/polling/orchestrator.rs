use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::api::MarketplaceGateway;
use crate::catalog::{CatalogStore, Item};
use crate::core::PriceCheckError;
use crate::pricing::{self, ConfidenceRating, ExclusionSet};

/// Per-item result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    Success {
        id: i64,
        name: String,
        price: f64,
        url: String,
        confidence: u8,
        rating: ConfidenceRating,
    },
    NoListings {
        id: i64,
        name: String,
        message: String,
    },
    Error {
        id: i64,
        name: String,
        message: String,
    },
}

/// Drives the per-item pipeline: QueryBuilder -> gateway search -> own-listing
/// filter -> confidence scoring -> history merge. Holds its collaborators by
/// injection; no ambient state.
pub struct PollingOrchestrator {
    gateway: Arc<dyn MarketplaceGateway>,
    catalog: Arc<CatalogStore>,
    search_limit: u32,
}

impl PollingOrchestrator {
    pub fn new(
        gateway: Arc<dyn MarketplaceGateway>,
        catalog: Arc<CatalogStore>,
        search_limit: u32,
    ) -> Self {
        Self {
            gateway,
            catalog,
            search_limit,
        }
    }

    /// Runs the pipeline over every catalog item. One item's failure never
    /// aborts the batch; each item reports its own outcome.
    pub async fn run_batch(&self) -> Vec<CheckOutcome> {
        tracing::info!("🔄 Starting price check batch...");

        // Reload to pick up items added through the API since the last run.
        let catalog = match self.catalog.load().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!("❌ Failed to load catalog for batch run: {}", e);
                return Vec::new();
            }
        };

        let global_exclusions = ExclusionSet::parse(&catalog.settings.global_exclusions);

        let mut outcomes = Vec::with_capacity(catalog.items.len());
        for item in &catalog.items {
            outcomes.push(self.check_item(item, &global_exclusions).await);
        }

        let scored = outcomes
            .iter()
            .filter(|o| matches!(o, CheckOutcome::Success { .. }))
            .count();
        tracing::info!(
            "✅ Price check batch completed: {}/{} items scored",
            scored,
            outcomes.len()
        );

        outcomes
    }

    /// Single-item variant: reload, locate by id, run the same per-item logic.
    pub async fn run_single(&self, item_id: i64) -> Result<CheckOutcome, PriceCheckError> {
        let catalog = self
            .catalog
            .load()
            .await
            .map_err(|e| PriceCheckError::Persistence(e.to_string()))?;

        let Some(item) = catalog.items.iter().find(|i| i.id == item_id) else {
            return Err(PriceCheckError::NotFound(item_id));
        };

        tracing::info!("🔍 Checking single item: {}", item.name);

        let global_exclusions = ExclusionSet::parse(&catalog.settings.global_exclusions);
        Ok(self.check_item(item, &global_exclusions).await)
    }

    async fn check_item(&self, item: &Item, global_exclusions: &ExclusionSet) -> CheckOutcome {
        match self.price_item(item, global_exclusions).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if matches!(e, PriceCheckError::Persistence(_)) {
                    // The scored observation is gone, not just missing.
                    tracing::error!("❌ Observation for '{}' was lost: {}", item.name, e);
                } else {
                    tracing::warn!("⚠️  Check failed for '{}': {}", item.name, e);
                }

                CheckOutcome::Error {
                    id: item.id,
                    name: item.name.clone(),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn price_item(
        &self,
        item: &Item,
        global_exclusions: &ExclusionSet,
    ) -> Result<CheckOutcome, PriceCheckError> {
        let item_exclusions = item
            .exclude_keywords
            .as_ref()
            .map(ExclusionSet::parse)
            .unwrap_or_default();

        let query = pricing::build_search_query(&item.name, &item_exclusions, global_exclusions);

        let candidates = self.gateway.search_listings(&query, self.search_limit).await?;
        let candidates = pricing::filter_own_listings(candidates);

        // Scoring runs against the item name: the exclusion terms in the
        // full query would never appear in a listing title.
        let Some(signal) = pricing::score_candidates(&candidates, &item.name) else {
            tracing::info!("  No market listings found for {}", item.name);
            return Ok(CheckOutcome::NoListings {
                id: item.id,
                name: item.name.clone(),
                message: PriceCheckError::NoCandidates.to_string(),
            });
        };

        tracing::info!(
            "  💰 Market price for {}: {:.2} (confidence: {} - {}%)",
            item.name,
            signal.price,
            signal.rating,
            signal.confidence
        );

        // The observation timestamp is the check time: these are live
        // listings, not completed sales.
        let observed_at = Utc::now().to_rfc3339();
        self.catalog
            .merge_observation(item.id, observed_at, signal.price, Some(signal.url.clone()))
            .await?;
        self.catalog
            .record_confidence(item.id, signal.confidence, signal.rating)
            .await?;

        Ok(CheckOutcome::Success {
            id: item.id,
            name: item.name.clone(),
            price: signal.price,
            url: signal.url,
            confidence: signal.confidence,
            rating: signal.rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CandidateListing, MockMarketplaceGateway};
    use crate::catalog::store::testing::MemoryStore;
    use crate::catalog::{Catalog, ExclusionInput, Item, Settings};

    fn tracked_item(id: i64, name: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            category: None,
            price: 0.0,
            price_history: Vec::new(),
            exclude_keywords: None,
            active_listing_url: None,
            last_confidence_score: None,
            last_confidence_rating: None,
        }
    }

    fn market_listing(price: f64, title: &str) -> CandidateListing {
        CandidateListing {
            price,
            title: title.to_string(),
            seller: "market-seller".to_string(),
            url: format!("https://example.com/{}", price),
        }
    }

    fn catalog_store(items: Vec<Item>) -> Arc<CatalogStore> {
        Arc::new(CatalogStore::new(Box::new(MemoryStore::new(Catalog {
            items,
            settings: Settings::default(),
        }))))
    }

    #[tokio::test]
    async fn test_successful_check_merges_history_and_confidence() {
        let mut gateway = MockMarketplaceGateway::new();
        gateway.expect_search_listings().returning(|_, _| {
            Ok(vec![
                market_listing(10.0, "Charizard Base Set Holo"),
                market_listing(12.0, "Charizard Base Set"),
                market_listing(13.0, "Charizard Base Set"),
                market_listing(14.0, "Charizard Base Set"),
                market_listing(50.0, "Charizard Base Set graded"),
            ])
        });

        let catalog = catalog_store(vec![tracked_item(1, "Charizard Base Set")]);
        let orchestrator = PollingOrchestrator::new(Arc::new(gateway), catalog.clone(), 10);

        let outcomes = orchestrator.run_batch().await;

        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            CheckOutcome::Success {
                price,
                confidence,
                rating,
                ..
            } => {
                assert_eq!(*price, 10.0);
                assert_eq!(*confidence, 80);
                assert_eq!(*rating, ConfidenceRating::High);
            }
            other => panic!("expected success, got {:?}", other),
        }

        let snapshot = catalog.load().await.unwrap();
        let item = &snapshot.items[0];
        assert_eq!(item.price_history.len(), 1);
        assert_eq!(item.price, 10.0);
        assert_eq!(item.active_listing_url.as_deref(), Some("https://example.com/10"));
        assert_eq!(item.last_confidence_score, Some(80));
        assert_eq!(item.last_confidence_rating, Some(ConfidenceRating::High));
    }

    #[tokio::test]
    async fn test_everything_filtered_reports_no_listings_without_mutation() {
        let mut gateway = MockMarketplaceGateway::new();
        gateway.expect_search_listings().returning(|_, _| {
            Ok(vec![CandidateListing {
                price: 10.0,
                title: "Charizard".to_string(),
                seller: "legendastique".to_string(),
                url: "https://example.com/own".to_string(),
            }])
        });

        let catalog = catalog_store(vec![tracked_item(1, "Charizard")]);
        let orchestrator = PollingOrchestrator::new(Arc::new(gateway), catalog.clone(), 10);

        let outcomes = orchestrator.run_batch().await;
        assert!(matches!(outcomes[0], CheckOutcome::NoListings { .. }));

        // No observation may be recorded for a no-listings item.
        let snapshot = catalog.load().await.unwrap();
        assert!(snapshot.items[0].price_history.is_empty());
        assert_eq!(snapshot.items[0].price, 0.0);
    }

    #[tokio::test]
    async fn test_one_item_failure_does_not_abort_the_batch() {
        let mut gateway = MockMarketplaceGateway::new();
        gateway.expect_search_listings().returning(|query, _| {
            if query.starts_with("Broken") {
                Err(PriceCheckError::Api("search returned 500".to_string()))
            } else {
                Ok(vec![
                    market_listing(10.0, "Working Item"),
                    market_listing(11.0, "Working Item"),
                    market_listing(12.0, "Working Item"),
                ])
            }
        });

        let catalog = catalog_store(vec![
            tracked_item(1, "Broken Item"),
            tracked_item(2, "Working Item"),
        ]);
        let orchestrator = PollingOrchestrator::new(Arc::new(gateway), catalog.clone(), 10);

        let outcomes = orchestrator.run_batch().await;
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], CheckOutcome::Error { .. }));
        assert!(matches!(outcomes[1], CheckOutcome::Success { .. }));

        // The working item's observation still persisted.
        let snapshot = catalog.load().await.unwrap();
        assert!(snapshot.items[0].price_history.is_empty());
        assert_eq!(snapshot.items[1].price_history.len(), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_reports_error_outcome() {
        let mut gateway = MockMarketplaceGateway::new();
        gateway
            .expect_search_listings()
            .returning(|_, _| Err(PriceCheckError::Auth));

        let catalog = catalog_store(vec![tracked_item(1, "Charizard")]);
        let orchestrator = PollingOrchestrator::new(Arc::new(gateway), catalog, 10);

        let outcomes = orchestrator.run_batch().await;
        match &outcomes[0] {
            CheckOutcome::Error { message, .. } => {
                assert_eq!(message, "no usable access token");
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_carries_item_and_global_exclusions() {
        let mut gateway = MockMarketplaceGateway::new();
        gateway.expect_search_listings().returning(|query, _| {
            assert!(query.contains("-legendastique"));
            assert!(query.contains("-\"box only\""));
            assert!(query.contains("-reprint"));
            Ok(Vec::new())
        });

        let mut item = tracked_item(1, "Charizard");
        item.exclude_keywords = Some(ExclusionInput::Text("box only,".to_string()));

        let catalog = Arc::new(CatalogStore::new(Box::new(MemoryStore::new(Catalog {
            items: vec![item],
            settings: Settings {
                global_exclusions: ExclusionInput::Text("reprint".to_string()),
            },
        }))));

        let orchestrator = PollingOrchestrator::new(Arc::new(gateway), catalog, 10);
        let outcomes = orchestrator.run_batch().await;
        assert!(matches!(outcomes[0], CheckOutcome::NoListings { .. }));
    }

    #[tokio::test]
    async fn test_run_single_unknown_id_is_not_found() {
        let gateway = MockMarketplaceGateway::new();
        let catalog = catalog_store(Vec::new());
        let orchestrator = PollingOrchestrator::new(Arc::new(gateway), catalog, 10);

        let result = orchestrator.run_single(404).await;
        assert!(matches!(result, Err(PriceCheckError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_run_single_known_id_scores_and_persists() {
        let mut gateway = MockMarketplaceGateway::new();
        gateway.expect_search_listings().returning(|_, _| {
            Ok(vec![market_listing(25.0, "Blastoise Base Set Holo")])
        });

        let catalog = catalog_store(vec![tracked_item(7, "Blastoise Base Set")]);
        let orchestrator = PollingOrchestrator::new(Arc::new(gateway), catalog.clone(), 10);

        let outcome = orchestrator.run_single(7).await.unwrap();
        match outcome {
            CheckOutcome::Success {
                confidence, rating, ..
            } => {
                // volume 10 + single-candidate flat 10 + full keyword 20.
                assert_eq!(confidence, 40);
                assert_eq!(rating, ConfidenceRating::Low);
            }
            other => panic!("expected success, got {:?}", other),
        }

        let snapshot = catalog.load().await.unwrap();
        assert_eq!(snapshot.items[0].price, 25.0);
    }
}
