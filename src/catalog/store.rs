use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use super::types::Catalog;

/// Whole-catalog snapshot persistence. Load and save are all-or-nothing;
/// there are no partial updates.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self) -> Result<Catalog>;
    async fn save(&self, catalog: &Catalog) -> Result<()>;
}

/// JSON file snapshot, pretty-printed like the original data file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            return Ok(Catalog::default());
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;

        match serde_json::from_str(&raw) {
            Ok(catalog) => Ok(catalog),
            Err(e) => {
                // A corrupt snapshot starts over empty instead of wedging
                // startup, matching the original system's recovery.
                tracing::warn!("⚠️  Corrupt catalog snapshot, starting empty: {}", e);
                Ok(Catalog::default())
            }
        }
    }

    async fn save(&self, catalog: &Catalog) -> Result<()> {
        let raw =
            serde_json::to_string_pretty(catalog).context("failed to serialize catalog")?;

        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{Item, PricePoint};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("price-tracker-{}-{}.json", name, std::process::id()))
    }

    fn sample_catalog() -> Catalog {
        Catalog {
            items: vec![Item {
                id: 1,
                name: "Charizard Base Set".to_string(),
                category: Some("Pokemon".to_string()),
                price: 120.0,
                price_history: vec![PricePoint {
                    date: "2024-01-10T09:00:00+00:00".to_string(),
                    price: 120.0,
                    url: Some("https://example.com/listing".to_string()),
                }],
                exclude_keywords: None,
                active_listing_url: Some("https://example.com/listing".to_string()),
                last_confidence_score: Some(80),
                last_confidence_rating: None,
            }],
            settings: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let path = temp_path("round-trip");
        let store = JsonFileStore::new(&path);

        store.save(&sample_catalog()).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded.items, sample_catalog().items);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty_catalog() {
        let store = JsonFileStore::new(temp_path("does-not-exist"));
        let loaded = store.load().await.unwrap();
        assert!(loaded.items.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty_catalog() {
        let path = temp_path("corrupt");
        tokio::fs::write(&path, "{ not json at all").await.unwrap();

        let store = JsonFileStore::new(&path);
        let loaded = store.load().await.unwrap();

        assert!(loaded.items.is_empty());
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
