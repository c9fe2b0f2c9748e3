pub mod store;
pub mod types;

pub use store::{JsonFileStore, SnapshotStore};
pub use types::{Catalog, ExclusionInput, Item, NewItem, PricePoint, Settings};

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::core::PriceCheckError;
use crate::pricing::ConfidenceRating;

/// Serialized-access facade over the snapshot store. Every load-modify-save
/// cycle runs under one lock so in-process writers (scheduler batch, manual
/// checks, API mutations) cannot interleave mid-cycle.
pub struct CatalogStore {
    store: Box<dyn SnapshotStore>,
    write_lock: Mutex<()>,
}

impl CatalogStore {
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Reload the snapshot, picking up out-of-band writes.
    pub async fn load(&self) -> Result<Catalog> {
        self.store.load().await
    }

    pub async fn add_item(&self, new: NewItem) -> Result<Item> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.store.load().await?;

        let starting_price = new.price;
        let history = match new.price_history {
            Some(history) if !history.is_empty() => history,
            // A fresh item starts with one observation at its asking price.
            _ => vec![PricePoint {
                date: Utc::now().to_rfc3339(),
                price: starting_price,
                url: None,
            }],
        };

        let item = Item {
            id: new.id.unwrap_or_else(|| Utc::now().timestamp_millis()),
            name: new.name,
            category: new.category,
            price: starting_price,
            price_history: history,
            exclude_keywords: new.exclude_keywords,
            active_listing_url: None,
            last_confidence_score: None,
            last_confidence_rating: None,
        };

        catalog.items.push(item.clone());
        self.store.save(&catalog).await?;

        tracing::info!("➕ Item added to catalog: {} (id {})", item.name, item.id);
        Ok(item)
    }

    /// Whole-record replacement: the external edit path for history
    /// corrections. The path id wins over any id in the body.
    pub async fn update_item(&self, item_id: i64, mut updated: Item) -> Result<Option<Item>> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.store.load().await?;

        let Some(slot) = catalog.items.iter_mut().find(|i| i.id == item_id) else {
            return Ok(None);
        };

        updated.id = item_id;
        *slot = updated.clone();

        self.store.save(&catalog).await?;
        Ok(Some(updated))
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self.store.load().await?;

        catalog.items.retain(|i| i.id != item_id);
        self.store.save(&catalog).await?;
        Ok(())
    }

    /// Merge one observation into an item's history.
    ///
    /// The full history is re-sorted after the append, and the derived
    /// fields follow whichever entry is last AFTER sorting, not the point
    /// that was just inserted. An older-dated insert therefore corrects the
    /// history order while current price and active URL stay with the
    /// chronologically latest entry. A URL-less latest entry leaves the
    /// previously hoisted URL untouched.
    pub async fn merge_observation(
        &self,
        item_id: i64,
        date: String,
        price: f64,
        url: Option<String>,
    ) -> Result<Item, PriceCheckError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self
            .store
            .load()
            .await
            .map_err(|e| PriceCheckError::Persistence(e.to_string()))?;

        let Some(item) = catalog.items.iter_mut().find(|i| i.id == item_id) else {
            return Err(PriceCheckError::NotFound(item_id));
        };

        item.price_history.push(PricePoint { date, price, url });
        // Lexical order over ISO-8601 strings is chronological order.
        item.price_history.sort_by(|a, b| a.date.cmp(&b.date));

        if let Some(last) = item.price_history.last().cloned() {
            item.price = last.price;
            if let Some(latest_url) = last.url {
                item.active_listing_url = Some(latest_url);
            }
        }

        let merged = item.clone();

        self.store
            .save(&catalog)
            .await
            .map_err(|e| PriceCheckError::Persistence(e.to_string()))?;

        Ok(merged)
    }

    /// Stamps the last computed confidence metadata after a successful poll.
    pub async fn record_confidence(
        &self,
        item_id: i64,
        score: u8,
        rating: ConfidenceRating,
    ) -> Result<(), PriceCheckError> {
        let _guard = self.write_lock.lock().await;
        let mut catalog = self
            .store
            .load()
            .await
            .map_err(|e| PriceCheckError::Persistence(e.to_string()))?;

        let Some(item) = catalog.items.iter_mut().find(|i| i.id == item_id) else {
            return Err(PriceCheckError::NotFound(item_id));
        };

        item.last_confidence_score = Some(score);
        item.last_confidence_rating = Some(rating);

        self.store
            .save(&catalog)
            .await
            .map_err(|e| PriceCheckError::Persistence(e.to_string()))?;

        Ok(())
    }
}
