use serde::{Deserialize, Serialize};

use crate::pricing::ConfidenceRating;

/// Raw wire/disk shape of an exclusion list: the frontend historically sent
/// either a comma-separated string or an array of terms. Only
/// `pricing::ExclusionSet::parse` ever looks inside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExclusionInput {
    Text(String),
    List(Vec<String>),
}

impl Default for ExclusionInput {
    fn default() -> Self {
        ExclusionInput::Text(String::new())
    }
}

/// One price observation. Immutable once appended; only re-sorting may move
/// it within an item's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A tracked collectible. Field names on the wire match the original
/// snapshot format, so an existing data file loads unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Derived: always the price of the chronologically latest history entry.
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_keywords: Option<ExclusionInput>,
    /// Derived: URL of the latest history entry that carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_listing_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_confidence_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_confidence_rating: Option<ConfidenceRating>,
}

/// Creation payload for a catalog item. Missing pieces are filled in by
/// `CatalogStore::add_item`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub price_history: Option<Vec<PricePoint>>,
    #[serde(default)]
    pub exclude_keywords: Option<ExclusionInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Applied to every query on top of item-level exclusions.
    #[serde(default)]
    pub global_exclusions: ExclusionInput,
}

/// The whole-file snapshot unit: every load and save moves all of it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub settings: Settings,
}
