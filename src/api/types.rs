use serde::Deserialize;

/// One marketplace listing flowing through the pricing pipeline. Never
/// persisted; the pipeline keeps only the anchor's price and URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateListing {
    pub price: f64,
    pub title: String,
    pub seller: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    7200
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub item_summaries: Vec<ItemSummary>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    #[serde(default)]
    pub title: String,
    pub price: Option<ListingPrice>,
    pub seller: Option<ListingSeller>,
    pub item_web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListingPrice {
    pub value: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingSeller {
    pub username: String,
}
