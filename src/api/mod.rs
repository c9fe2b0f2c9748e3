pub mod ebay;
pub mod types;

pub use ebay::EbayClient;
pub use types::*;

use async_trait::async_trait;

use crate::core::PriceCheckError;

/// Boundary to the external marketplace search service. Implementations own
/// authentication; candidates come back sorted ascending by price and
/// truncated to `limit`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    async fn search_listings(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateListing>, PriceCheckError>;
}
