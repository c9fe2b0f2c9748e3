use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tokio::sync::RwLock;

use super::types::{CandidateListing, SearchResponse, TokenResponse};
use super::MarketplaceGateway;
use crate::core::config::EbayConfig;
use crate::core::PriceCheckError;

/// Safety margin subtracted from the advertised token lifetime so a token is
/// never used right at its expiry boundary.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

pub struct EbayClient {
    client: Client,
    config: EbayConfig,
    token: RwLock<Option<CachedToken>>,
}

impl EbayClient {
    pub fn new(config: EbayConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("HTTP client construction cannot fail with static options");

        Self {
            client,
            config,
            token: RwLock::new(None),
        }
    }

    /// Returns a valid OAuth application access token, requesting a fresh one
    /// through the client-credentials grant when the cached token is expired.
    async fn acquire_token(&self) -> Result<String, PriceCheckError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if Utc::now() < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let credential = format!("{}:{}", self.config.app_id, self.config.cert_id);
        let encoded_cred = general_purpose::STANDARD.encode(credential.as_bytes());

        let params = [
            ("grant_type", "client_credentials"),
            ("scope", self.config.scope.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.oauth_url)
            .header("Authorization", format!("Basic {}", encoded_cred))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("❌ OAuth token request failed: {}", e);
                PriceCheckError::Auth
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ OAuth token request rejected: {} - {}", status, body);
            return Err(PriceCheckError::Auth);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            tracing::error!("❌ Malformed OAuth token response: {}", e);
            PriceCheckError::Auth
        })?;

        let expires_at =
            Utc::now() + Duration::seconds(token.expires_in - TOKEN_EXPIRY_MARGIN_SECS);

        tracing::debug!("🔑 OAuth token acquired, valid until {}", expires_at);

        *self.token.write().await = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}

#[async_trait]
impl MarketplaceGateway for EbayClient {
    async fn search_listings(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<CandidateListing>, PriceCheckError> {
        let token = self.acquire_token().await?;
        let limit_param = limit.to_string();

        let response = self
            .client
            .get(&self.config.browse_url)
            .bearer_auth(&token)
            .header("X-EBAY-C-MARKETPLACE-ID", &self.config.marketplace_id)
            .query(&[
                ("q", query),
                ("sort", "price"),
                ("limit", limit_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceCheckError::Api(format!("search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Browse API error: {} - {}", status, body);
            return Err(PriceCheckError::Api(format!("search returned {}", status)));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| PriceCheckError::Api(format!("malformed search response: {}", e)))?;

        // Summaries without a parseable price carry no signal; skip them.
        let candidates: Vec<CandidateListing> = search
            .item_summaries
            .into_iter()
            .filter_map(|summary| {
                let price = summary.price.as_ref()?.value.parse::<f64>().ok()?;
                Some(CandidateListing {
                    price,
                    title: summary.title,
                    seller: summary
                        .seller
                        .map(|s| s.username)
                        .unwrap_or_default(),
                    url: summary.item_web_url.unwrap_or_default(),
                })
            })
            .collect();

        tracing::debug!(
            "🔎 Query '{}' returned {} usable candidates ({} reported)",
            query,
            candidates.len(),
            search.total
        );

        Ok(candidates)
    }
}
