use thiserror::Error;

/// Failure classes for a single item's price check. None of these abort a
/// batch; the orchestrator converts them into per-item outcome records.
#[derive(Debug, Error)]
pub enum PriceCheckError {
    #[error("no usable access token")]
    Auth,

    #[error("marketplace API error: {0}")]
    Api(String),

    #[error("no listings left after exclusions")]
    NoCandidates,

    #[error("item {0} not found")]
    NotFound(i64),

    // A failed snapshot write loses the computed observation.
    #[error("failed to persist catalog: {0}")]
    Persistence(String),
}
