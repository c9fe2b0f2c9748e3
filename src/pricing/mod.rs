pub mod confidence;
pub mod filter;
pub mod query;

pub use confidence::{score_candidates, ConfidenceRating, PriceSignal};
pub use filter::filter_own_listings;
pub use query::{build_search_query, ExclusionSet};

/// Marketplace identity of the operator's own seller account. Listings from
/// this seller are never treated as market signal.
pub const OWN_SELLER_IDENTITY: &str = "legendastique";
