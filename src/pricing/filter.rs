use super::OWN_SELLER_IDENTITY;
use crate::api::CandidateListing;

/// Removes listings belonging to the operator's own seller account, matched
/// case-insensitively as a substring of the seller identifier. Pure and
/// total: empty input yields empty output.
pub fn filter_own_listings(candidates: Vec<CandidateListing>) -> Vec<CandidateListing> {
    let own = OWN_SELLER_IDENTITY.to_lowercase();

    candidates
        .into_iter()
        .filter(|c| !c.seller.to_lowercase().contains(&own))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(seller: &str) -> CandidateListing {
        CandidateListing {
            price: 10.0,
            title: "Test listing".to_string(),
            seller: seller.to_string(),
            url: "https://example.com/1".to_string(),
        }
    }

    #[test]
    fn test_removes_own_listings_case_insensitively() {
        let candidates = vec![
            listing("cardshop-uk"),
            listing("Legendastique"),
            listing("LEGENDASTIQUE_OFFICIAL"),
            listing("other-seller"),
        ];

        let filtered = filter_own_listings(candidates);
        let sellers: Vec<&str> = filtered.iter().map(|c| c.seller.as_str()).collect();
        assert_eq!(sellers, ["cardshop-uk", "other-seller"]);
    }

    #[test]
    fn test_idempotent() {
        let candidates = vec![listing("legendastique"), listing("someone-else")];

        let once = filter_own_listings(candidates);
        let twice = filter_own_listings(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(filter_own_listings(Vec::new()).is_empty());
    }
}
