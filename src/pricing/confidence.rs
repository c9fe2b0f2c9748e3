use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::CandidateListing;

/// Coarse bucket derived from the numeric confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceRating {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceRating::High => write!(f, "High"),
            ConfidenceRating::Medium => write!(f, "Medium"),
            ConfidenceRating::Low => write!(f, "Low"),
        }
    }
}

/// The scored price signal surfaced for one item: the anchor candidate's
/// price and URL plus how much that anchor can be trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSignal {
    pub price: f64,
    pub url: String,
    pub confidence: u8,
    pub rating: ConfidenceRating,
}

/// Scores the reliability of the anchor (lowest-priced) candidate against
/// the rest of the filtered set and the item name's words. `candidates` must
/// be price-ascending, as the gateway delivers them. Returns None when the
/// set is empty.
pub fn score_candidates(candidates: &[CandidateListing], query: &str) -> Option<PriceSignal> {
    let anchor = candidates.first()?;

    // Volume: more corroborating listings, more trust.
    let volume: u32 = match candidates.len() {
        n if n >= 5 => 30,
        n if n >= 3 => 20,
        _ => 10,
    };

    // Price consistency: the anchor against the mean of the next listings
    // (positions 2-4). An anchor far below the rest is probably mispriced
    // or a wrong-item match.
    let consistency: u32 = if candidates.len() > 1 {
        let others: Vec<f64> = candidates[1..].iter().take(3).map(|c| c.price).collect();
        let mean = others.iter().sum::<f64>() / others.len() as f64;
        let ratio = anchor.price / mean;

        if ratio > 0.8 {
            50
        } else if ratio > 0.5 {
            30
        } else {
            0
        }
    } else {
        // A single listing gives nothing to compare against.
        10
    };

    let keyword = keyword_match_score(query, &anchor.title);

    let confidence = (volume + consistency + keyword).min(100) as u8;

    let rating = if confidence >= 80 {
        ConfidenceRating::High
    } else if confidence >= 50 {
        ConfidenceRating::Medium
    } else {
        ConfidenceRating::Low
    };

    Some(PriceSignal {
        price: anchor.price,
        url: anchor.url.clone(),
        confidence,
        rating,
    })
}

// Fraction of the query's whitespace-separated words appearing (as lowercase
// substrings) in the anchor title.
fn keyword_match_score(query: &str, anchor_title: &str) -> u32 {
    let title = anchor_title.to_lowercase();
    let words: Vec<String> = query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();

    if words.is_empty() {
        return 0;
    }

    let matched = words.iter().filter(|w| title.contains(w.as_str())).count();

    if matched == words.len() {
        20
    } else if matched as f64 / words.len() as f64 > 0.5 {
        10
    } else {
        0
    }
}
